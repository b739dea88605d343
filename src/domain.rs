use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MirrorError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubstanceName(String);

impl SubstanceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubstanceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubstanceName {
    type Err = MirrorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        if normalized.is_empty() {
            return Err(MirrorError::MalformedRecord(
                "substance name is empty".to_string(),
            ));
        }
        Ok(Self(normalized.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionStatus {
    Dangerous,
    Unsafe,
    Caution,
}

impl fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionStatus::Dangerous => write!(f, "Dangerous"),
            InteractionStatus::Unsafe => write!(f, "Unsafe"),
            InteractionStatus::Caution => write!(f, "Caution"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatInteraction {
    pub name: String,
    pub status: InteractionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRef {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub units: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseProfile {
    pub units: Option<String>,
    pub threshold: Option<f64>,
    pub light: Option<ValueRange>,
    pub common: Option<ValueRange>,
    pub strong: Option<ValueRange>,
    pub heavy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationProfile {
    pub onset: Option<DurationRange>,
    pub comeup: Option<DurationRange>,
    pub peak: Option<DurationRange>,
    pub offset: Option<DurationRange>,
    pub total: Option<DurationRange>,
    pub afterglow: Option<DurationRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roa {
    pub name: Option<String>,
    pub dose: Option<DoseProfile>,
    pub duration: Option<DurationProfile>,
    pub bioavailability: Option<ValueRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub full: Option<String>,
    pub half: Option<String>,
    pub zero: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubstance {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub roas: Option<Vec<Roa>>,
    #[serde(default)]
    pub images: Option<Vec<ImageRef>>,
    #[serde(default)]
    pub addiction_potential: Option<String>,
    #[serde(default)]
    pub tolerance: Option<Tolerance>,
    #[serde(default)]
    pub dangerous_interactions: Option<Vec<InteractionRef>>,
    #[serde(default)]
    pub unsafe_interactions: Option<Vec<InteractionRef>>,
    #[serde(default)]
    pub uncertain_interactions: Option<Vec<InteractionRef>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstanceRecord {
    pub name: SubstanceName,
    pub url: Option<String>,
    pub featured: Option<bool>,
    pub summary: Option<String>,
    pub roas: Option<Vec<Roa>>,
    pub images: Option<Vec<ImageRef>>,
    pub addiction_potential: Option<String>,
    pub tolerance: Option<Tolerance>,
    pub dangerous_interactions: Option<Vec<InteractionRef>>,
    pub unsafe_interactions: Option<Vec<InteractionRef>>,
    pub uncertain_interactions: Option<Vec<InteractionRef>>,
    #[serde(rename = "interactions_flat")]
    pub interactions_flat: Vec<FlatInteraction>,
}
