use crate::domain::{
    FlatInteraction, InteractionRef, InteractionStatus, RawSubstance, SubstanceName,
    SubstanceRecord,
};
use crate::error::MirrorError;

pub fn transform(raw: RawSubstance) -> Result<SubstanceRecord, MirrorError> {
    let name = record_name(&raw)?;
    let interactions_flat = flatten_interactions(&raw);

    Ok(SubstanceRecord {
        name,
        url: raw.url,
        featured: raw.featured,
        summary: raw.summary,
        roas: raw.roas,
        images: raw.images,
        addiction_potential: raw.addiction_potential,
        tolerance: raw.tolerance,
        dangerous_interactions: raw.dangerous_interactions,
        unsafe_interactions: raw.unsafe_interactions,
        uncertain_interactions: raw.uncertain_interactions,
        interactions_flat,
    })
}

pub fn record_name(raw: &RawSubstance) -> Result<SubstanceName, MirrorError> {
    match raw.name.as_deref() {
        Some(value) => value.parse(),
        None => Err(MirrorError::MalformedRecord(
            "substance record has no name".to_string(),
        )),
    }
}

pub fn flatten_interactions(raw: &RawSubstance) -> Vec<FlatInteraction> {
    // Category order is part of the stored contract: dangerous, unsafe, uncertain.
    let categories: [(&Option<Vec<InteractionRef>>, InteractionStatus); 3] = [
        (&raw.dangerous_interactions, InteractionStatus::Dangerous),
        (&raw.unsafe_interactions, InteractionStatus::Unsafe),
        (&raw.uncertain_interactions, InteractionStatus::Caution),
    ];

    let mut flat = Vec::new();
    for (entries, status) in categories {
        let Some(entries) = entries else {
            continue;
        };
        for entry in entries {
            if let Some(name) = &entry.name {
                flat.push(FlatInteraction {
                    name: name.clone(),
                    status,
                });
            }
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn raw(name: &str) -> RawSubstance {
        serde_json::from_value(serde_json::json!({ "name": name })).unwrap()
    }

    fn refs(names: &[&str]) -> Option<Vec<InteractionRef>> {
        Some(
            names
                .iter()
                .map(|name| InteractionRef {
                    name: Some(name.to_string()),
                })
                .collect(),
        )
    }

    #[test]
    fn flatten_preserves_category_order() {
        let mut substance = raw("2C-B");
        substance.dangerous_interactions = refs(&["Tramadol", "Lithium"]);
        substance.unsafe_interactions = refs(&["MAOI"]);
        substance.uncertain_interactions = refs(&["Cannabis", "Alcohol"]);

        let flat = flatten_interactions(&substance);
        assert_eq!(flat.len(), 5);
        let labels: Vec<(&str, InteractionStatus)> = flat
            .iter()
            .map(|entry| (entry.name.as_str(), entry.status))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Tramadol", InteractionStatus::Dangerous),
                ("Lithium", InteractionStatus::Dangerous),
                ("MAOI", InteractionStatus::Unsafe),
                ("Cannabis", InteractionStatus::Caution),
                ("Alcohol", InteractionStatus::Caution),
            ]
        );
    }

    #[test]
    fn flatten_without_interactions_is_empty() {
        let substance = raw("Caffeine");
        assert!(flatten_interactions(&substance).is_empty());

        let mut empty_lists = raw("Caffeine");
        empty_lists.dangerous_interactions = Some(Vec::new());
        empty_lists.unsafe_interactions = Some(Vec::new());
        empty_lists.uncertain_interactions = Some(Vec::new());
        assert!(flatten_interactions(&empty_lists).is_empty());
    }

    #[test]
    fn flatten_skips_nameless_references() {
        let mut substance = raw("DOM");
        substance.unsafe_interactions = Some(vec![
            InteractionRef { name: None },
            InteractionRef {
                name: Some("MAOI".to_string()),
            },
        ]);

        let flat = flatten_interactions(&substance);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].name, "MAOI");
    }

    #[test]
    fn transform_caffeine_example() {
        let mut substance = raw("Caffeine");
        substance.dangerous_interactions = Some(Vec::new());
        substance.unsafe_interactions = refs(&["MAOI"]);
        substance.uncertain_interactions = refs(&["Alcohol"]);

        let record = transform(substance).unwrap();
        assert_eq!(record.name.as_str(), "Caffeine");
        assert_eq!(
            record.interactions_flat,
            vec![
                FlatInteraction {
                    name: "MAOI".to_string(),
                    status: InteractionStatus::Unsafe,
                },
                FlatInteraction {
                    name: "Alcohol".to_string(),
                    status: InteractionStatus::Caution,
                },
            ]
        );
    }

    #[test]
    fn transform_passes_fields_through() {
        let substance: RawSubstance = serde_json::from_value(serde_json::json!({
            "name": "LSD",
            "url": "https://psychonautwiki.org/wiki/LSD",
            "featured": true,
            "summary": "A psychedelic.",
            "addictionPotential": "low",
            "tolerance": { "full": "immediately", "half": "3 days", "zero": "7 days" },
        }))
        .unwrap();

        let record = transform(substance).unwrap();
        assert_eq!(record.url.as_deref(), Some("https://psychonautwiki.org/wiki/LSD"));
        assert_eq!(record.featured, Some(true));
        assert_eq!(record.addiction_potential.as_deref(), Some("low"));
        assert_eq!(
            record.tolerance.as_ref().and_then(|t| t.half.as_deref()),
            Some("3 days")
        );
        assert!(record.interactions_flat.is_empty());
    }

    #[test]
    fn transform_rejects_missing_name() {
        let substance: RawSubstance = serde_json::from_value(serde_json::json!({})).unwrap();
        let err = transform(substance).unwrap_err();
        assert_matches!(err, MirrorError::MalformedRecord(_));
    }

    #[test]
    fn transform_rejects_blank_name() {
        let err = transform(raw("  ")).unwrap_err();
        assert_matches!(err, MirrorError::MalformedRecord(_));
    }
}
