use std::time::Duration;

use crate::error::MirrorError;
use crate::psychonaut::{DEFAULT_ENDPOINT, DEFAULT_SUBSTANCE_LIMIT, DEFAULT_TIMEOUT_SECS};

pub const STORE_URL_VAR: &str = "SUBSTANCE_STORE_URL";
pub const ENDPOINT_VAR: &str = "SUBSTANCE_API_URL";
pub const LIMIT_VAR: &str = "SUBSTANCE_SYNC_LIMIT";

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub store_url: Option<String>,
    pub endpoint: Option<String>,
    pub substance_limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub store_url: String,
    pub endpoint: String,
    pub substance_limit: usize,
    pub timeout: Duration,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(overrides: ConfigOverrides) -> Result<SyncConfig, MirrorError> {
        Self::resolve_with(overrides, |name| std::env::var(name).ok())
    }

    pub fn resolve_with(
        overrides: ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SyncConfig, MirrorError> {
        let store_url = overrides
            .store_url
            .or_else(|| lookup(STORE_URL_VAR))
            .filter(|value| !value.trim().is_empty())
            .ok_or(MirrorError::MissingStoreUrl)?;

        let endpoint = overrides
            .endpoint
            .or_else(|| lookup(ENDPOINT_VAR))
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let substance_limit = match overrides.substance_limit {
            Some(limit) => limit,
            None => match lookup(LIMIT_VAR) {
                Some(value) => value.trim().parse::<usize>().map_err(|_| {
                    MirrorError::InvalidConfig(format!(
                        "{LIMIT_VAR} must be a positive integer, got {value:?}"
                    ))
                })?,
                None => DEFAULT_SUBSTANCE_LIMIT,
            },
        };
        if substance_limit == 0 {
            return Err(MirrorError::InvalidConfig(
                "substance limit must be at least 1".to_string(),
            ));
        }

        Ok(SyncConfig {
            store_url,
            endpoint,
            substance_limit,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }
}
