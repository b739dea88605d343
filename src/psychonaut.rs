use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::domain::RawSubstance;
use crate::error::MirrorError;

pub const DEFAULT_ENDPOINT: &str = "https://api.psychonautwiki.org/";
pub const DEFAULT_SUBSTANCE_LIMIT: usize = 5000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const SUBSTANCE_FIELDS: &str = r#"{
        name
        url
        featured
        summary
        roas {
            name
            dose {
                units
                threshold
                light { min max }
                common { min max }
                strong { min max }
                heavy
            }
            duration {
                onset { min max units }
                comeup { min max units }
                peak { min max units }
                offset { min max units }
                total { min max units }
                afterglow { min max units }
            }
            bioavailability { min max }
        }
        images {
            thumb
        }
        addictionPotential
        tolerance {
            full
            half
            zero
        }
        dangerousInteractions {
            name
        }
        unsafeInteractions {
            name
        }
        uncertainInteractions {
            name
        }
    }"#;

pub trait PsychonautClient: Send + Sync {
    fn fetch_substances(&self) -> Result<Vec<RawSubstance>, MirrorError>;
}

#[derive(Clone)]
pub struct PsychonautHttpClient {
    client: Client,
    endpoint: String,
    substance_limit: usize,
}

impl PsychonautHttpClient {
    pub fn new(
        endpoint: &str,
        substance_limit: usize,
        timeout: Duration,
    ) -> Result<Self, MirrorError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("substance-mirror/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| MirrorError::RemoteHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| MirrorError::RemoteHttp(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            substance_limit,
        })
    }

    pub fn substance_query(limit: usize) -> String {
        format!("{{ substances(limit: {limit}) {SUBSTANCE_FIELDS} }}")
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, MirrorError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "catalog request failed".to_string());
        Err(MirrorError::RemoteStatus { status, message })
    }
}

impl PsychonautClient for PsychonautHttpClient {
    fn fetch_substances(&self) -> Result<Vec<RawSubstance>, MirrorError> {
        let query = Self::substance_query(self.substance_limit);
        let body = serde_json::json!({ "query": query });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .map_err(|err| MirrorError::RemoteHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;

        let payload: GraphqlResponse = response
            .json()
            .map_err(|err| MirrorError::MalformedPayload(err.to_string()))?;
        extract_substances(payload)
    }
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<SubstanceData>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub struct SubstanceData {
    #[serde(default)]
    pub substances: Option<Vec<RawSubstance>>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    #[serde(default)]
    pub message: String,
}

pub fn extract_substances(payload: GraphqlResponse) -> Result<Vec<RawSubstance>, MirrorError> {
    if let Some(errors) = payload.errors {
        if !errors.is_empty() {
            let joined = errors
                .iter()
                .map(|error| error.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MirrorError::RemoteQuery(joined));
        }
    }

    payload
        .data
        .and_then(|data| data.substances)
        .ok_or_else(|| MirrorError::MalformedPayload("response has no substances array".to_string()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn query_carries_limit_and_field_set() {
        let query = PsychonautHttpClient::substance_query(5000);
        assert!(query.contains("substances(limit: 5000)"));
        assert!(query.contains("addictionPotential"));
        assert!(query.contains("dangerousInteractions"));
        assert!(query.contains("uncertainInteractions"));
        assert!(query.contains("afterglow { min max units }"));
    }

    #[test]
    fn extract_rejects_query_errors() {
        let payload: GraphqlResponse = serde_json::from_str(
            r#"{"errors": [{"message": "Cannot query field"}, {"message": "limit too high"}]}"#,
        )
        .unwrap();
        let err = extract_substances(payload).unwrap_err();
        assert_matches!(err, MirrorError::RemoteQuery(message) => {
            assert!(message.contains("Cannot query field"));
            assert!(message.contains("limit too high"));
        });
    }

    #[test]
    fn extract_rejects_payload_without_substances() {
        let payload: GraphqlResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        let err = extract_substances(payload).unwrap_err();
        assert_matches!(err, MirrorError::MalformedPayload(_));
    }

    #[test]
    fn extract_returns_substances_unchanged() {
        let payload: GraphqlResponse = serde_json::from_str(
            r#"{"data": {"substances": [{"name": "Caffeine"}, {"name": "LSD"}]}}"#,
        )
        .unwrap();
        let substances = extract_substances(payload).unwrap();
        assert_eq!(substances.len(), 2);
        assert_eq!(substances[0].name.as_deref(), Some("Caffeine"));
        assert_eq!(substances[1].name.as_deref(), Some("LSD"));
    }
}
