use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MirrorError {
    #[error("store connection string is not set (SUBSTANCE_STORE_URL)")]
    MissingStoreUrl,

    #[error("invalid store connection string: {0}")]
    InvalidStoreUrl(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("catalog request failed: {0}")]
    RemoteHttp(String),

    #[error("catalog returned status {status}: {message}")]
    RemoteStatus { status: u16, message: String },

    #[error("catalog query rejected: {0}")]
    RemoteQuery(String),

    #[error("malformed catalog payload: {0}")]
    MalformedPayload(String),

    #[error("malformed substance record: {0}")]
    MalformedRecord(String),

    #[error("store write failed for {name}: {message}")]
    StoreWrite { name: String, message: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
