use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::domain::SubstanceRecord;
use crate::error::MirrorError;

pub const DATABASE_NAME: &str = "app_db";
pub const SUBSTANCE_COLLECTION: &str = "substances";
const RECEIPT_FILE: &str = "last_sync.json";

pub trait SubstanceStore: Send + Sync {
    fn upsert(&self, record: &SubstanceRecord) -> Result<(), MirrorError>;
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: Utf8PathBuf,
}

impl DocumentStore {
    pub fn open(store_url: &str) -> Result<Self, MirrorError> {
        let trimmed = store_url.trim();
        let path = trimmed.strip_prefix("file://").unwrap_or(trimmed);
        if path.is_empty() {
            return Err(MirrorError::InvalidStoreUrl(store_url.to_string()));
        }
        Ok(Self {
            root: Utf8PathBuf::from(path),
        })
    }

    pub fn new_with_root(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn collection_dir(&self) -> Utf8PathBuf {
        self.root.join(DATABASE_NAME).join(SUBSTANCE_COLLECTION)
    }

    pub fn document_path(&self, name: &str) -> Utf8PathBuf {
        self.collection_dir()
            .join(format!("{}.json", encode_document_name(name)))
    }

    pub fn read(&self, name: &str) -> Result<Option<SubstanceRecord>, MirrorError> {
        let path = self.document_path(name);
        if !path.as_std_path().exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        let record = serde_json::from_str(&content)
            .map_err(|err| MirrorError::Filesystem(err.to_string()))?;
        Ok(Some(record))
    }

    pub fn receipt_path(&self) -> Utf8PathBuf {
        self.root.join(DATABASE_NAME).join(RECEIPT_FILE)
    }

    pub fn write_receipt(&self, receipt: &SyncReceipt) -> Result<(), MirrorError> {
        write_json_atomic(&self.receipt_path(), receipt).map_err(MirrorError::Filesystem)
    }
}

impl SubstanceStore for DocumentStore {
    fn upsert(&self, record: &SubstanceRecord) -> Result<(), MirrorError> {
        let path = self.document_path(record.name.as_str());
        write_json_atomic(&path, record).map_err(|message| MirrorError::StoreWrite {
            name: record.name.as_str().to_string(),
            message,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReceipt {
    pub synced_at: String,
    pub found: usize,
    pub upserted: usize,
    pub failed: usize,
    pub tool: String,
}

impl SyncReceipt {
    pub fn new(found: usize, upserted: usize, failed: usize) -> Self {
        Self {
            synced_at: chrono::Utc::now().to_rfc3339(),
            found,
            upserted,
            failed,
            tool: format!("substance-mirror/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

// Write to a temp file in the destination directory, then rename over the
// destination. Readers see either the old document or the new one, never a
// missing key.
fn write_json_atomic<T: Serialize>(path: &Utf8Path, value: &T) -> Result<(), String> {
    let parent = path
        .parent()
        .ok_or_else(|| "document path has no parent".to_string())?;
    fs::create_dir_all(parent.as_std_path()).map_err(|err| err.to_string())?;
    let content = serde_json::to_vec_pretty(value).map_err(|err| err.to_string())?;
    let mut temp = tempfile::Builder::new()
        .prefix(".upsert")
        .suffix(".tmp")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| err.to_string())?;
    temp.write_all(&content).map_err(|err| err.to_string())?;
    temp.persist(path.as_std_path())
        .map_err(|err| err.to_string())?;
    Ok(())
}

pub fn encode_document_name(name: &str) -> String {
    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z' | b'-' | b'_' | b'.' => {
                encoded.push(byte as char);
            }
            other => {
                encoded.push_str(&format!("%{other:02X}"));
            }
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_keeps_safe_names() {
        assert_eq!(encode_document_name("LSD"), "LSD");
        assert_eq!(encode_document_name("2C-B"), "2C-B");
        assert_eq!(encode_document_name("Alpha-GPC"), "Alpha-GPC");
    }

    #[test]
    fn encode_escapes_unsafe_bytes() {
        assert_eq!(encode_document_name("1,4-Butanediol"), "1%2C4-Butanediol");
        assert_eq!(encode_document_name("a/b"), "a%2Fb");
        assert_eq!(encode_document_name("50%"), "50%25");
        assert_eq!(encode_document_name("N,N-DMT"), "N%2CN-DMT");
    }

    #[test]
    fn document_layout() {
        let store = DocumentStore::new_with_root(Utf8PathBuf::from("/var/lib/mirror"));
        let path = store.document_path("LSD");
        assert!(path.ends_with("app_db/substances/LSD.json"));
        assert!(store.receipt_path().ends_with("app_db/last_sync.json"));
    }

    #[test]
    fn open_accepts_file_url_and_plain_path() {
        let store = DocumentStore::open("file:///var/lib/mirror").unwrap();
        assert_eq!(store.root().as_str(), "/var/lib/mirror");

        let store = DocumentStore::open("/var/lib/mirror").unwrap();
        assert_eq!(store.root().as_str(), "/var/lib/mirror");
    }

    #[test]
    fn open_rejects_empty_url() {
        assert!(DocumentStore::open("").is_err());
        assert!(DocumentStore::open("file://").is_err());
    }
}
