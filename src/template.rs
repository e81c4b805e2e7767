// src/template.rs
//! The persisted template record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// How many hex characters of the stem hash make up a derived id.
pub const DERIVED_ID_LEN: usize = 16;

/// A named, ordered collection of text-prompt entries captured from a
/// workflow. Entry content is opaque: it is only hashed and round-tripped.
///
/// On-disk identity is the sanitized `name`, not `id`: two names that
/// sanitize to the same filename overwrite each other. That tradeoff is
/// inherited from the original extension and kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub entries: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Absolute source path, attached on load only. Never required as
    /// input and stripped before any write.
    #[serde(rename = "_file_path", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Unknown fields round-trip untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Template {
    pub fn new(name: String, entries: Vec<Value>) -> Self {
        Self {
            name,
            entries,
            id: None,
            created_at: None,
            updated_at: None,
            hash: None,
            file_path: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set `updatedAt` to `now`, defaulting `createdAt` to the same value
    /// when first created.
    pub fn stamp(&mut self, now: &str) {
        self.updated_at = Some(now.to_string());
        if self.created_at.is_none() {
            self.created_at = Some(now.to_string());
        }
    }
}

/// Derive a stable template id from a filename stem.
///
/// Two loads of the same file always yield the same id.
pub fn derive_id(stem: &str) -> String {
    let digest = Sha256::digest(stem.as_bytes());
    hex::encode(digest)[..DERIVED_ID_LEN].to_string()
}
