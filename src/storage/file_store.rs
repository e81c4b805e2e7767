// src/storage/file_store.rs
//! Flat-file JSON persistence for templates.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{AlexandriaError, Result};
use crate::template::{derive_id, Template};

use super::paths::StorageRoot;
use super::sanitize::sanitize_name;

/// Result of a directory scan: successfully parsed templates plus a count
/// of files that were skipped because they could not be parsed.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub templates: Vec<Template>,
    pub skipped: usize,
}

/// CRUD over `<sanitized-name>.json` files in the active storage root.
///
/// Every operation re-resolves the root, so a root change between calls is
/// honored without restart.
#[derive(Clone)]
pub struct TemplateStore {
    root: Arc<StorageRoot>,
}

impl TemplateStore {
    pub fn new(root: Arc<StorageRoot>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &StorageRoot {
        &self.root
    }

    /// Resolve the on-disk path for `name`, rejecting names that sanitize
    /// to an empty filename.
    fn template_path(&self, name: &str) -> Result<PathBuf> {
        let stem = sanitize_name(name);
        if stem.is_empty() {
            return Err(AlexandriaError::InvalidName(name.to_string()));
        }
        Ok(self.root.resolve().join(format!("{stem}.json")))
    }

    /// Write `template` as pretty-printed UTF-8 JSON, creating the storage
    /// directory if needed. An existing file of the same sanitized name is
    /// silently overwritten. Returns the absolute path written.
    pub fn save(&self, template: &Template) -> Result<PathBuf> {
        let path = self.template_path(&template.name)?;
        let dir = self.root.resolve();
        fs::create_dir_all(&dir).map_err(|e| {
            AlexandriaError::Storage(format!("cannot create {}: {e}", dir.display()))
        })?;

        // _file_path is a load-time annotation, never persisted.
        let mut record = template.clone();
        record.file_path = None;

        let json = serde_json::to_string_pretty(&record)?;
        fs::write(&path, json).map_err(|e| {
            AlexandriaError::Storage(format!("cannot write {}: {e}", path.display()))
        })?;

        tracing::debug!(name = %template.name, path = %path.display(), "saved template");
        Ok(path)
    }

    /// Scan the storage root for `*.json` files and parse each one.
    ///
    /// A missing directory yields an empty outcome, not an error. Files
    /// that fail to read or parse are skipped and counted; the scan never
    /// aborts on a bad file. Missing `name` defaults to the file stem,
    /// missing `id` is derived from the stem, and `_file_path` is attached.
    /// Order follows filesystem enumeration and is not sorted.
    pub fn load_all(&self) -> Result<ScanOutcome> {
        let dir = self.root.resolve();
        if !dir.is_dir() {
            return Ok(ScanOutcome::default());
        }

        let mut outcome = ScanOutcome::default();
        for entry in fs::read_dir(&dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    outcome.skipped += 1;
                    tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match self.load_one(&path) {
                Ok(template) => outcome.templates.push(template),
                Err(e) => {
                    outcome.skipped += 1;
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable template file");
                }
            }
        }

        Ok(outcome)
    }

    fn load_one(&self, path: &Path) -> Result<Template> {
        let raw = fs::read_to_string(path)?;
        let mut template: Template = serde_json::from_str(&raw)?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        if template.name.is_empty() {
            template.name = stem.to_string();
        }
        if template.id.is_none() {
            template.id = Some(derive_id(stem));
        }
        template.file_path = Some(path.display().to_string());

        Ok(template)
    }

    /// Unlink the file for `name`. Returns `false` when no such file
    /// exists; deleting an absent template is not an error.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let path = self.template_path(name)?;
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| {
            AlexandriaError::Storage(format!("cannot delete {}: {e}", path.display()))
        })?;
        tracing::debug!(name = %name, path = %path.display(), "deleted template");
        Ok(true)
    }
}
