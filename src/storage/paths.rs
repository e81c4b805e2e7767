// src/storage/paths.rs
//! Active storage-root resolution.

use std::env;
use std::path::PathBuf;

use parking_lot::RwLock;

/// Directory used when no storage root has been set, relative to the
/// working directory.
pub const DEFAULT_STORAGE_DIR: &str = "alexandria_templates";

/// The single active storage directory.
///
/// Shared explicitly (behind `Arc`) by the file store and every HTTP
/// handler rather than living in a process-wide static, so the locking is
/// visible at the call site. The lock is never held across an await point.
/// Store operations re-resolve on every call, so a mid-session root change
/// takes effect without a restart.
#[derive(Debug, Default)]
pub struct StorageRoot {
    active: RwLock<Option<PathBuf>>,
}

impl StorageRoot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an explicit root instead of the default.
    pub fn with_root(path: impl Into<PathBuf>) -> Self {
        Self {
            active: RwLock::new(Some(path.into())),
        }
    }

    /// Store `path` verbatim. No validation; last write wins.
    pub fn set(&self, path: impl Into<PathBuf>) {
        *self.active.write() = Some(path.into());
    }

    /// Resolve the active root to an absolute path.
    ///
    /// Unset falls back to [`DEFAULT_STORAGE_DIR`]; relative paths are
    /// joined onto the current working directory. Never creates the
    /// directory; callers ensure existence before I/O.
    pub fn resolve(&self) -> PathBuf {
        let path = self
            .active
            .read()
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        if path.is_absolute() {
            path
        } else {
            let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            cwd.join(path)
        }
    }

    /// Whether the resolved directory currently exists on disk.
    pub fn exists(&self) -> bool {
        self.resolve().is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_defaults_to_constant_dir() {
        let root = StorageRoot::new();
        let resolved = root.resolve();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with(DEFAULT_STORAGE_DIR));
    }

    #[test]
    fn test_resolve_joins_relative_onto_cwd() {
        let root = StorageRoot::new();
        root.set("my_templates");
        let resolved = root.resolve();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("my_templates"));
    }

    #[test]
    fn test_resolve_keeps_absolute_path() {
        let tmp = TempDir::new().unwrap();
        let root = StorageRoot::new();
        root.set(tmp.path());
        assert_eq!(root.resolve(), tmp.path());
    }

    #[test]
    fn test_mid_session_change_takes_effect() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let root = StorageRoot::with_root(a.path());
        assert_eq!(root.resolve(), a.path());
        root.set(b.path());
        assert_eq!(root.resolve(), b.path());
    }

    #[test]
    fn test_resolve_never_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let root = StorageRoot::with_root(&missing);
        let _ = root.resolve();
        assert!(!missing.exists());
        assert!(!root.exists());
    }
}
