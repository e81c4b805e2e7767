mod file_store;
mod paths;
mod sanitize;

pub use file_store::{ScanOutcome, TemplateStore};
pub use paths::{StorageRoot, DEFAULT_STORAGE_DIR};
pub use sanitize::sanitize_name;
