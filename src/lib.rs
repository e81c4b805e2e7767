pub mod cache;
pub mod cli;
pub mod error;
pub mod http;
pub mod node;
pub mod storage;
pub mod template;

pub use cache::{DiffCache, DiffOutcome};
pub use error::{AlexandriaError, Result};
pub use storage::{StorageRoot, TemplateStore};
pub use template::Template;
