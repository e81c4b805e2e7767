use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlexandriaError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid template name: {0:?} sanitizes to an empty filename")]
    InvalidName(String),

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AlexandriaError>;
