//! Error types for the grid tactics engine
//!
//! Rule operations never fail with these: an illegal move or input is a
//! silent no-op. Errors cover content/config loading and id lookups.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Entity not found: {0}")]
    EntityNotFound(u32),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
