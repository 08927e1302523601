//! Error types for netdb-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Invalid config: {field} - {reason}")]
    InvalidConfig { field: String, reason: String },
}
