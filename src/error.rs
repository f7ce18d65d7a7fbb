//! Error types shared across the engine.

use crate::database::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    /// Input that has no safe default to clamp to.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
