//! Error types for Habit DNA.
//!
//! The analytics core never fails. These errors cover the edges around it:
//! configuration, reading logs and the fingerprint store.

use crate::config::ConfigError;
use crate::store::StoreError;
use thiserror::Error;

/// Main error type for Habit DNA operations
#[derive(Error, Debug)]
pub enum DnaError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fingerprint store error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// No stored fingerprint for a user
    #[error("No fingerprint stored for '{0}'")]
    NotFound(String),

    /// Unreadable activity log
    #[error("Invalid input: {0}")]
    Input(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Optimistic writes kept conflicting
    #[error("Gave up storing fingerprint for '{user_id}' after {attempts} conflicting attempts")]
    RetriesExhausted { user_id: String, attempts: u32 },
}

/// Result type for Habit DNA operations
pub type DnaResult<T> = Result<T, DnaError>;

impl DnaError {
    /// Create an input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }
}
