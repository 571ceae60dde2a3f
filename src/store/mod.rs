//! Fingerprint persistence with optimistic versioning.
//!
//! The analytics core never persists anything. Callers hand regenerated
//! records to a [`FingerprintStore`], which accepts a write only if the
//! stored revision still matches the one the regeneration started from.
//! Two racing regenerations for one user therefore cannot silently
//! overwrite each other: the loser gets [`StoreError::Conflict`] and must
//! reload and retry.

pub mod file;
pub mod memory;

use crate::core::{DnaFingerprint, MutationHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Longest accepted user identifier.
const MAX_USER_ID_LEN: usize = 128;

/// Stored state for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub user_id: String,
    /// Starts at 1 and grows by one per successful write
    pub revision: u64,
    pub fingerprint: DnaFingerprint,
    /// Append-only mutation history, oldest first
    pub mutations: MutationHistory,
    pub updated_at: DateTime<Utc>,
}

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("revision conflict for '{user_id}': expected {expected}, found {actual}")]
    Conflict {
        user_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("record for '{user_id}' must carry revision {expected}, got {actual}")]
    InvalidRevision {
        user_id: String,
        expected: u64,
        actual: u64,
    },

    #[error("invalid user id '{0}'")]
    InvalidUserId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Persistence boundary for fingerprint records.
pub trait FingerprintStore: Send + Sync {
    /// Load the current record for a user, if any.
    fn load(&self, user_id: &str) -> Result<Option<FingerprintRecord>, StoreError>;

    /// Write `record` if the stored revision equals `expected_revision`.
    ///
    /// A user with no record has revision 0. `record.revision` must be
    /// `expected_revision + 1`.
    fn compare_and_swap(
        &self,
        record: FingerprintRecord,
        expected_revision: u64,
    ) -> Result<(), StoreError>;

    /// All users with a stored record, sorted.
    fn list_users(&self) -> Result<Vec<String>, StoreError>;
}

/// Revision of an optional record, 0 when absent.
pub fn revision_of(record: Option<&FingerprintRecord>) -> u64 {
    record.map(|r| r.revision).unwrap_or(0)
}

/// Reject identifiers that are empty, too long, or unsafe as file names.
pub fn validate_user_id(user_id: &str) -> Result<(), StoreError> {
    let valid = !user_id.is_empty()
        && user_id.len() <= MAX_USER_ID_LEN
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidUserId(user_id.to_string()))
    }
}

/// Shared precondition check for `compare_and_swap` implementations.
pub(crate) fn check_swap(
    record: &FingerprintRecord,
    stored_revision: u64,
    expected_revision: u64,
) -> Result<(), StoreError> {
    if stored_revision != expected_revision {
        return Err(StoreError::Conflict {
            user_id: record.user_id.clone(),
            expected: expected_revision,
            actual: stored_revision,
        });
    }
    if record.revision != expected_revision + 1 {
        return Err(StoreError::InvalidRevision {
            user_id: record.user_id.clone(),
            expected: expected_revision + 1,
            actual: record.revision,
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::core::{build_fingerprint, ComponentVector};

    pub fn record(user_id: &str, revision: u64, level: f64) -> FingerprintRecord {
        FingerprintRecord {
            user_id: user_id.to_string(),
            revision,
            fingerprint: build_fingerprint(&ComponentVector::from_values([level; 5])),
            mutations: MutationHistory::new(),
            updated_at: Utc::now(),
        }
    }
}
