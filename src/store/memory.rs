//! In-memory fingerprint store.

use crate::store::{
    check_swap, revision_of, validate_user_id, FingerprintRecord, FingerprintStore, StoreError,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// Thread-safe store backed by a map. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, FingerprintRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FingerprintStore for MemoryStore {
    fn load(&self, user_id: &str) -> Result<Option<FingerprintRecord>, StoreError> {
        validate_user_id(user_id)?;
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(user_id).cloned())
    }

    fn compare_and_swap(
        &self,
        record: FingerprintRecord,
        expected_revision: u64,
    ) -> Result<(), StoreError> {
        validate_user_id(&record.user_id)?;
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;

        check_swap(&record, revision_of(records.get(&record.user_id)), expected_revision)?;
        records.insert(record.user_id.clone(), record);
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<String>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        let mut users: Vec<String> = records.keys().cloned().collect();
        users.sort();
        Ok(users)
    }
}
