//! JSON file fingerprint store.
//!
//! One pretty-printed JSON file per user. Writes go to a temporary file
//! that is renamed over the old record, so readers never see a partial
//! record. Compare-and-swap is serialized within this process only.

use crate::store::{
    check_swap, revision_of, validate_user_id, FingerprintRecord, FingerprintStore, StoreError,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Store keeping each user's record in `<dir>/<user_id>.json`.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, user_id: &str) -> PathBuf {
        self.dir.join(format!("{user_id}.json"))
    }

    fn read_record(&self, user_id: &str) -> Result<Option<FingerprintRecord>, StoreError> {
        let path = self.record_path(user_id);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let record = serde_json::from_str(&content)?;
        Ok(Some(record))
    }
}

impl FingerprintStore for JsonFileStore {
    fn load(&self, user_id: &str) -> Result<Option<FingerprintRecord>, StoreError> {
        validate_user_id(user_id)?;
        self.read_record(user_id)
    }

    fn compare_and_swap(
        &self,
        record: FingerprintRecord,
        expected_revision: u64,
    ) -> Result<(), StoreError> {
        validate_user_id(&record.user_id)?;
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let current = self.read_record(&record.user_id)?;
        check_swap(&record, revision_of(current.as_ref()), expected_revision)?;

        let path = self.record_path(&record.user_id);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &path)?;

        tracing::debug!(user_id = %record.user_id, revision = record.revision, "record written");
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<String>, StoreError> {
        let mut users: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .filter(|id| validate_user_id(id).is_ok())
            .collect();
        users.sort();
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test_support::record;

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("records")).unwrap();

        store.compare_and_swap(record("erin", 1, 42.0), 0).unwrap();

        // A second handle over the same directory sees the record.
        let reopened = JsonFileStore::open(store.dir()).unwrap();
        let loaded = reopened.load("erin").unwrap().unwrap();
        assert_eq!(loaded.revision, 1);
        assert_eq!(loaded.fingerprint, record("erin", 1, 42.0).fingerprint);
        assert!(!store.dir().join("erin.json.tmp").exists());
    }

    #[test]
    fn test_conflict_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        store.compare_and_swap(record("finn", 1, 1.0), 0).unwrap();
        let err = store.compare_and_swap(record("finn", 1, 2.0), 0).unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.load("../escape"),
            Err(StoreError::InvalidUserId(_))
        ));
    }

    #[test]
    fn test_list_users_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        store.compare_and_swap(record("gus", 1, 1.0), 0).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        assert_eq!(store.list_users().unwrap(), vec!["gus"]);
    }
}
