//! Fingerprint regeneration pipeline.
//!
//! ```text
//! raw log ──▶ validate ──▶ window ──▶ analyze ──▶ ComponentVector
//!                                                   │
//!                          ┌────────────────────────┼──────────────────┐
//!                          ▼                        ▼                  ▼
//!                  sequence + colors        mutation detection   (compare, on demand)
//!                          │                        │
//!                          └──────▶ Regeneration ◀──┘
//!                                        │
//!                                        ▼  caller-owned, optimistic
//!                                 FingerprintStore
//! ```
//!
//! [`DnaEngine::regenerate`] is pure with respect to storage. Persisting the
//! result is a separate step, either by the caller or through
//! [`DnaEngine::regenerate_and_store`], which retries on revision conflicts.

use crate::audit::{AuditLog, SharedAuditLog};
use crate::config::Config;
use crate::core::mutation::detect_at;
use crate::core::{
    analyze, build_fingerprint, compare, CompatibilityResult, ComponentVector, DnaFingerprint,
    MutationEvent,
};
use crate::entry::{validate_entries, ActivityWindow, HabitEntry, RawHabitEntry, StreakSummary};
use crate::error::{DnaError, DnaResult};
use crate::store::{revision_of, FingerprintRecord, FingerprintStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of one regeneration, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regeneration {
    pub user_id: String,
    pub fingerprint: DnaFingerprint,
    /// Set when the vector drifted past the mutation threshold
    pub mutation: Option<MutationEvent>,
    /// Revision of the record this regeneration started from (0 if none)
    pub base_revision: u64,
    /// Entries inside the activity window that were analyzed
    pub entries_analyzed: usize,
    pub generated_at: DateTime<Utc>,
}

impl Regeneration {
    /// Turn this regeneration into the next record for the user.
    ///
    /// The mutation, if any, is appended after the previous history.
    pub fn into_record(self, previous: Option<&FingerprintRecord>) -> FingerprintRecord {
        let mut mutations = previous.map(|r| r.mutations.clone()).unwrap_or_default();
        if let Some(event) = self.mutation {
            mutations.push(event);
        }

        FingerprintRecord {
            user_id: self.user_id,
            revision: self.base_revision + 1,
            fingerprint: self.fingerprint,
            mutations,
            updated_at: self.generated_at,
        }
    }
}

/// A regeneration that was successfully stored.
#[derive(Debug, Clone)]
pub struct Committed {
    pub record: FingerprintRecord,
    pub mutation: Option<MutationEvent>,
    /// Number of conflicting writes before this one succeeded
    pub conflicts: u32,
}

/// Regenerates fingerprints and compares users.
///
/// Holds no per-user state, so one engine can serve many threads.
pub struct DnaEngine {
    lookback: Duration,
    timezone: Tz,
    max_cas_retries: u32,
    audit: SharedAuditLog,
}

impl DnaEngine {
    /// Create an engine from configuration with a fresh audit log.
    pub fn new(config: &Config) -> DnaResult<Self> {
        Self::with_audit(config, Arc::new(AuditLog::new()))
    }

    /// Create an engine that reports into an existing audit log.
    pub fn with_audit(config: &Config, audit: SharedAuditLog) -> DnaResult<Self> {
        Ok(Self {
            lookback: config.lookback_window(),
            timezone: config.tz()?,
            max_cas_retries: config.max_cas_retries,
            audit,
        })
    }

    pub fn audit(&self) -> &SharedAuditLog {
        &self.audit
    }

    /// Validate raw entries, skipping malformed ones.
    pub fn prepare(&self, raws: Vec<RawHabitEntry>) -> Vec<HabitEntry> {
        let (entries, skipped) = validate_entries(raws);
        if skipped > 0 {
            tracing::debug!(skipped, accepted = entries.len(), "malformed entries skipped");
        }
        self.audit.record_entries(0, skipped as u64);
        entries
    }

    /// Derive a streak summary from the log in the configured timezone.
    pub fn derive_streaks(&self, entries: &[HabitEntry], as_of: DateTime<Utc>) -> StreakSummary {
        StreakSummary::from_entries(entries, self.timezone, as_of)
    }

    /// Fingerprint every given entry, with no activity window applied.
    pub fn fingerprint_log(
        &self,
        entries: &[HabitEntry],
        streaks: Option<&StreakSummary>,
    ) -> DnaFingerprint {
        let fingerprint = build_fingerprint(&analyze(entries, streaks));

        self.audit.record_entries(entries.len() as u64, 0);
        self.audit.record_fingerprint();
        fingerprint
    }

    /// Regenerate a user's fingerprint as of now.
    pub fn regenerate(
        &self,
        user_id: &str,
        entries: &[HabitEntry],
        streaks: Option<&StreakSummary>,
        previous: Option<&FingerprintRecord>,
    ) -> Regeneration {
        self.regenerate_at(user_id, entries, streaks, previous, Utc::now())
    }

    /// Regenerate a user's fingerprint as of `at`.
    ///
    /// Only entries inside the lookback window ending at `at` are analyzed.
    pub fn regenerate_at(
        &self,
        user_id: &str,
        entries: &[HabitEntry],
        streaks: Option<&StreakSummary>,
        previous: Option<&FingerprintRecord>,
        at: DateTime<Utc>,
    ) -> Regeneration {
        let span = tracing::info_span!("regenerate", user_id);
        let _enter = span.enter();

        let window = ActivityWindow::trailing(at, self.lookback);
        let in_window = window.select(entries);

        let excluded = entries.len() - in_window.len();
        if excluded > 0 {
            tracing::warn!(
                excluded,
                window_days = window.duration_days(),
                "entries outside the activity window were not analyzed"
            );
        }

        let vector = analyze(&in_window, streaks);
        let fingerprint = build_fingerprint(&vector);
        let mutation = detect_at(
            previous.map(|r| &r.fingerprint.component_vector),
            &vector,
            at,
        );

        self.audit.record_entries(in_window.len() as u64, 0);
        self.audit.record_fingerprint();
        if mutation.is_some() {
            self.audit.record_mutation();
        }

        tracing::debug!(
            entries = in_window.len(),
            sequence = %fingerprint.sequence,
            "fingerprint regenerated"
        );

        Regeneration {
            user_id: user_id.to_string(),
            fingerprint,
            mutation,
            base_revision: revision_of(previous),
            entries_analyzed: in_window.len(),
            generated_at: at,
        }
    }

    /// Regenerate and persist, retrying when another writer got there first.
    pub fn regenerate_and_store(
        &self,
        store: &dyn FingerprintStore,
        user_id: &str,
        entries: &[HabitEntry],
        streaks: Option<&StreakSummary>,
    ) -> DnaResult<Committed> {
        let mut conflicts = 0;

        for _ in 0..=self.max_cas_retries {
            let previous = store.load(user_id)?;
            let regeneration = self.regenerate(user_id, entries, streaks, previous.as_ref());
            let base_revision = regeneration.base_revision;
            let mutation = regeneration.mutation.clone();
            let record = regeneration.into_record(previous.as_ref());

            match store.compare_and_swap(record.clone(), base_revision) {
                Ok(()) => {
                    tracing::info!(
                        user_id,
                        revision = record.revision,
                        sequence = %record.fingerprint.sequence,
                        "fingerprint stored"
                    );
                    return Ok(Committed {
                        record,
                        mutation,
                        conflicts,
                    });
                }
                Err(StoreError::Conflict { expected, actual, .. }) => {
                    tracing::warn!(user_id, expected, actual, "concurrent regeneration, retrying");
                    self.audit.record_cas_conflict();
                    conflicts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DnaError::RetriesExhausted {
            user_id: user_id.to_string(),
            attempts: self.max_cas_retries + 1,
        })
    }

    /// Compare two vectors.
    pub fn compare(&self, a: &ComponentVector, b: &ComponentVector) -> CompatibilityResult {
        self.audit.record_compatibility_check();
        compare(a, b)
    }

    /// Compare the stored fingerprints of two users.
    pub fn compare_users(
        &self,
        store: &dyn FingerprintStore,
        user_a: &str,
        user_b: &str,
    ) -> DnaResult<CompatibilityResult> {
        let a = store
            .load(user_a)?
            .ok_or_else(|| DnaError::NotFound(user_a.to_string()))?;
        let b = store
            .load(user_b)?
            .ok_or_else(|| DnaError::NotFound(user_b.to_string()))?;

        Ok(self.compare(
            &a.fingerprint.component_vector,
            &b.fingerprint.component_vector,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::HabitCategory;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn engine() -> DnaEngine {
        DnaEngine::new(&Config::default()).unwrap()
    }

    fn daily_from(
        end: DateTime<Utc>,
        category: HabitCategory,
        value: f64,
        days: i64,
    ) -> Vec<HabitEntry> {
        (0..days)
            .map(|d| HabitEntry::new(category, value, "min", end - Duration::days(d)))
            .collect()
    }

    fn daily(category: HabitCategory, value: f64, days: i64) -> Vec<HabitEntry> {
        daily_from(now(), category, value, days)
    }

    #[test]
    fn test_regenerate_without_previous() {
        let entries = daily(HabitCategory::Exercise, 30.0, 5);
        let regen = engine().regenerate_at("u1", &entries, None, None, now());

        assert_eq!(regen.base_revision, 0);
        assert!(regen.mutation.is_none());
        assert_eq!(regen.entries_analyzed, 5);
        assert_eq!(regen.fingerprint.component_vector.consistency(), 100.0);
    }

    #[test]
    fn test_fingerprint_log_analyzes_old_entries() {
        let start = Utc.with_ymd_and_hms(2024, 3, 13, 9, 0, 0).unwrap();
        let entries = vec![
            HabitEntry::new(HabitCategory::Exercise, 10.0, "min", start),
            HabitEntry::new(HabitCategory::Exercise, 20.0, "min", start + Duration::days(1)),
        ];

        let engine = engine();
        let fingerprint = engine.fingerprint_log(&entries, None);
        assert_eq!(
            fingerprint.component_vector.values(),
            [100.0, 14.0, 75.0, 100.0, 50.0]
        );
        assert_eq!(fingerprint.sequence, "F2BF86A07F5C7");
        assert_eq!(engine.audit().stats().entries_analyzed, 2);
    }

    #[test]
    fn test_huge_lookback_does_not_overflow() {
        let config = Config {
            lookback: std::time::Duration::from_secs(1_000_000_000 * 86_400),
            ..Config::default()
        };
        let engine = DnaEngine::new(&config).unwrap();

        let regen = engine.regenerate("u1", &daily(HabitCategory::Sleep, 8.0, 3), None, None);
        assert_eq!(regen.entries_analyzed, 3);
    }

    #[test]
    fn test_entries_outside_window_are_ignored() {
        let mut entries = daily(HabitCategory::Sleep, 8.0, 3);
        entries.push(HabitEntry::new(
            HabitCategory::Social,
            1.0,
            "x",
            now() - Duration::days(365),
        ));

        let regen = engine().regenerate_at("u1", &entries, None, None, now());
        assert_eq!(regen.entries_analyzed, 3);
        assert_eq!(regen.fingerprint.component_vector.diversity(), 14.0);
    }

    #[test]
    fn test_into_record_appends_mutation() {
        let engine = engine();
        let first = engine
            .regenerate_at("u1", &daily(HabitCategory::Exercise, 30.0, 5), None, None, now())
            .into_record(None);
        assert_eq!(first.revision, 1);
        assert!(first.mutations.is_empty());

        let mut varied = Vec::new();
        for (i, category) in HabitCategory::ALL.iter().enumerate() {
            varied.extend(daily(*category, (i + 1) as f64, 2));
        }
        let regen = engine.regenerate_at("u1", &varied, None, Some(&first), now());
        assert!(regen.mutation.is_some());

        let second = regen.into_record(Some(&first));
        assert_eq!(second.revision, 2);
        assert_eq!(second.mutations.len(), 1);
        assert_eq!(
            second.mutations.latest().unwrap().previous_sequence,
            first.fingerprint.sequence
        );
    }

    #[test]
    fn test_regenerate_and_store() {
        let engine = engine();
        let store = MemoryStore::new();
        let entries = daily_from(Utc::now(), HabitCategory::Learning, 20.0, 10);

        let first = engine
            .regenerate_and_store(&store, "kim", &entries, None)
            .unwrap();
        assert_eq!(first.record.revision, 1);
        assert_eq!(first.conflicts, 0);

        let second = engine
            .regenerate_and_store(&store, "kim", &entries, None)
            .unwrap();
        assert_eq!(second.record.revision, 2);
        assert!(second.mutation.is_none());
        assert_eq!(second.record.fingerprint, first.record.fingerprint);
        assert_eq!(
            second.record.fingerprint.component_vector.consistency(),
            100.0
        );
        assert_eq!(engine.audit().stats().fingerprints_built, 2);
    }

    #[test]
    fn test_compare_users_requires_both_records() {
        let engine = engine();
        let store = MemoryStore::new();
        engine
            .regenerate_and_store(
                &store,
                "a",
                &daily_from(Utc::now(), HabitCategory::Sleep, 7.0, 4),
                None,
            )
            .unwrap();

        let err = engine.compare_users(&store, "a", "b").unwrap_err();
        assert!(matches!(err, DnaError::NotFound(ref id) if id == "b"));

        let result = engine.compare_users(&store, "a", "a").unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(engine.audit().stats().compatibility_checks, 1);
    }

    #[test]
    fn test_prepare_counts_skipped() {
        let engine = engine();
        let raws = vec![
            RawHabitEntry {
                category: Some("exercise".into()),
                value: Some(serde_json::json!(5)),
                unit: None,
                timestamp: Some("2024-05-30T10:00:00Z".into()),
            },
            RawHabitEntry::default(),
        ];

        let entries = engine.prepare(raws);
        assert_eq!(entries.len(), 1);
        assert_eq!(engine.audit().stats().entries_skipped, 1);
    }
}
