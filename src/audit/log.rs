//! Audit counters for engine activity.
//!
//! Counts what the engine has done without recording any user data:
//! no entries, vectors or user ids are retained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running counters for the current process.
#[derive(Debug)]
pub struct AuditLog {
    /// Valid entries fed to the analyzer
    entries_analyzed: AtomicU64,
    /// Malformed entries skipped during validation
    entries_skipped: AtomicU64,
    /// Fingerprints built
    fingerprints_built: AtomicU64,
    /// Mutation events emitted
    mutations_emitted: AtomicU64,
    /// Compatibility comparisons run
    compatibility_checks: AtomicU64,
    /// Store writes rejected by compare-and-swap
    cas_conflicts: AtomicU64,
    /// Process start time
    started_at: DateTime<Utc>,
    /// Path for persisting stats
    persist_path: Option<PathBuf>,
}

impl AuditLog {
    /// Create a new audit log.
    pub fn new() -> Self {
        Self {
            entries_analyzed: AtomicU64::new(0),
            entries_skipped: AtomicU64::new(0),
            fingerprints_built: AtomicU64::new(0),
            mutations_emitted: AtomicU64::new(0),
            compatibility_checks: AtomicU64::new(0),
            cas_conflicts: AtomicU64::new(0),
            started_at: Utc::now(),
            persist_path: None,
        }
    }

    /// Create an audit log that continues from counters saved at `path`.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut log = Self::new();
        log.persist_path = Some(path);

        if let Err(e) = log.load() {
            tracing::warn!("could not load previous audit counters: {e}");
        }

        log
    }

    pub fn record_entries(&self, analyzed: u64, skipped: u64) {
        self.entries_analyzed.fetch_add(analyzed, Ordering::Relaxed);
        self.entries_skipped.fetch_add(skipped, Ordering::Relaxed);
    }

    pub fn record_fingerprint(&self) {
        self.fingerprints_built.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mutation(&self) {
        self.mutations_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compatibility_check(&self) {
        self.compatibility_checks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cas_conflict(&self) {
        self.cas_conflicts.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> AuditStats {
        AuditStats {
            entries_analyzed: self.entries_analyzed.load(Ordering::Relaxed),
            entries_skipped: self.entries_skipped.load(Ordering::Relaxed),
            fingerprints_built: self.fingerprints_built.load(Ordering::Relaxed),
            mutations_emitted: self.mutations_emitted.load(Ordering::Relaxed),
            compatibility_checks: self.compatibility_checks.load(Ordering::Relaxed),
            cas_conflicts: self.cas_conflicts.load(Ordering::Relaxed),
            started_at: self.started_at,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Engine Statistics:\n\
             - Entries analyzed: {}\n\
             - Malformed entries skipped: {}\n\
             - Fingerprints built: {}\n\
             - Mutations emitted: {}\n\
             - Compatibility checks: {}\n\
             - Store conflicts: {}",
            stats.entries_analyzed,
            stats.entries_skipped,
            stats.fingerprints_built,
            stats.mutations_emitted,
            stats.compatibility_checks,
            stats.cas_conflicts
        )
    }

    /// Save stats to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.stats();
            let persisted = PersistedStats {
                entries_analyzed: stats.entries_analyzed,
                entries_skipped: stats.entries_skipped,
                fingerprints_built: stats.fingerprints_built,
                mutations_emitted: stats.mutations_emitted,
                compatibility_checks: stats.compatibility_checks,
                cas_conflicts: stats.cas_conflicts,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;
            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load stats from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.entries_analyzed
                    .store(persisted.entries_analyzed, Ordering::Relaxed);
                self.entries_skipped
                    .store(persisted.entries_skipped, Ordering::Relaxed);
                self.fingerprints_built
                    .store(persisted.fingerprints_built, Ordering::Relaxed);
                self.mutations_emitted
                    .store(persisted.mutations_emitted, Ordering::Relaxed);
                self.compatibility_checks
                    .store(persisted.compatibility_checks, Ordering::Relaxed);
                self.cas_conflicts
                    .store(persisted.cas_conflicts, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.entries_analyzed.store(0, Ordering::Relaxed);
        self.entries_skipped.store(0, Ordering::Relaxed);
        self.fingerprints_built.store(0, Ordering::Relaxed);
        self.mutations_emitted.store(0, Ordering::Relaxed);
        self.compatibility_checks.store(0, Ordering::Relaxed);
        self.cas_conflicts.store(0, Ordering::Relaxed);
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of audit counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    pub entries_analyzed: u64,
    pub entries_skipped: u64,
    pub fingerprints_built: u64,
    pub mutations_emitted: u64,
    pub compatibility_checks: u64,
    pub cas_conflicts: u64,
    pub started_at: DateTime<Utc>,
}

/// Stats format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    entries_analyzed: u64,
    entries_skipped: u64,
    fingerprints_built: u64,
    mutations_emitted: u64,
    compatibility_checks: u64,
    cas_conflicts: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared audit log.
pub type SharedAuditLog = Arc<AuditLog>;
