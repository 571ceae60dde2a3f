//! Habit DNA - deterministic behavioral fingerprints from habit logs.
//!
//! This library turns a user's habit activity log into a five-dimensional
//! behavioral profile and derives a stable identity from it: a 13 character
//! sequence, a color palette and a 20 step visual pattern. It also detects
//! major behavioral shifts between regenerations and scores how alike two
//! users are.
//!
//! # Guarantees
//!
//! - **Deterministic**: the same vector always yields the same sequence and colors
//! - **Total**: malformed entries are skipped, never fatal
//! - **Bounded**: every component is finite and within [0, 100]
//! - **Race-free storage**: concurrent regenerations are serialized by revision
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            Habit DNA                             │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌───────────┐   ┌───────────┐   ┌───────────┐  │
//! │  │   Entry   │──▶│  Window   │──▶│ Analyzer  │──▶│  Vector   │  │
//! │  │ (validate)│   │ (90 days) │   │(5 scores) │   │           │  │
//! │  └───────────┘   └───────────┘   └───────────┘   └─────┬─────┘  │
//! │                                                        │        │
//! │        ┌──────────────┬──────────────┬─────────────────┤        │
//! │        ▼              ▼              ▼                 ▼        │
//! │  ┌───────────┐  ┌───────────┐  ┌───────────┐   ┌─────────────┐  │
//! │  │ Sequence  │  │  Colors   │  │ Mutation  │   │Compatibility│  │
//! │  └───────────┘  └───────────┘  └─────┬─────┘   └─────────────┘  │
//! │                                      ▼                          │
//! │                              ┌───────────────┐  ┌───────────┐   │
//! │                              │ Store (CAS)   │  │   Audit   │   │
//! │                              └───────────────┘  └───────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use habit_dna::{core, ComponentVector};
//!
//! let vector = ComponentVector::new(100.0, 14.0, 75.0, 100.0, 50.0);
//! let fingerprint = core::build_fingerprint(&vector);
//!
//! assert_eq!(fingerprint.sequence, "F2BF86A07F5C7");
//! assert_eq!(fingerprint.colors.accent, "#CDD2FE");
//! ```

pub mod audit;
pub mod batch;
pub mod config;
pub mod core;
pub mod engine;
pub mod entry;
pub mod error;
pub mod store;

// Re-export key types at crate root for convenience
pub use audit::{AuditLog, AuditStats, SharedAuditLog};
pub use batch::{run_batch, BatchJob, BatchOutcome};
pub use config::{Config, ConfigError};
pub use core::{
    analyze, build_fingerprint, compare, CompatibilityResult, ComponentVector, Dimension,
    DnaFingerprint, MutationEvent, MutationHistory,
};
pub use engine::{Committed, DnaEngine, Regeneration};
pub use entry::{HabitCategory, HabitEntry, RawHabitEntry, StreakSummary};
pub use error::{DnaError, DnaResult};
pub use store::{FingerprintRecord, FingerprintStore, JsonFileStore, MemoryStore, StoreError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
