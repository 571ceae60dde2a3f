//! Habit log input for the analytics core.
//!
//! This module contains:
//! - Raw and validated habit entry types
//! - Rolling activity windows over the log
//! - Streak summaries derived from the log
//! - Reading logs from JSON or JSON Lines files

pub mod reader;
pub mod streaks;
pub mod types;
pub mod window;

// Re-export commonly used types
pub use reader::{parse_log, read_log};
pub use streaks::StreakSummary;
pub use types::{validate_entries, EntryError, HabitCategory, HabitEntry, RawHabitEntry};
pub use window::ActivityWindow;
