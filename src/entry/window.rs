//! Rolling activity windows over a habit log.
//!
//! The activity log is a live, growing collection. Analysis only ever sees
//! the slice of it that falls inside a trailing window ending at the moment
//! of regeneration, so two analyses of the same user at different times may
//! legitimately see different entries.

use crate::entry::types::HabitEntry;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A closed time interval used to select log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityWindow {
    /// Start time of the window (inclusive)
    pub start: DateTime<Utc>,
    /// End time of the window (inclusive)
    pub end: DateTime<Utc>,
}

impl ActivityWindow {
    /// Create a window covering `[start, end]`.
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A window of length `lookback` ending at `end`.
    ///
    /// A lookback reaching past the earliest representable instant starts there.
    pub fn trailing(end: DateTime<Utc>, lookback: Duration) -> Self {
        let start = end
            .checked_sub_signed(lookback)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(start, end)
    }

    /// Check if a timestamp falls within this window.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Copy the entries that fall inside the window, preserving input order.
    pub fn select(&self, entries: &[HabitEntry]) -> Vec<HabitEntry> {
        entries
            .iter()
            .filter(|e| self.contains(e.timestamp))
            .cloned()
            .collect()
    }

    /// Get the duration of this window in days.
    pub fn duration_days(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 86_400.0
    }
}
