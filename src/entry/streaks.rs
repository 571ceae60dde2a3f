//! Historical streak summaries.
//!
//! A streak is a maximal run of consecutive local calendar days on which a
//! category was logged at least once. Day boundaries are taken in the
//! user's timezone, so the same log can yield different streaks in
//! different zones.

use crate::entry::types::{HabitCategory, HabitEntry};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Count of currently active streaks out of all streaks in the history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub active_streaks: u32,
    pub total_streaks: u32,
}

impl StreakSummary {
    pub fn new(active_streaks: u32, total_streaks: u32) -> Self {
        Self {
            active_streaks,
            total_streaks,
        }
    }

    /// Percentage of streaks still active, or 0 when there are none.
    pub fn ratio(&self) -> f64 {
        if self.total_streaks == 0 {
            return 0.0;
        }
        self.active_streaks as f64 / self.total_streaks as f64 * 100.0
    }

    /// Derive a summary from the log itself.
    ///
    /// A streak is active when its last day is `as_of`'s local day or the day
    /// before it. Days after `as_of` are ignored.
    pub fn from_entries(entries: &[HabitEntry], tz: Tz, as_of: DateTime<Utc>) -> Self {
        let today = as_of.with_timezone(&tz).date_naive();
        let yesterday = today - Duration::days(1);

        let mut days: BTreeMap<HabitCategory, BTreeSet<NaiveDate>> = BTreeMap::new();
        for entry in entries {
            let day = entry.timestamp.with_timezone(&tz).date_naive();
            if day <= today {
                days.entry(entry.category).or_default().insert(day);
            }
        }

        let mut summary = Self::default();
        for category_days in days.values() {
            for last_day in run_ends(category_days) {
                summary.total_streaks += 1;
                if last_day >= yesterday {
                    summary.active_streaks += 1;
                }
            }
        }

        summary
    }
}

/// Last day of each run of consecutive days.
fn run_ends(days: &BTreeSet<NaiveDate>) -> Vec<NaiveDate> {
    let mut ends = Vec::new();
    let mut iter = days.iter().copied().peekable();

    while let Some(day) = iter.next() {
        match iter.peek() {
            Some(&next) if next == day + Duration::days(1) => {}
            _ => ends.push(day),
        }
    }

    ends
}
