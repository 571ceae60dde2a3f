//! Habit log entry types.
//!
//! Entries arrive from the external log store in a loosely typed wire form
//! ([`RawHabitEntry`]) and are validated into [`HabitEntry`] before analysis.
//! Validation never fails the whole log: rejected entries are skipped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The fixed universe of habit categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HabitCategory {
    Exercise,
    Nutrition,
    Sleep,
    Mindfulness,
    Productivity,
    Social,
    Learning,
}

impl HabitCategory {
    /// Every category, in declaration order.
    pub const ALL: [HabitCategory; 7] = [
        HabitCategory::Exercise,
        HabitCategory::Nutrition,
        HabitCategory::Sleep,
        HabitCategory::Mindfulness,
        HabitCategory::Productivity,
        HabitCategory::Social,
        HabitCategory::Learning,
    ];

    /// Size of the category universe.
    pub const COUNT: usize = Self::ALL.len();

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitCategory::Exercise => "exercise",
            HabitCategory::Nutrition => "nutrition",
            HabitCategory::Sleep => "sleep",
            HabitCategory::Mindfulness => "mindfulness",
            HabitCategory::Productivity => "productivity",
            HabitCategory::Social => "social",
            HabitCategory::Learning => "learning",
        }
    }
}

impl fmt::Display for HabitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HabitCategory {
    type Err = EntryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| EntryError::UnknownCategory(s.to_string()))
    }
}

/// Reasons a raw entry is rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry has no category")]
    MissingCategory,

    #[error("unknown habit category '{0}'")]
    UnknownCategory(String),

    #[error("entry has no timestamp")]
    MissingTimestamp,

    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },
}

/// A habit entry as supplied by the log store, before validation.
///
/// Every field is optional and `value` accepts any JSON so that noisy
/// upstream data can be deserialized without failing the whole log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawHabitEntry {
    pub category: Option<String>,
    pub value: Option<serde_json::Value>,
    pub unit: Option<String>,
    pub timestamp: Option<String>,
}

/// A validated habit observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    pub category: HabitCategory,
    /// Observed amount. `None` when the source value was missing,
    /// non-numeric, or not finite.
    pub value: Option<f64>,
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

impl HabitEntry {
    pub fn new(
        category: HabitCategory,
        value: f64,
        unit: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            category,
            value: value.is_finite().then_some(value),
            unit: unit.into(),
            timestamp,
        }
    }

    /// Create an entry with no usable value.
    pub fn without_value(
        category: HabitCategory,
        unit: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            category,
            value: None,
            unit: unit.into(),
            timestamp,
        }
    }
}

impl TryFrom<RawHabitEntry> for HabitEntry {
    type Error = EntryError;

    fn try_from(raw: RawHabitEntry) -> Result<Self, Self::Error> {
        let category = raw
            .category
            .as_deref()
            .ok_or(EntryError::MissingCategory)?
            .parse::<HabitCategory>()?;

        let timestamp_str = raw.timestamp.ok_or(EntryError::MissingTimestamp)?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp_str.trim())
            .map_err(|e| EntryError::InvalidTimestamp {
                value: timestamp_str.clone(),
                reason: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(Self {
            category,
            value: raw.value.as_ref().and_then(numeric_value),
            unit: raw.unit.unwrap_or_default(),
            timestamp,
        })
    }
}

/// Coerce a JSON value into a finite number, if it holds one.
fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Validate raw entries, skipping the malformed ones.
///
/// Returns the accepted entries in input order along with the number of
/// entries that were rejected.
pub fn validate_entries<I>(raws: I) -> (Vec<HabitEntry>, usize)
where
    I: IntoIterator<Item = RawHabitEntry>,
{
    let mut accepted = Vec::new();
    let mut skipped = 0;

    for (index, raw) in raws.into_iter().enumerate() {
        match HabitEntry::try_from(raw) {
            Ok(entry) => accepted.push(entry),
            Err(e) => {
                tracing::debug!(index, error = %e, "skipping malformed habit entry");
                skipped += 1;
            }
        }
    }

    (accepted, skipped)
}
