//! Mutation detection between successive fingerprints.

use crate::core::sequence::encode;
use crate::core::vector::{ComponentVector, Dimension};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Aggregate drift a change must exceed to count as a mutation.
pub const MUTATION_THRESHOLD: f64 = 50.0;

/// Kind of recorded mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    MajorChange,
}

/// A recorded fingerprint change beyond the drift threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationEvent {
    /// Unique event identifier
    pub id: Uuid,
    /// When the change was detected
    pub timestamp: DateTime<Utc>,
    pub kind: MutationKind,
    /// Human-readable summary of what moved
    pub description: String,
    /// Sequence of the vector before the change
    pub previous_sequence: String,
    /// Sum of absolute per-dimension changes
    pub drift: f64,
}

/// Detect a mutation between `previous` and `current`, stamped with the current time.
///
/// The first-ever computation (no previous vector) is never a mutation.
pub fn detect(
    previous: Option<&ComponentVector>,
    current: &ComponentVector,
) -> Option<MutationEvent> {
    detect_at(previous, current, Utc::now())
}

/// Same as [`detect`] with an explicit detection time.
pub fn detect_at(
    previous: Option<&ComponentVector>,
    current: &ComponentVector,
    at: DateTime<Utc>,
) -> Option<MutationEvent> {
    let previous = previous?;
    let drift = current.drift(previous);

    if drift <= MUTATION_THRESHOLD {
        return None;
    }

    let description = describe_change(previous, current, drift);
    tracing::info!(drift, %description, "fingerprint mutation detected");

    Some(MutationEvent {
        id: Uuid::new_v4(),
        timestamp: at,
        kind: MutationKind::MajorChange,
        description,
        previous_sequence: encode(previous),
        drift,
    })
}

/// Summarize the change, largest movements first.
fn describe_change(previous: &ComponentVector, current: &ComponentVector, drift: f64) -> String {
    let deltas = current.deltas(previous);

    let mut moved: Vec<(Dimension, f64)> = Dimension::ALL
        .iter()
        .map(|d| (*d, one_decimal(deltas[d.index()])))
        .filter(|(_, delta)| *delta != 0.0)
        .collect();
    moved.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    let changes: Vec<String> = moved
        .iter()
        .map(|(d, delta)| format!("{d} {delta:+}"))
        .collect();

    format!(
        "Major behavioral change (drift {}): {}",
        one_decimal(drift),
        changes.join(", ")
    )
}

fn one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0 + 0.0
}

/// Append-only history of mutation events, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationHistory {
    events: Vec<MutationEvent>,
}

impl MutationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event after all existing ones.
    pub fn push(&mut self, event: MutationEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn latest(&self) -> Option<&MutationEvent> {
        self.events.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MutationEvent> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a MutationHistory {
    type Item = &'a MutationEvent;
    type IntoIter = std::slice::Iter<'a, MutationEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
