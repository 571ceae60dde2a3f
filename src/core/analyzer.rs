//! Pattern analysis over a habit log.
//!
//! Reduces a list of habit entries to a [`ComponentVector`]. Every formula
//! has an explicit fallback for degenerate input, and every result is
//! clamped and rounded, so analysis never fails.
//!
//! Entries whose `value` is `None` still count towards timing (consistency),
//! category coverage (diversity) and balance. They are skipped by the two
//! value-based components, intensity and growth.

use crate::core::vector::ComponentVector;
use crate::entry::{HabitCategory, HabitEntry, StreakSummary};
use statrs::statistics::Statistics;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Minimum number of valued entries before growth is measured from values.
pub const GROWTH_MIN_ENTRIES: usize = 20;

/// Number of entries in each half of the growth comparison.
pub const GROWTH_WINDOW: usize = 10;

/// Growth reported when there is no evidence either way.
pub const NEUTRAL_GROWTH: f64 = 50.0;

/// Analyze a habit log.
///
/// `entries` need not be sorted. The result depends only on the entries
/// given: the same list always produces the same vector, but the log
/// itself is a rolling window, so calls made at different times for the
/// same user may see different entries.
pub fn analyze(entries: &[HabitEntry], streaks: Option<&StreakSummary>) -> ComponentVector {
    if entries.is_empty() {
        return ComponentVector::ZERO;
    }

    let mut ordered: Vec<&HabitEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| compare_values(a.value, b.value))
    });

    ComponentVector::new(
        compute_consistency(&ordered),
        compute_diversity(&ordered),
        compute_intensity(&ordered),
        compute_balance(&ordered),
        compute_growth(&ordered, streaks),
    )
    .rounded()
}

/// Missing values first, then numeric order.
fn compare_values(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => a.is_some().cmp(&b.is_some()),
    }
}

/// Regularity of the gaps between consecutive entries.
fn compute_consistency(ordered: &[&HabitEntry]) -> f64 {
    if ordered.len() < 2 {
        return 0.0;
    }

    let intervals: Vec<f64> = ordered
        .windows(2)
        .map(|pair| (pair[1].timestamp - pair[0].timestamp).num_milliseconds() as f64)
        .collect();

    let mean = intervals.iter().mean();
    if mean <= 0.0 {
        // Every entry shares one timestamp: there is no rhythm to measure.
        tracing::debug!("all entries share a timestamp, consistency falls back to 0");
        return 0.0;
    }

    let variance = intervals.iter().population_variance();
    100.0 - (variance / (mean * mean)) * 100.0
}

/// Share of the category universe the log touches.
fn compute_diversity(ordered: &[&HabitEntry]) -> f64 {
    let used: BTreeSet<HabitCategory> = ordered.iter().map(|e| e.category).collect();
    used.len() as f64 / HabitCategory::COUNT as f64 * 100.0
}

/// Mean value relative to the peak value.
fn compute_intensity(ordered: &[&HabitEntry]) -> f64 {
    let values: Vec<f64> = ordered.iter().filter_map(|e| e.value).collect();
    if values.is_empty() {
        return 0.0;
    }

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 {
        return 0.0;
    }

    values.iter().mean() / max * 100.0
}

/// Evenness of entry counts across the categories in use.
fn compute_balance(ordered: &[&HabitEntry]) -> f64 {
    let mut counts: BTreeMap<HabitCategory, u32> = BTreeMap::new();
    for entry in ordered {
        *counts.entry(entry.category).or_default() += 1;
    }

    if counts.is_empty() {
        return 0.0;
    }

    let counts: Vec<f64> = counts.values().map(|&c| c as f64).collect();
    let mean = counts.iter().mean();
    let variance = counts.iter().population_variance();
    100.0 - (variance / (mean * mean)) * 100.0
}

/// Trend of recent values, or the streak ratio when values are too few.
fn compute_growth(ordered: &[&HabitEntry], streaks: Option<&StreakSummary>) -> f64 {
    let values: Vec<f64> = ordered.iter().filter_map(|e| e.value).collect();

    if values.len() >= GROWTH_MIN_ENTRIES {
        let split = values.len() - GROWTH_WINDOW;
        let recent_mean = values[split..].iter().mean();
        let older_mean = values[split - GROWTH_WINDOW..split].iter().mean();

        if older_mean == 0.0 {
            return if recent_mean > 0.0 { 100.0 } else { 0.0 };
        }
        return NEUTRAL_GROWTH + ((recent_mean - older_mean) / older_mean) * 100.0;
    }

    match streaks {
        Some(summary) => summary.ratio(),
        None => NEUTRAL_GROWTH,
    }
}
