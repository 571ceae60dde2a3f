//! Pairwise compatibility scoring between component vectors.

use crate::core::vector::{ComponentVector, Dimension};
use serde::{Deserialize, Serialize};

/// Per-dimension similarity a dimension must exceed to be reported as a factor.
pub const FACTOR_THRESHOLD: f64 = 70.0;

/// Similarity of two fingerprints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityResult {
    /// Overall similarity, 0-100
    pub score: u8,
    /// `<dimension>_similar` tags in fixed dimension order
    pub factors: Vec<String>,
}

impl CompatibilityResult {
    /// Check whether a dimension was reported as similar.
    pub fn has_factor(&self, dimension: Dimension) -> bool {
        let tag = factor_tag(dimension);
        self.factors.iter().any(|f| *f == tag)
    }
}

/// Score how similar two vectors are.
///
/// Symmetric in its arguments; comparing a vector with itself yields a
/// score of 100 with every factor present.
pub fn compare(a: &ComponentVector, b: &ComponentVector) -> CompatibilityResult {
    let similarities: Vec<(Dimension, f64)> = Dimension::ALL
        .iter()
        .map(|d| (*d, (100.0 - (a.get(*d) - b.get(*d)).abs()).max(0.0)))
        .collect();

    let mean = similarities.iter().map(|(_, s)| s).sum::<f64>() / similarities.len() as f64;

    let factors = similarities
        .iter()
        .filter(|(_, s)| *s > FACTOR_THRESHOLD)
        .map(|(d, _)| factor_tag(*d))
        .collect();

    CompatibilityResult {
        score: mean.round().clamp(0.0, 100.0) as u8,
        factors,
    }
}

/// Tag used for a similar dimension.
pub fn factor_tag(dimension: Dimension) -> String {
    format!("{}_similar", dimension.as_str())
}
