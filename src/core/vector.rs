//! The five-dimensional behavioral component vector.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of every component.
pub const COMPONENT_MIN: f64 = 0.0;

/// Upper bound of every component.
pub const COMPONENT_MAX: f64 = 100.0;

/// One axis of the component vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Regularity of logging rhythm
    Consistency,
    /// Spread across the category universe
    Diversity,
    /// Typical effort relative to peak effort
    Intensity,
    /// Evenness of effort across used categories
    Balance,
    /// Recent trend of logged values
    Growth,
}

impl Dimension {
    /// The fixed dimension order used by encoding, colors and scoring.
    pub const ALL: [Dimension; 5] = [
        Dimension::Consistency,
        Dimension::Diversity,
        Dimension::Intensity,
        Dimension::Balance,
        Dimension::Growth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Consistency => "consistency",
            Dimension::Diversity => "diversity",
            Dimension::Intensity => "intensity",
            Dimension::Balance => "balance",
            Dimension::Growth => "growth",
        }
    }

    /// Position of this dimension in [`Dimension::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Dimension::Consistency => 0,
            Dimension::Diversity => 1,
            Dimension::Intensity => 2,
            Dimension::Balance => 3,
            Dimension::Growth => 4,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavioral summary with every component in `[0, 100]`.
///
/// Fields are private so the range invariant cannot be bypassed; all
/// constructors (including deserialization) sanitize their input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "VectorFields")]
pub struct ComponentVector {
    consistency: f64,
    diversity: f64,
    intensity: f64,
    balance: f64,
    growth: f64,
}

/// Unchecked wire form of [`ComponentVector`].
#[derive(Deserialize)]
struct VectorFields {
    consistency: f64,
    diversity: f64,
    intensity: f64,
    balance: f64,
    growth: f64,
}

impl From<VectorFields> for ComponentVector {
    fn from(f: VectorFields) -> Self {
        Self::new(f.consistency, f.diversity, f.intensity, f.balance, f.growth)
    }
}

impl ComponentVector {
    /// The all-zero vector produced for an empty log.
    pub const ZERO: ComponentVector = ComponentVector {
        consistency: 0.0,
        diversity: 0.0,
        intensity: 0.0,
        balance: 0.0,
        growth: 0.0,
    };

    /// Build a vector, clamping each component into range.
    pub fn new(
        consistency: f64,
        diversity: f64,
        intensity: f64,
        balance: f64,
        growth: f64,
    ) -> Self {
        Self {
            consistency: sanitize(consistency),
            diversity: sanitize(diversity),
            intensity: sanitize(intensity),
            balance: sanitize(balance),
            growth: sanitize(growth),
        }
    }

    /// Build a vector from values in [`Dimension::ALL`] order.
    pub fn from_values(values: [f64; 5]) -> Self {
        let [c, d, i, b, g] = values;
        Self::new(c, d, i, b, g)
    }

    /// Component values in [`Dimension::ALL`] order.
    pub fn values(&self) -> [f64; 5] {
        [
            self.consistency,
            self.diversity,
            self.intensity,
            self.balance,
            self.growth,
        ]
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        self.values()[dimension.index()]
    }

    pub fn consistency(&self) -> f64 {
        self.consistency
    }

    pub fn diversity(&self) -> f64 {
        self.diversity
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn growth(&self) -> f64 {
        self.growth
    }

    /// Round every component to the nearest integer, halves away from zero.
    pub fn rounded(&self) -> Self {
        Self::from_values(self.values().map(f64::round))
    }

    /// Signed per-dimension change from `previous` to `self`.
    pub fn deltas(&self, previous: &ComponentVector) -> [f64; 5] {
        let current = self.values();
        let previous = previous.values();
        std::array::from_fn(|i| current[i] - previous[i])
    }

    /// Sum of absolute per-dimension differences.
    pub fn drift(&self, other: &ComponentVector) -> f64 {
        self.deltas(other).iter().map(|d| d.abs()).sum()
    }
}

impl fmt::Display for ComponentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Dimension::ALL
            .iter()
            .map(|d| format!("{}={}", d, self.get(*d)))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// Map any float onto the valid component range.
///
/// NaN becomes the lower bound and infinities the nearest bound. Adding
/// zero folds `-0.0` into `0.0` so serialization stays canonical.
pub(crate) fn sanitize(value: f64) -> f64 {
    if value.is_nan() {
        return COMPONENT_MIN;
    }
    value.clamp(COMPONENT_MIN, COMPONENT_MAX) + 0.0
}
