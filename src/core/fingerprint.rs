//! DNA fingerprint assembly.
//!
//! A fingerprint bundles a component vector with everything derived from
//! it: the sequence, the color palette and the visual pattern. It is a pure
//! function of the vector.

use crate::core::color::{derive_colors, derive_visual_pattern, ColorPalette, PatternStep};
use crate::core::sequence::encode;
use crate::core::vector::ComponentVector;
use serde::{Deserialize, Serialize};

/// The full derived artifact for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnaFingerprint {
    pub component_vector: ComponentVector,
    /// 13-character uppercase hex identifier
    pub sequence: String,
    pub colors: ColorPalette,
    /// Exactly 20 steps, ordered by position
    pub visual_pattern: Vec<PatternStep>,
}

impl DnaFingerprint {
    /// Check that the derived fields still match the vector.
    ///
    /// Useful after loading a fingerprint from external storage.
    pub fn is_consistent(&self) -> bool {
        *self == build_fingerprint(&self.component_vector)
    }
}

/// Build a fingerprint from a component vector.
pub fn build_fingerprint(vector: &ComponentVector) -> DnaFingerprint {
    DnaFingerprint {
        component_vector: *vector,
        sequence: encode(vector),
        colors: derive_colors(vector),
        visual_pattern: derive_visual_pattern(vector),
    }
}
