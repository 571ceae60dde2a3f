//! Analytics core for Habit DNA.
//!
//! This module contains:
//! - Pattern analysis of a habit log into a component vector
//! - Sequence encoding and color derivation for fingerprints
//! - Mutation detection between successive vectors
//! - Pairwise compatibility scoring
//!
//! Everything here is pure and synchronous: no I/O, no shared state, safe
//! to call from any number of threads at once.

pub mod analyzer;
pub mod color;
pub mod compatibility;
pub mod fingerprint;
pub mod mutation;
pub mod sequence;
pub mod vector;

// Re-export commonly used types
pub use analyzer::analyze;
pub use color::{derive_colors, derive_visual_pattern, hsl_to_hex, ColorPalette, PatternStep};
pub use compatibility::{compare, CompatibilityResult};
pub use fingerprint::{build_fingerprint, DnaFingerprint};
pub use mutation::{detect as detect_mutation, MutationEvent, MutationHistory, MutationKind};
pub use sequence::encode;
pub use vector::{ComponentVector, Dimension};
