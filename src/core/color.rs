//! Color palette and visual pattern derivation.
//!
//! Colors are derived in HSL space from the component vector and rendered
//! as `#RRGGBB`. Both derivations are pure and can be recomputed at any
//! time from the same vector.

use crate::core::vector::{ComponentVector, Dimension};
use serde::{Deserialize, Serialize};

/// Number of steps in a visual pattern.
pub const PATTERN_LEN: usize = 20;

/// Saturation used for every visual pattern step.
const PATTERN_SATURATION: f64 = 70.0;

/// Lightness used for every visual pattern step.
const PATTERN_LIGHTNESS: f64 = 50.0;

/// Three-color palette for a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
}

/// One step of a visual pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternStep {
    /// Color as `#RRGGBB`
    pub color: String,
    /// Position in the pattern, starting at 0
    pub position: usize,
}

/// Derive the primary, secondary and accent colors.
pub fn derive_colors(vector: &ComponentVector) -> ColorPalette {
    let hue = (vector.consistency() + vector.diversity()).rem_euclid(360.0);
    let saturation = vector.intensity().min(100.0);
    let lightness = (50.0 + vector.balance() / 2.0).clamp(0.0, 100.0);

    ColorPalette {
        primary: hsl_to_hex(hue, saturation, lightness),
        secondary: hsl_to_hex(
            (hue + 60.0).rem_euclid(360.0),
            saturation,
            (lightness + 10.0).min(100.0),
        ),
        accent: hsl_to_hex(
            (hue + 120.0).rem_euclid(360.0),
            (saturation + 20.0).min(100.0),
            (lightness - 10.0).max(0.0),
        ),
    }
}

/// Derive the 20-step visual pattern.
///
/// Steps cycle through the dimensions in fixed order, four steps each.
pub fn derive_visual_pattern(vector: &ComponentVector) -> Vec<PatternStep> {
    let values = vector.values();

    (0..PATTERN_LEN)
        .map(|position| {
            let component = (position * Dimension::ALL.len() / PATTERN_LEN) % Dimension::ALL.len();
            let hue = (values[component] * 3.6).rem_euclid(360.0);
            PatternStep {
                color: hsl_to_hex(hue, PATTERN_SATURATION, PATTERN_LIGHTNESS),
                position,
            }
        })
        .collect()
}

/// Convert HSL (hue in degrees, saturation and lightness in percent) to `#RRGGBB`.
pub fn hsl_to_hex(hue: f64, saturation: f64, lightness: f64) -> String {
    let h = if hue.is_finite() { hue.rem_euclid(360.0) } else { 0.0 };
    let s = clamp_percent(saturation) / 100.0;
    let l = clamp_percent(lightness) / 100.0;

    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = h / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let m = l - chroma / 2.0;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    format!(
        "#{:02X}{:02X}{:02X}",
        to_channel(r + m),
        to_channel(g + m),
        to_channel(b + m)
    )
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn to_channel(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}
