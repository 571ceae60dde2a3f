//! Deterministic textual encoding of a component vector.
//!
//! A sequence is 13 uppercase hex characters: five quantization digits
//! (one per dimension) followed by an 8-digit hash of the vector's
//! canonical serialization.

use crate::core::vector::{ComponentVector, Dimension};

/// Total length of an encoded sequence.
pub const SEQUENCE_LEN: usize = PREFIX_LEN + SUFFIX_LEN;

/// Number of quantization digits.
pub const PREFIX_LEN: usize = 5;

/// Number of hash digits.
pub const SUFFIX_LEN: usize = 8;

/// Separator between `key:value` pairs in the canonical serialization.
const FIELD_SEPARATOR: &str = "|";

/// Multiplier of the polynomial rolling hash.
const HASH_MULTIPLIER: i32 = 31;

/// Encode a vector as a 13-character sequence.
pub fn encode(vector: &ComponentVector) -> String {
    let mut sequence = String::with_capacity(SEQUENCE_LEN);
    for value in vector.values() {
        sequence.push(quantize_digit(value));
    }
    sequence.push_str(&hash_suffix(&canonical_form(vector)));
    sequence
}

/// Quantize a component to one hex digit in `0..=F`.
fn quantize_digit(value: f64) -> char {
    let level = (value / 100.0 * 15.0).round().clamp(0.0, 15.0) as u32;
    char::from_digit(level, 16)
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('0')
}

/// Serialize a vector as `consistency:v|diversity:v|...` in fixed order.
///
/// Values use Rust's shortest round-trip float formatting, so integral
/// values render without a fractional part (`100`, not `100.0`).
pub fn canonical_form(vector: &ComponentVector) -> String {
    Dimension::ALL
        .iter()
        .map(|d| format!("{}:{}", d.as_str(), vector.get(*d)))
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR)
}

/// 32-bit polynomial rolling hash over the bytes of `input`.
///
/// Arithmetic wraps in a signed 32-bit accumulator.
pub fn rolling_hash(input: &str) -> i32 {
    input.bytes().fold(0i32, |hash, byte| {
        hash.wrapping_mul(HASH_MULTIPLIER).wrapping_add(byte as i32)
    })
}

/// Absolute value of the hash as exactly eight uppercase hex digits.
fn hash_suffix(input: &str) -> String {
    let mut suffix = format!("{:08X}", rolling_hash(input).unsigned_abs());
    suffix.truncate(SUFFIX_LEN);
    suffix
}

/// Check that `sequence` has the shape produced by [`encode`].
pub fn is_valid_sequence(sequence: &str) -> bool {
    sequence.len() == SEQUENCE_LEN
        && sequence
            .chars()
            .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
}
