//! Audit module for Habit DNA.
//!
//! Tracks aggregate engine activity so operators can see what the engine
//! has processed without exposing any user data.

pub mod log;

// Re-export commonly used types
pub use log::{AuditLog, AuditStats, SharedAuditLog};
