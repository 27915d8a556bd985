//! Error types for recurrence expansion.
//!
//! The pipeline as a whole is total: these errors never leave the crate's
//! public entry points. The normalizer logs them and degrades to the single
//! anchor occurrence.

use thiserror::Error;

/// An error that occurred while expanding a recurrence rule.
#[derive(Debug, Error)]
pub enum RecurrenceError {
    /// The rule text could not be parsed or validated.
    #[error("invalid recurrence rule: {0}")]
    InvalidRule(#[from] rrule::RRuleError),

    /// The rule text is empty after stripping the `RRULE:` prefix.
    #[error("empty recurrence rule")]
    EmptyRule,
}

/// A convenient result alias for recurrence operations.
pub type RecurrenceResult<T> = Result<T, RecurrenceError>;
