//! Error types for curve arithmetic and state projection
//!
//! Two failure classes are surfaced to callers and never clamped:
//! - **InvalidInput**: the caller handed in something the math cannot accept
//!   (negative swap amount, non-positive divisor, non-positive peg or limit price)
//! - **InvalidState**: a projection would leave a reserve, invariant or divisor
//!   non-positive
//!
//! Degenerate outcomes (zero trade size, zero price) are ordinary values, not errors.

use thiserror::Error;

/// Errors raised by fixed-point arithmetic and curve projections
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Caller supplied an argument outside the operation's domain
    #[error("Invalid input to {operation}: {reason}")]
    InvalidInput {
        operation: &'static str,
        reason: String,
    },

    /// Projection would produce a non-positive reserve, invariant or divisor
    #[error("Invalid state in {operation}: {reason}")]
    InvalidState {
        operation: &'static str,
        reason: String,
    },

    /// Value cannot be rendered as a `Decimal` (too many digits)
    #[error("Conversion: {value} does not fit a Decimal with scale {decimals}")]
    Conversion { value: String, decimals: u32 },

    /// A blocking scan task panicked or was cancelled
    #[error("Scan task failed: {0}")]
    TaskFailed(String),
}

impl CurveError {
    pub fn invalid_input(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            operation,
            reason: reason.into(),
        }
    }

    pub fn invalid_state(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidState {
            operation,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CurveError>;
