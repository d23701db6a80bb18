//! Error types for decimal arithmetic.

use thiserror::Error;

/// Errors raised while parsing or computing under a [`crate::DecimalContext`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    /// Operand text is not a decimal number.
    #[error("Invalid decimal: {0:?}")]
    Parse(String),

    /// Result does not fit the decimal range.
    #[error("Decimal overflow")]
    Overflow,

    /// Divisor is zero.
    #[error("Division by zero")]
    DivisionByZero,
}

impl DecimalError {
    /// Get error code for logs and callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            DecimalError::Parse(_) => "PARSE_FAILURE",
            DecimalError::Overflow => "OVERFLOW",
            DecimalError::DivisionByZero => "DIVISION_BY_ZERO",
        }
    }
}

/// Result type alias for decimal operations.
pub type DecimalResult<T> = std::result::Result<T, DecimalError>;
