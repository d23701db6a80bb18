//! Calculator error types.

use calcfx_common::DecimalError;
use calcfx_fx::FxError;
use thiserror::Error;

/// Errors reported by calculator operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalcError {
    /// Operand text is not a decimal number.
    #[error("Invalid operand: {0:?}")]
    Parse(String),

    /// Result does not fit the decimal range.
    #[error("Result out of range")]
    Overflow,

    /// Divisor parsed to zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Digit key outside 0-9.
    #[error("Invalid digit: {0}")]
    InvalidDigit(u8),

    /// Unknown operator symbol.
    #[error("Invalid operator: {0:?}")]
    InvalidOperator(String),

    /// Currency row index other than source or target.
    #[error("Invalid currency row: {0}")]
    InvalidRow(usize),

    /// Conversion failed in the FX layer.
    #[error(transparent)]
    Fx(#[from] FxError),
}

impl CalcError {
    /// Get error code for logs and callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::Parse(_) => "PARSE_FAILURE",
            CalcError::Overflow => "OVERFLOW",
            CalcError::DivisionByZero => "DIVISION_BY_ZERO",
            CalcError::InvalidDigit(_) => "INVALID_DIGIT",
            CalcError::InvalidOperator(_) => "INVALID_OPERATOR",
            CalcError::InvalidRow(_) => "INVALID_ROW",
            CalcError::Fx(e) => e.error_code(),
        }
    }
}

impl From<DecimalError> for CalcError {
    fn from(error: DecimalError) -> Self {
        match error {
            DecimalError::Parse(text) => CalcError::Parse(text),
            DecimalError::Overflow => CalcError::Overflow,
            DecimalError::DivisionByZero => CalcError::DivisionByZero,
        }
    }
}

/// Result type for calculator operations.
pub type CalcResult<T> = Result<T, CalcError>;
