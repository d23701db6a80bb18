//! FX error types.

use calcfx_common::Currency;
use thiserror::Error;

/// Errors that can occur while fetching or applying exchange rates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FxError {
    /// Currency absent from the current rate snapshot.
    #[error("Rate not available for {0}")]
    MissingRate(Currency),

    /// Rate present but unusable.
    #[error("Invalid rate for {currency}: {reason}")]
    InvalidRate { currency: Currency, reason: String },

    /// Transport failure talking to the rate service.
    #[error("Network error: {0}")]
    Network(String),

    /// Rate service answered with an error.
    #[error("Rate service error {code}: {info}")]
    Service { code: i64, info: String },

    /// Invalid rate service configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FxError {
    /// Check if retrying the fetch may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FxError::Network(_) | FxError::Service { .. })
    }

    /// Get error code for logs and callers.
    pub fn error_code(&self) -> &'static str {
        match self {
            FxError::MissingRate(_) => "MISSING_RATE",
            FxError::InvalidRate { .. } => "INVALID_RATE",
            FxError::Network(_) => "NETWORK_ERROR",
            FxError::Service { .. } => "SERVICE_ERROR",
            FxError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
