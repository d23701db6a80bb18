//! Presentation-facing view of the calculator.

use calcfx_common::Currency;
use calcfx_fx::FetchStatus;

use crate::selection::ChosenCurrencies;

/// Everything a screen needs to render, keyed by the rate fetch status.
///
/// Until rates are available only the expression can be shown; once a
/// fetch succeeds the converter rows appear as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Loading {
        expression: String,
    },
    Error {
        expression: String,
    },
    Ready {
        expression: String,
        converted: String,
        currencies: Vec<Currency>,
        chosen: ChosenCurrencies,
    },
}

impl UiState {
    pub fn expression(&self) -> &str {
        match self {
            UiState::Loading { expression }
            | UiState::Error { expression }
            | UiState::Ready { expression, .. } => expression,
        }
    }

    pub fn status(&self) -> FetchStatus {
        match self {
            UiState::Loading { .. } => FetchStatus::Loading,
            UiState::Error { .. } => FetchStatus::Error,
            UiState::Ready { .. } => FetchStatus::Success,
        }
    }
}
