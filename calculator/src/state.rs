//! Expression entry states.

use crate::operator::Operator;

/// Text shown in place of the expression after a failed computation.
pub const ERROR_MARKER: &str = "Error";

/// Where the user is in entering a two-operand expression.
///
/// Operand texts match `-?\d*\.?\d*` and are only parsed when a result is
/// needed. `Computed` and `Failed` are the after-computation states: the
/// next digit or decimal point starts a fresh expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EntryState {
    /// Nothing entered.
    #[default]
    Idle,
    /// Typing the first operand.
    BuildingFirst { first: String },
    /// Operator chosen, second operand not started.
    OperatorChosen { first: String, operator: Operator },
    /// Typing the second operand.
    BuildingSecond {
        first: String,
        operator: Operator,
        second: String,
    },
    /// Showing the result of the last computation.
    Computed { result: String },
    /// Showing the error marker. `first` keeps the operand text that was
    /// current when the computation failed.
    Failed { first: String },
}

impl EntryState {
    /// The expression display text.
    pub fn display(&self) -> String {
        match self {
            EntryState::Idle => String::new(),
            EntryState::BuildingFirst { first } => first.clone(),
            EntryState::OperatorChosen { first, operator } => format!("{}{}", first, operator),
            EntryState::BuildingSecond {
                first,
                operator,
                second,
            } => format!("{}{}{}", first, operator, second),
            EntryState::Computed { result } => result.clone(),
            EntryState::Failed { .. } => ERROR_MARKER.to_string(),
        }
    }

    /// Whether the next digit starts a new expression.
    pub fn is_after_computation(&self) -> bool {
        matches!(self, EntryState::Computed { .. } | EntryState::Failed { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, EntryState::Idle)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, EntryState::Failed { .. })
    }

    /// First operand text, including a computed result.
    pub fn first_operand(&self) -> Option<&str> {
        match self {
            EntryState::Idle => None,
            EntryState::BuildingFirst { first }
            | EntryState::OperatorChosen { first, .. }
            | EntryState::BuildingSecond { first, .. }
            | EntryState::Failed { first } => Some(first),
            EntryState::Computed { result } => Some(result),
        }
    }

    pub fn operator(&self) -> Option<Operator> {
        match self {
            EntryState::OperatorChosen { operator, .. }
            | EntryState::BuildingSecond { operator, .. } => Some(*operator),
            _ => None,
        }
    }

    pub fn second_operand(&self) -> Option<&str> {
        match self {
            EntryState::BuildingSecond { second, .. } => Some(second),
            _ => None,
        }
    }
}
