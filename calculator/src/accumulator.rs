//! Expression accumulator.
//!
//! Holds the two-operand expression being typed and the last computed
//! total. All operations are synchronous and never panic; the derived
//! display text is available from [`Accumulator::display`] after each call.

use std::mem;

use calcfx_common::{to_plain_string, DecimalContext, DecimalError};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{CalcError, CalcResult};
use crate::operator::Operator;
use crate::state::EntryState;

/// Outcome of a compute request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Computation {
    /// No operator or no second operand; nothing happened.
    NotReady,
    /// A new total was computed and is now the first operand.
    Total(Decimal),
    /// The divisor was zero. State and display are left as they were.
    DivisionByZero,
    /// Operand text was malformed or the result overflowed. The error
    /// marker is shown and the pending operator is dropped.
    Failed(CalcError),
}

impl Computation {
    pub fn total(&self) -> Option<Decimal> {
        match self {
            Computation::Total(total) => Some(*total),
            _ => None,
        }
    }
}

/// Two-operand expression state machine.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    state: EntryState,
    total: Decimal,
    ctx: DecimalContext,
}

impl Accumulator {
    /// Create an idle accumulator using the 16-digit decimal context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle accumulator with a custom decimal context.
    pub fn with_context(ctx: DecimalContext) -> Self {
        Self {
            state: EntryState::Idle,
            total: Decimal::ZERO,
            ctx,
        }
    }

    pub fn state(&self) -> &EntryState {
        &self.state
    }

    pub fn context(&self) -> &DecimalContext {
        &self.ctx
    }

    /// Most recently computed total, zero before the first computation.
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn display(&self) -> String {
        self.state.display()
    }

    pub fn is_after_computation(&self) -> bool {
        self.state.is_after_computation()
    }

    /// Append a digit, or start a fresh operand right after a computation.
    pub fn enter_digit(&mut self, digit: u8) -> CalcResult<()> {
        if digit > 9 {
            return Err(CalcError::InvalidDigit(digit));
        }
        let digit = char::from(b'0' + digit);

        self.state = match mem::take(&mut self.state) {
            EntryState::Idle | EntryState::Computed { .. } | EntryState::Failed { .. } => {
                EntryState::BuildingFirst {
                    first: digit.to_string(),
                }
            }
            EntryState::BuildingFirst { mut first } => {
                first.push(digit);
                EntryState::BuildingFirst { first }
            }
            EntryState::OperatorChosen { first, operator } => EntryState::BuildingSecond {
                first,
                operator,
                second: digit.to_string(),
            },
            EntryState::BuildingSecond {
                first,
                operator,
                mut second,
            } => {
                second.push(digit);
                EntryState::BuildingSecond {
                    first,
                    operator,
                    second,
                }
            }
        };
        Ok(())
    }

    /// Choose an operator, computing a pending expression first.
    ///
    /// Returns the outcome of that chained computation, or `NotReady` when
    /// nothing was pending. Ignored while the display is empty, and while
    /// the pending expression divides by zero.
    pub fn enter_operator(&mut self, operator: Operator) -> Computation {
        if matches!(self.state, EntryState::BuildingSecond { .. }) {
            let outcome = self.compute_total();
            if outcome == Computation::DivisionByZero {
                return outcome;
            }
            self.choose_operator(operator);
            return outcome;
        }

        self.choose_operator(operator);
        Computation::NotReady
    }

    fn choose_operator(&mut self, operator: Operator) {
        self.state = match mem::take(&mut self.state) {
            EntryState::Idle => EntryState::Idle,
            EntryState::BuildingFirst { first }
            | EntryState::OperatorChosen { first, .. }
            | EntryState::Computed { result: first }
            | EntryState::Failed { first } => EntryState::OperatorChosen { first, operator },
            // Only reachable when the chained computation was refused.
            state @ EntryState::BuildingSecond { .. } => state,
        };
    }

    /// Add a decimal point to the operand being typed, once.
    pub fn enter_decimal_point(&mut self) {
        self.state = match mem::take(&mut self.state) {
            EntryState::Idle | EntryState::Computed { .. } | EntryState::Failed { .. } => {
                EntryState::BuildingFirst {
                    first: "0.".to_string(),
                }
            }
            EntryState::BuildingFirst { mut first } => {
                push_point(&mut first);
                EntryState::BuildingFirst { first }
            }
            EntryState::OperatorChosen { first, operator } => EntryState::BuildingSecond {
                first,
                operator,
                second: "0.".to_string(),
            },
            EntryState::BuildingSecond {
                first,
                operator,
                mut second,
            } => {
                push_point(&mut second);
                EntryState::BuildingSecond {
                    first,
                    operator,
                    second,
                }
            }
        };
    }

    /// Evaluate `first operator second`.
    pub fn compute_total(&mut self) -> Computation {
        let EntryState::BuildingSecond {
            first,
            operator,
            second,
        } = &self.state
        else {
            return Computation::NotReady;
        };

        let result = self.ctx.parse(first).and_then(|x| {
            let y = self.ctx.parse(second)?;
            operator.apply(&self.ctx, x, y)
        });

        match result {
            Ok(total) => {
                debug!(expression = %self.state.display(), total = %total, "Computed total");
                self.total = total;
                self.state = EntryState::Computed {
                    result: to_plain_string(total),
                };
                Computation::Total(total)
            }
            Err(DecimalError::DivisionByZero) => {
                warn!(expression = %self.state.display(), "Division by zero ignored");
                Computation::DivisionByZero
            }
            Err(e) => {
                let first = first.clone();
                warn!(expression = %self.state.display(), error = %e, "Computation failed");
                self.state = EntryState::Failed { first };
                Computation::Failed(e.into())
            }
        }
    }

    /// Remove the rightmost character: second operand, then operator, then first operand.
    pub fn delete_last_char(&mut self) {
        self.state = match mem::take(&mut self.state) {
            EntryState::Idle => EntryState::Idle,
            EntryState::BuildingSecond {
                first,
                operator,
                mut second,
            } => {
                second.pop();
                if second.is_empty() {
                    EntryState::OperatorChosen { first, operator }
                } else {
                    EntryState::BuildingSecond {
                        first,
                        operator,
                        second,
                    }
                }
            }
            EntryState::OperatorChosen { first, .. } => first_only(first),
            EntryState::BuildingFirst { mut first }
            | EntryState::Computed { result: mut first }
            | EntryState::Failed { mut first } => {
                first.pop();
                first_only(first)
            }
        };
    }

    /// Reset operands, operator and total.
    pub fn delete_all(&mut self) {
        self.state = EntryState::Idle;
        self.total = Decimal::ZERO;
    }

    /// Divide the active operand by one hundred in place.
    pub fn make_percent(&mut self) -> CalcResult<()> {
        let outcome = match &self.state {
            EntryState::BuildingFirst { first } => self
                .percent_of(first)
                .map(|first| EntryState::BuildingFirst { first }),
            EntryState::Computed { result: first } | EntryState::Failed { first } => self
                .percent_of(first)
                .map(|result| EntryState::Computed { result }),
            EntryState::BuildingSecond {
                first,
                operator,
                second,
            } => self
                .percent_of(second)
                .map(|second| EntryState::BuildingSecond {
                    first: first.clone(),
                    operator: *operator,
                    second,
                }),
            EntryState::Idle | EntryState::OperatorChosen { .. } => return Ok(()),
        };

        match outcome {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(e) => {
                warn!(expression = %self.state.display(), error = %e, "Percent failed");
                self.fail();
                Err(e.into())
            }
        }
    }

    fn percent_of(&self, operand: &str) -> Result<String, DecimalError> {
        let value = self.ctx.parse(operand)?;
        self.ctx.percent(value).map(to_plain_string)
    }

    /// Whether there is a first operand a conversion could apply to.
    pub fn has_value(&self) -> bool {
        self.state.first_operand().is_some_and(|first| !first.is_empty())
    }

    /// Value a currency conversion applies to.
    ///
    /// A pending `first operator second` expression is computed first and
    /// editing then continues on the result. While the error marker is shown
    /// the retained first operand is converted. Returns `None` when there is
    /// no first operand.
    pub fn conversion_operand(&mut self) -> CalcResult<Option<Decimal>> {
        if !self.has_value() {
            return Ok(None);
        }

        match &self.state {
            EntryState::Idle => Ok(None),
            EntryState::BuildingSecond { .. } => match self.compute_total() {
                Computation::Total(total) => {
                    self.state = EntryState::BuildingFirst {
                        first: to_plain_string(total),
                    };
                    Ok(Some(total))
                }
                Computation::DivisionByZero => Err(CalcError::DivisionByZero),
                Computation::Failed(e) => Err(e),
                Computation::NotReady => Ok(None),
            },
            EntryState::BuildingFirst { first }
            | EntryState::OperatorChosen { first, .. }
            | EntryState::Computed { result: first }
            | EntryState::Failed { first } => match self.ctx.parse(first) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    warn!(operand = %first, error = %e, "Conversion operand failed to parse");
                    self.fail();
                    Err(e.into())
                }
            },
        }
    }

    /// Show the error marker, dropping any pending operator and second operand.
    fn fail(&mut self) {
        let first = self.state.first_operand().unwrap_or_default().to_string();
        self.state = EntryState::Failed { first };
    }
}

fn push_point(operand: &mut String) {
    if !operand.bytes().any(|b| b.is_ascii_digit()) {
        operand.push_str("0.");
    } else if !operand.contains('.') {
        operand.push('.');
    }
}

fn first_only(first: String) -> EntryState {
    if first.is_empty() {
        EntryState::Idle
    } else {
        EntryState::BuildingFirst { first }
    }
}
