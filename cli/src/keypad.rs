//! Line-oriented keypad driving a [`Calculator`].

use std::str::FromStr;

use calcfx_calculator::{CalcError, Calculator, Computation, CurrencyRow, Operator, UiState};
use calcfx_common::Currency;
use thiserror::Error;
use tracing::debug;

/// Keypad input errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeypadError {
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    #[error("{0} expects a currency code")]
    MissingCurrency(&'static str),

    #[error(transparent)]
    Calc(#[from] CalcError),
}

/// One line of keypad input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Digits and decimal points, typed left to right.
    Keys(String),
    Operator(Operator),
    Equals,
    Percent,
    Delete,
    Clear,
    Choose(CurrencyRow, Currency),
    /// Convert between an explicit pair, or the chosen one.
    Convert(Option<(Currency, Currency)>),
    Refresh,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = KeypadError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Command::Show);
        };

        let currency = |word: Option<&str>, name| {
            word.map(Currency::new)
                .ok_or(KeypadError::MissingCurrency(name))
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "=" => Command::Equals,
            "%" => Command::Percent,
            "<" | "del" => Command::Delete,
            "c" | "clear" => Command::Clear,
            "from" => Command::Choose(CurrencyRow::Source, currency(words.next(), "from")?),
            "to" => Command::Choose(CurrencyRow::Target, currency(words.next(), "to")?),
            "convert" => match words.next() {
                None => Command::Convert(None),
                from => Command::Convert(Some((
                    currency(from, "convert")?,
                    currency(words.next(), "convert")?,
                ))),
            },
            "rates" | "refresh" => Command::Refresh,
            "show" => Command::Show,
            "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            keys if keys.bytes().all(|b| b.is_ascii_digit() || b == b'.') => {
                Command::Keys(keys.to_string())
            }
            _ => match head.parse::<Operator>() {
                Ok(op) => Command::Operator(op),
                Err(_) => return Err(KeypadError::UnknownKey(head.to_string())),
            },
        };

        Ok(command)
    }
}

/// Result of running one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Render(String),
    Quit,
}

pub const HELP: &str = "\
keys:     digits and '.', e.g. 12.5
ops:      + - x /   =   %   < (delete)   c (clear)
currency: from EUR | to USD | convert [FROM TO]
other:    rates | show | help | quit";

/// Drives a calculator from parsed commands.
pub struct Keypad {
    calculator: Calculator,
}

impl Keypad {
    pub fn new(calculator: Calculator) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// Parse and run one input line.
    pub async fn run_line(&mut self, line: &str) -> Result<Outcome, KeypadError> {
        let command = line.parse::<Command>()?;
        self.execute(command).await
    }

    pub async fn execute(&mut self, command: Command) -> Result<Outcome, KeypadError> {
        debug!(command = ?command, "Keypad command");
        let calc = &mut self.calculator;

        match command {
            Command::Keys(keys) => {
                for key in keys.bytes() {
                    if key == b'.' {
                        calc.enter_decimal_point();
                    } else {
                        calc.enter_digit(key - b'0')?;
                    }
                }
            }
            Command::Operator(op) => note_computation(calc.enter_operator(op))?,
            Command::Equals => note_computation(calc.compute_total())?,
            Command::Percent => calc.make_percent()?,
            Command::Delete => calc.delete_last_char(),
            Command::Clear => calc.delete_all(),
            Command::Choose(row, currency) => calc.choose_currency(row, currency),
            Command::Convert(None) => {
                calc.convert_chosen()?;
            }
            Command::Convert(Some((from, to))) => {
                calc.convert(&from, &to)?;
            }
            Command::Refresh => {
                // A failed fetch is reflected in the rendered status.
                let _ = calc.fetch_rates().await;
            }
            Command::Show => {}
            Command::Help => return Ok(Outcome::Render(HELP.to_string())),
            Command::Quit => return Ok(Outcome::Quit),
        }

        Ok(Outcome::Render(render(&calc.ui_state())))
    }
}

fn note_computation(outcome: Computation) -> Result<(), CalcError> {
    match outcome {
        Computation::DivisionByZero => Err(CalcError::DivisionByZero),
        Computation::Failed(e) => Err(e),
        Computation::NotReady | Computation::Total(_) => Ok(()),
    }
}

/// Render the screen for a UI state.
pub fn render(state: &UiState) -> String {
    let expression = match state.expression() {
        "" => "0",
        text => text,
    };

    match state {
        UiState::Loading { .. } => format!("{}\n  [loading rates]", expression),
        UiState::Error { .. } => format!("{}\n  [rates unavailable]", expression),
        UiState::Ready {
            converted,
            currencies,
            chosen,
            ..
        } => {
            let converted = if converted.is_empty() { "-" } else { converted };
            format!(
                "{}\n  {} -> {}: {}  ({} currencies)",
                expression,
                chosen.source,
                chosen.target,
                converted,
                currencies.len()
            )
        }
    }
}
