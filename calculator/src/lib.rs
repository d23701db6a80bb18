//! CalcFx Calculator
//!
//! A two-operand calculator whose result can be converted between
//! currencies using the latest exchange rate snapshot.
//!
//! # Overview
//!
//! - [`Accumulator`] is the pure expression state machine
//! - [`Calculator`] wraps it with currency selection, conversion and
//!   observable output for a presentation layer
//! - [`UiState`] folds everything into a single renderable value
//!
//! # Example
//!
//! ```rust,ignore
//! use calcfx_calculator::{Calculator, CalculatorConfig, Operator};
//!
//! let mut calc = Calculator::new(holder, CalculatorConfig::default());
//! calc.enter_digit(4)?;
//! calc.enter_operator(Operator::Multiply);
//! calc.enter_digit(5)?;
//! calc.convert_chosen()?;
//!
//! assert_eq!(calc.expression(), "20");
//! ```

pub mod accumulator;
pub mod calculator;
pub mod config;
pub mod error;
pub mod operator;
pub mod selection;
pub mod state;
pub mod ui_state;

pub use accumulator::{Accumulator, Computation};
pub use calculator::Calculator;
pub use config::CalculatorConfig;
pub use error::{CalcError, CalcResult};
pub use operator::Operator;
pub use selection::{ChosenCurrencies, CurrencyRow};
pub use state::{EntryState, ERROR_MARKER};
pub use ui_state::UiState;
