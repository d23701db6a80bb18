//! Binary operators.

use calcfx_common::{DecimalContext, DecimalResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalcError;

/// One of the four keypad operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    /// Symbol shown in the expression display.
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '×',
            Operator::Divide => '/',
        }
    }

    /// Apply the operator under `ctx`.
    pub fn apply(&self, ctx: &DecimalContext, x: Decimal, y: Decimal) -> DecimalResult<Decimal> {
        match self {
            Operator::Add => ctx.add(x, y),
            Operator::Subtract => ctx.sub(x, y),
            Operator::Multiply => ctx.mul(x, y),
            Operator::Divide => ctx.div(x, y),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" | "−" => Ok(Operator::Subtract),
            "×" | "x" | "X" | "*" => Ok(Operator::Multiply),
            "/" | "÷" => Ok(Operator::Divide),
            other => Err(CalcError::InvalidOperator(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_symbols() {
        assert_eq!("+".parse::<Operator>().unwrap(), Operator::Add);
        assert_eq!("x".parse::<Operator>().unwrap(), Operator::Multiply);
        assert_eq!("×".parse::<Operator>().unwrap(), Operator::Multiply);
        assert_eq!("÷".parse::<Operator>().unwrap(), Operator::Divide);
        assert_eq!(
            "%".parse::<Operator>(),
            Err(CalcError::InvalidOperator("%".to_string()))
        );
    }

    #[test]
    fn test_apply() {
        let ctx = DecimalContext::DECIMAL64;
        assert_eq!(Operator::Add.apply(&ctx, dec!(2.5), dec!(2.5)).unwrap(), dec!(5));
        assert_eq!(Operator::Subtract.apply(&ctx, dec!(3), dec!(5)).unwrap(), dec!(-2));
        assert_eq!(Operator::Multiply.apply(&ctx, dec!(1.5), dec!(4)).unwrap(), dec!(6));
        assert_eq!(Operator::Divide.apply(&ctx, dec!(1), dec!(8)).unwrap(), dec!(0.125));
    }

    #[test]
    fn test_display_symbol() {
        assert_eq!(Operator::Multiply.to_string(), "×");
        assert_eq!(Operator::Divide.to_string(), "/");
    }
}
