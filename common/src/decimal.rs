//! Fixed-precision decimal arithmetic.
//!
//! Every calculator and conversion result is rounded to a fixed number of
//! significant digits (16, half-even, the 64-bit decimal context) and then
//! normalized, so `2.50 + 2.50` renders as `5` rather than `5.00`.
//!
//! Values live in the `rust_decimal` range: magnitudes up to about 7.9e28
//! and at most 28 decimal places. Operands or results outside it are
//! reported as [`DecimalError::Overflow`], never silently truncated.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::error::{DecimalError, DecimalResult};

/// A precision and rounding mode applied to every arithmetic result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalContext {
    precision: u32,
    strategy: RoundingStrategy,
}

impl DecimalContext {
    /// 16 significant digits, ties to even.
    pub const DECIMAL64: Self = Self {
        precision: 16,
        strategy: RoundingStrategy::MidpointNearestEven,
    };

    /// Create a context with a custom precision.
    pub fn new(precision: u32, strategy: RoundingStrategy) -> Self {
        Self {
            precision: precision.max(1),
            strategy,
        }
    }

    /// Number of significant digits kept.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Parse operand text of the form `-?\d*\.?\d*`.
    ///
    /// A trailing or leading point is accepted (`"5."`, `".5"`), a bare sign
    /// or point is not. Well-formed text outside the decimal range is an
    /// overflow, not a parse failure.
    pub fn parse(&self, text: &str) -> DecimalResult<Decimal> {
        let unsigned = text.strip_prefix('-').unwrap_or(text);
        let well_formed = unsigned.bytes().any(|b| b.is_ascii_digit())
            && unsigned.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            && unsigned.bytes().filter(|&b| b == b'.').count() <= 1;
        if !well_formed {
            return Err(DecimalError::Parse(text.to_string()));
        }

        let mut canonical = String::with_capacity(text.len() + 2);
        if unsigned.len() != text.len() {
            canonical.push('-');
        }
        if unsigned.starts_with('.') {
            canonical.push('0');
        }
        canonical.push_str(unsigned.strip_suffix('.').unwrap_or(unsigned));

        Decimal::from_str(&canonical).map_err(|_| DecimalError::Overflow)
    }

    /// Round to the context precision and strip trailing zeros.
    pub fn round(&self, value: Decimal) -> DecimalResult<Decimal> {
        let value = value.normalize();
        if value.is_zero() {
            return Ok(Decimal::ZERO);
        }

        let digits = value
            .mantissa()
            .unsigned_abs()
            .checked_ilog10()
            .map_or(1, |d| d + 1);
        if digits <= self.precision {
            return Ok(value);
        }

        let excess = digits - self.precision;
        let rounded = if excess <= value.scale() {
            value.round_dp_with_strategy(value.scale() - excess, self.strategy)
        } else {
            // Rounding lands left of the decimal point.
            let shift = excess - value.scale();
            let power = Decimal::from_i128_with_scale(10i128.pow(shift), 0);
            value
                .checked_div(power)
                .ok_or(DecimalError::Overflow)?
                .round_dp_with_strategy(0, self.strategy)
                .checked_mul(power)
                .ok_or(DecimalError::Overflow)?
        };

        let rounded = rounded.normalize();
        Ok(if rounded.is_zero() { Decimal::ZERO } else { rounded })
    }

    pub fn add(&self, x: Decimal, y: Decimal) -> DecimalResult<Decimal> {
        self.round(x.checked_add(y).ok_or(DecimalError::Overflow)?)
    }

    pub fn sub(&self, x: Decimal, y: Decimal) -> DecimalResult<Decimal> {
        self.round(x.checked_sub(y).ok_or(DecimalError::Overflow)?)
    }

    pub fn mul(&self, x: Decimal, y: Decimal) -> DecimalResult<Decimal> {
        let product = x.checked_mul(y).ok_or(DecimalError::Overflow)?;
        self.round(not_underflowed(product, !x.is_zero() && !y.is_zero())?)
    }

    /// Divide, reporting a zero divisor instead of panicking.
    pub fn div(&self, x: Decimal, y: Decimal) -> DecimalResult<Decimal> {
        if y.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }
        let quotient = x.checked_div(y).ok_or(DecimalError::Overflow)?;
        self.round(not_underflowed(quotient, !x.is_zero())?)
    }

    /// Divide by one hundred.
    pub fn percent(&self, x: Decimal) -> DecimalResult<Decimal> {
        self.div(x, Decimal::ONE_HUNDRED)
    }
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self::DECIMAL64
    }
}

/// A product or quotient of non-zero values that came out as zero fell
/// below the smallest representable scale.
fn not_underflowed(value: Decimal, expect_non_zero: bool) -> DecimalResult<Decimal> {
    if expect_non_zero && value.is_zero() {
        Err(DecimalError::Overflow)
    } else {
        Ok(value)
    }
}

/// Render a value as plain text without exponent or trailing zeros.
pub fn to_plain_string(value: Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    value.normalize().to_string()
}
