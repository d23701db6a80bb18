//! Currency conversion arithmetic.

use calcfx_common::{to_plain_string, Currency, DecimalContext, DecimalError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{FxError, FxResult};
use crate::snapshot::RateSnapshot;

/// Represents a completed currency conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    /// Input amount, in the source currency.
    pub input: Decimal,
    /// Source currency.
    pub from: Currency,
    /// Target currency.
    pub to: Currency,
    /// Ratio applied, `rate(to) / rate(from)`.
    pub ratio: Decimal,
    /// Output amount, in the target currency.
    pub output: Decimal,
    /// When the conversion was executed.
    pub executed_at: DateTime<Utc>,
}

impl Conversion {
    /// Output rendered as plain decimal text.
    pub fn output_text(&self) -> String {
        to_plain_string(self.output)
    }

    /// Get the effective rate used.
    pub fn effective_rate(&self) -> Decimal {
        if self.input.is_zero() {
            return self.ratio;
        }
        self.output / self.input
    }
}

/// Ratio that turns an amount in `from` into an amount in `to`.
pub fn conversion_ratio(
    snapshot: &RateSnapshot,
    from: &Currency,
    to: &Currency,
    ctx: &DecimalContext,
) -> FxResult<Decimal> {
    let from_rate = snapshot.rate(from)?;
    let to_rate = snapshot.rate(to)?;

    ctx.div(to_rate, from_rate)
        .map_err(|e| arithmetic_error(from, e))
}

/// Convert `amount` from one currency to another under `ctx`.
pub fn convert_amount(
    snapshot: &RateSnapshot,
    amount: Decimal,
    from: &Currency,
    to: &Currency,
    ctx: &DecimalContext,
) -> FxResult<Conversion> {
    let ratio = conversion_ratio(snapshot, from, to, ctx)?;
    apply_ratio(amount, from, to, ratio, ctx)
}

/// Convert `amount` with an already resolved ratio.
pub fn apply_ratio(
    amount: Decimal,
    from: &Currency,
    to: &Currency,
    ratio: Decimal,
    ctx: &DecimalContext,
) -> FxResult<Conversion> {
    let output = ctx
        .mul(amount, ratio)
        .map_err(|e| arithmetic_error(to, e))?;

    Ok(Conversion {
        input: amount,
        from: from.clone(),
        to: to.clone(),
        ratio,
        output,
        executed_at: Utc::now(),
    })
}

fn arithmetic_error(currency: &Currency, error: DecimalError) -> FxError {
    FxError::InvalidRate {
        currency: currency.clone(),
        reason: error.to_string(),
    }
}
