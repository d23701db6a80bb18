//! Immutable exchange rate snapshots.

use calcfx_common::Currency;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::{FxError, FxResult};

/// Point-in-time mapping of currency code to exchange rate.
///
/// All rates are expressed against one anchor currency, so any pair can be
/// derived as `rate(to) / rate(from)`. Only positive rates are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// Anchor currency, when the service reports one.
    pub base: Option<Currency>,
    /// Date the service quotes the rates for.
    pub as_of: Option<NaiveDate>,
    /// When the snapshot was received.
    pub fetched_at: DateTime<Utc>,
    rates: BTreeMap<Currency, Decimal>,
}

impl RateSnapshot {
    /// Snapshot with no rates, the state before the first fetch.
    pub fn empty() -> Self {
        Self {
            base: None,
            as_of: None,
            fetched_at: DateTime::<Utc>::default(),
            rates: BTreeMap::new(),
        }
    }

    /// Build a snapshot, dropping non-positive rates.
    pub fn new(rates: impl IntoIterator<Item = (Currency, Decimal)>) -> Self {
        let rates = rates
            .into_iter()
            .filter(|(currency, rate)| {
                let keep = rate.is_sign_positive() && !rate.is_zero();
                if !keep {
                    warn!(currency = %currency, rate = %rate, "Dropping non-positive rate");
                }
                keep
            })
            .collect();

        Self {
            base: None,
            as_of: None,
            fetched_at: Utc::now(),
            rates,
        }
    }

    /// Set the anchor currency.
    pub fn with_base(mut self, base: Currency) -> Self {
        self.base = Some(base);
        self
    }

    /// Set the quote date.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Look up the rate of a currency against the anchor.
    pub fn rate(&self, currency: &Currency) -> FxResult<Decimal> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| FxError::MissingRate(currency.clone()))
    }

    /// Whether a rate exists for the currency.
    pub fn contains(&self, currency: &Currency) -> bool {
        self.rates.contains_key(currency)
    }

    /// Available currency codes, sorted.
    pub fn currencies(&self) -> Vec<Currency> {
        self.rates.keys().cloned().collect()
    }

    /// Iterate over all rates in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&Currency, &Decimal)> {
        self.rates.iter()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl Default for RateSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<(Currency, Decimal)> for RateSnapshot {
    fn from_iter<I: IntoIterator<Item = (Currency, Decimal)>>(iter: I) -> Self {
        Self::new(iter)
    }
}
