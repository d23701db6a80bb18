//! Chosen currency pair.

use calcfx_common::Currency;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CalcError;

/// Row of the currency picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CurrencyRow {
    /// Currency the result is expressed in.
    Source = 0,
    /// Currency the result is converted to.
    Target = 1,
}

impl TryFrom<usize> for CurrencyRow {
    type Error = CalcError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(CurrencyRow::Source),
            1 => Ok(CurrencyRow::Target),
            other => Err(CalcError::InvalidRow(other)),
        }
    }
}

/// The source and target currencies picked by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenCurrencies {
    pub source: Currency,
    pub target: Currency,
}

impl ChosenCurrencies {
    pub fn new(source: Currency, target: Currency) -> Self {
        Self { source, target }
    }

    pub fn get(&self, row: CurrencyRow) -> &Currency {
        match row {
            CurrencyRow::Source => &self.source,
            CurrencyRow::Target => &self.target,
        }
    }

    pub fn set(&mut self, row: CurrencyRow, currency: Currency) {
        match row {
            CurrencyRow::Source => self.source = currency,
            CurrencyRow::Target => self.target = currency,
        }
    }

    /// Row index to code, the shape the picker renders from.
    pub fn as_map(&self) -> BTreeMap<usize, Currency> {
        BTreeMap::from([
            (CurrencyRow::Source as usize, self.source.clone()),
            (CurrencyRow::Target as usize, self.target.clone()),
        ])
    }
}

impl Default for ChosenCurrencies {
    fn default() -> Self {
        Self::new(Currency::eur(), Currency::usd())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pair() {
        let chosen = ChosenCurrencies::default();
        assert_eq!(
            chosen.as_map(),
            BTreeMap::from([(0, Currency::eur()), (1, Currency::usd())])
        );
    }

    #[test]
    fn test_set_row() {
        let mut chosen = ChosenCurrencies::default();
        chosen.set(CurrencyRow::Target, Currency::jpy());
        assert_eq!(chosen.get(CurrencyRow::Target), &Currency::jpy());
        assert_eq!(chosen.get(CurrencyRow::Source), &Currency::eur());
    }

    #[test]
    fn test_row_from_index() {
        assert_eq!(CurrencyRow::try_from(1), Ok(CurrencyRow::Target));
        assert_eq!(CurrencyRow::try_from(2), Err(CalcError::InvalidRow(2)));
    }
}
