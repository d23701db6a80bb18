//! Calculator configuration.

use calcfx_common::Currency;

use crate::selection::ChosenCurrencies;

/// Configuration for the calculator core.
#[derive(Debug, Clone)]
pub struct CalculatorConfig {
    /// Source currency selected at start.
    pub default_from: Currency,
    /// Target currency selected at start.
    pub default_to: Currency,
    /// Fetch rates as soon as the calculator starts.
    pub fetch_on_start: bool,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            default_from: Currency::eur(),
            default_to: Currency::usd(),
            fetch_on_start: true,
        }
    }
}

impl CalculatorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(code) = std::env::var("CALC_FROM_CURRENCY") {
            config.default_from = Currency::new(code);
        }

        if let Ok(code) = std::env::var("CALC_TO_CURRENCY") {
            config.default_to = Currency::new(code);
        }

        if let Ok(flag) = std::env::var("CALC_FETCH_ON_START") {
            if let Ok(flag) = flag.parse() {
                config.fetch_on_start = flag;
            }
        }

        config
    }

    /// Initial currency selection.
    pub fn chosen_currencies(&self) -> ChosenCurrencies {
        ChosenCurrencies::new(self.default_from.clone(), self.default_to.clone())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        for currency in [&self.default_from, &self.default_to] {
            if !currency.is_iso_code() {
                return Err(format!("Not a three-letter currency code: {:?}", currency.code()));
            }
        }

        Ok(())
    }
}
