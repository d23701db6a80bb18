//! CLI configuration.

use calcfx_calculator::CalculatorConfig;
use calcfx_fx::RateServiceConfig;

/// Main configuration for the keypad driver.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Rate service settings.
    pub rates: RateServiceConfig,
    /// Calculator settings.
    pub calculator: CalculatorConfig,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON log lines instead of plain text.
    pub json_logs: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            rates: RateServiceConfig::default(),
            calculator: CalculatorConfig::default(),
            log_level: "warn".to_string(),
            json_logs: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            rates: RateServiceConfig::from_env(),
            calculator: CalculatorConfig::from_env(),
            ..Self::default()
        };

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        if let Ok(flag) = std::env::var("LOG_JSON") {
            config.json_logs = flag == "1" || flag.eq_ignore_ascii_case("true");
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.rates.validate()?;
        self.calculator.validate()?;

        if self.log_level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}
