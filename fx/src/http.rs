//! HTTP rate provider for the `latest` rates endpoint.
//!
//! Wire format: `GET {base}/latest?access_key=KEY` answers with a JSON body
//! whose `rates` object maps currency codes to numbers. Services of this
//! family also report `success`, `base`, `date` and, on failure, an `error`
//! object; all of them are optional here.

use async_trait::async_trait;
use calcfx_common::Currency;
use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::RateServiceConfig;
use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;
use crate::snapshot::RateSnapshot;

/// Body of the `latest` endpoint.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    rates: HashMap<String, serde_json::Number>,
    #[serde(default)]
    error: Option<ServiceErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    info: Option<String>,
}

/// Rate provider backed by an HTTP JSON API.
pub struct HttpRateProvider {
    client: Client,
    latest_url: String,
}

impl HttpRateProvider {
    /// Create a provider from configuration.
    pub fn new(config: &RateServiceConfig) -> FxResult<Self> {
        config.validate().map_err(FxError::Configuration)?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FxError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            latest_url: config.latest_url(),
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    fn name(&self) -> &str {
        "HTTP"
    }

    async fn fetch_latest(&self, access_key: &str) -> FxResult<RateSnapshot> {
        let response = self
            .client
            .get(&self.latest_url)
            .query(&[("access_key", access_key)])
            .send()
            .await
            .map_err(|e| FxError::Network(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FxError::Service {
                code: i64::from(status.as_u16()),
                info: status.canonical_reason().unwrap_or("unknown status").to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FxError::Network(format!("Failed to read body: {}", e)))?;

        debug!(url = %self.latest_url, bytes = body.len(), "Received rates body");
        parse_latest_body(&body)
    }
}

/// Parse a `latest` endpoint body into a snapshot.
pub fn parse_latest_body(body: &str) -> FxResult<RateSnapshot> {
    let response: LatestRatesResponse = serde_json::from_str(body)
        .map_err(|e| FxError::Network(format!("JSON parse error: {}", e)))?;

    if response.success == Some(false) || response.error.is_some() {
        let error = response.error.unwrap_or(ServiceErrorBody {
            code: 0,
            kind: None,
            info: None,
        });
        let info = error
            .info
            .or(error.kind)
            .unwrap_or_else(|| "request unsuccessful".to_string());
        return Err(FxError::Service {
            code: error.code,
            info,
        });
    }

    let rates = response.rates.into_iter().filter_map(|(code, number)| {
        let currency = Currency::new(code);
        match parse_rate(&number) {
            Some(rate) => Some((currency, rate)),
            None => {
                warn!(currency = %currency, value = %number, "Skipping unparsable rate");
                None
            }
        }
    });

    let mut snapshot = RateSnapshot::new(rates);
    if let Some(base) = response.base {
        snapshot = snapshot.with_base(Currency::new(base));
    }
    if let Some(date) = response.date {
        snapshot = snapshot.with_as_of(date);
    }

    Ok(snapshot)
}

fn parse_rate(number: &serde_json::Number) -> Option<Decimal> {
    let text = number.to_string();
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(&text).ok()
    } else {
        Decimal::from_str(&text).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_rates() {
        let body = r#"{
            "success": true,
            "timestamp": 1700000000,
            "base": "EUR",
            "date": "2024-03-01",
            "rates": {"EUR": 1, "USD": 1.1, "JPY": 160.25}
        }"#;

        let snapshot = parse_latest_body(body).unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.base, Some(Currency::eur()));
        assert_eq!(snapshot.as_of, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(snapshot.rate(&Currency::usd()).unwrap(), dec!(1.1));
        assert_eq!(snapshot.rate(&Currency::jpy()).unwrap(), dec!(160.25));
    }

    #[test]
    fn test_parse_minimal_body() {
        let snapshot = parse_latest_body(r#"{"rates": {"usd": 1.08}}"#).unwrap();
        assert_eq!(snapshot.rate(&Currency::usd()).unwrap(), dec!(1.08));
        assert!(snapshot.base.is_none());
    }

    #[test]
    fn test_parse_scientific_rate() {
        let snapshot = parse_latest_body(r#"{"rates": {"BTC": 1.5e-5}}"#).unwrap();
        assert_eq!(snapshot.rate(&Currency::new("BTC")).unwrap(), dec!(0.000015));
    }

    #[test]
    fn test_service_error_payload() {
        let body = r#"{
            "success": false,
            "error": {"code": 101, "type": "invalid_access_key", "info": "You have not supplied a valid API Access Key."}
        }"#;

        let error = parse_latest_body(body).unwrap_err();

        assert_eq!(
            error,
            FxError::Service {
                code: 101,
                info: "You have not supplied a valid API Access Key.".to_string(),
            }
        );
    }

    #[test]
    fn test_unsuccessful_without_error_object() {
        let error = parse_latest_body(r#"{"success": false}"#).unwrap_err();
        assert_eq!(error.error_code(), "SERVICE_ERROR");
    }

    #[test]
    fn test_malformed_body() {
        let error = parse_latest_body("<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(error, FxError::Network(_)));
    }

    #[test]
    fn test_non_positive_rates_skipped() {
        let snapshot = parse_latest_body(r#"{"rates": {"EUR": 1, "XXX": 0, "YYY": -2}}"#).unwrap();
        assert_eq!(snapshot.currencies(), vec![Currency::eur()]);
    }

    #[test]
    fn test_provider_rejects_invalid_config() {
        let config = RateServiceConfig {
            base_url: String::new(),
            ..Default::default()
        };
        assert!(matches!(
            HttpRateProvider::new(&config),
            Err(FxError::Configuration(_))
        ));
    }
}
