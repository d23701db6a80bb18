//! Rate provider trait and test double.

use async_trait::async_trait;

use crate::error::FxResult;
use crate::snapshot::RateSnapshot;

/// A source of exchange rate snapshots.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the latest snapshot of all rates.
    async fn fetch_latest(&self, access_key: &str) -> FxResult<RateSnapshot>;
}

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockRateProvider;

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use crate::error::FxError;
    use calcfx_common::Currency;
    use dashmap::DashMap;
    use parking_lot::Mutex;
    use rust_decimal::Decimal;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock rate provider for testing.
    ///
    /// Serves whatever rates were set, unless a failure or delay has been
    /// queued for the next fetch.
    pub struct MockRateProvider {
        name: String,
        rates: DashMap<Currency, Decimal>,
        failures: Mutex<VecDeque<FxError>>,
        delays: Mutex<VecDeque<Duration>>,
        access_keys: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl MockRateProvider {
        /// Create a new mock provider.
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                rates: DashMap::new(),
                failures: Mutex::new(VecDeque::new()),
                delays: Mutex::new(VecDeque::new()),
                access_keys: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        /// Set a rate against the anchor currency.
        pub fn set_rate(&self, currency: impl Into<Currency>, rate: Decimal) {
            self.rates.insert(currency.into(), rate);
        }

        /// Remove every rate.
        pub fn clear_rates(&self) {
            self.rates.clear();
        }

        /// Fail the next fetch with `error`.
        pub fn fail_next(&self, error: FxError) {
            self.failures.lock().push_back(error);
        }

        /// Delay the next fetch by `delay` before it resolves.
        pub fn delay_next(&self, delay: Duration) {
            self.delays.lock().push_back(delay);
        }

        /// Number of fetches served so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Access keys seen, in call order.
        pub fn access_keys(&self) -> Vec<String> {
            self.access_keys.lock().clone()
        }
    }

    #[async_trait]
    impl RateProvider for MockRateProvider {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_latest(&self, access_key: &str) -> FxResult<RateSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.access_keys.lock().push(access_key.to_string());

            // Decide the outcome before sleeping so overlapping calls keep call order.
            let failure = self.failures.lock().pop_front();
            let snapshot: RateSnapshot = self
                .rates
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect();

            let delay = self.delays.lock().pop_front();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            match failure {
                Some(error) => Err(error),
                None => Ok(snapshot),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FxError;
    use calcfx_common::Currency;
    use rust_decimal_macros::dec;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_mock_provider() {
        let provider = MockRateProvider::new("test");
        provider.set_rate("EUR", dec!(1));
        provider.set_rate("USD", dec!(1.1));

        let snapshot = assert_ok!(provider.fetch_latest("key").await);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.rate(&Currency::usd()).unwrap(), dec!(1.1));
        assert_eq!(provider.access_keys(), vec!["key".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_provider_scripted_failure() {
        let provider = MockRateProvider::new("test");
        provider.set_rate("EUR", dec!(1));
        provider.fail_next(FxError::Network("connection reset".to_string()));

        let error = assert_err!(provider.fetch_latest("key").await);
        assert!(error.is_retryable());

        // Only the next call fails.
        assert_ok!(provider.fetch_latest("key").await);
        assert_eq!(provider.calls(), 2);
    }
}
