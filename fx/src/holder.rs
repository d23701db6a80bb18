//! Latest-snapshot holder with fetch status.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use calcfx_common::Observable;
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::error::{FxError, FxResult};
use crate::provider::RateProvider;
use crate::snapshot::RateSnapshot;

/// Outcome of the most recent fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// A fetch is in flight, or none has completed yet.
    Loading,
    /// The latest fetch succeeded.
    Success,
    /// The latest fetch failed; the previous snapshot is still served.
    Error,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchStatus::Loading => "loading",
            FetchStatus::Success => "success",
            FetchStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

struct Inner {
    provider: Arc<dyn RateProvider>,
    access_key: String,
    snapshot: Observable<Arc<RateSnapshot>>,
    status: Observable<FetchStatus>,
    last_error: RwLock<Option<FxError>>,
    sequence: AtomicU64,
}

/// Holds the latest successfully fetched [`RateSnapshot`].
///
/// Snapshots are replaced wholesale on success and left untouched on
/// failure. Overlapping fetches are not coordinated: whichever resolves
/// last publishes last. Clones share state.
#[derive(Clone)]
pub struct RateSnapshotHolder {
    inner: Arc<Inner>,
}

impl RateSnapshotHolder {
    /// Create a holder over `provider` with an empty snapshot.
    pub fn new(provider: Arc<dyn RateProvider>, access_key: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                provider,
                access_key: access_key.into(),
                snapshot: Observable::new(Arc::new(RateSnapshot::empty())),
                status: Observable::new(FetchStatus::Loading),
                last_error: RwLock::new(None),
                sequence: AtomicU64::new(0),
            }),
        }
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> Arc<RateSnapshot> {
        self.inner.snapshot.get()
    }

    /// Status of the latest fetch.
    pub fn status(&self) -> FetchStatus {
        self.inner.status.get()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Arc<RateSnapshot>> {
        self.inner.snapshot.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<FetchStatus> {
        self.inner.status.subscribe()
    }

    /// Error of the most recent failed fetch, cleared on success.
    pub fn last_error(&self) -> Option<FxError> {
        self.inner.last_error.read().clone()
    }

    /// Name of the underlying provider.
    pub fn provider_name(&self) -> &str {
        self.inner.provider.name()
    }

    /// Fetch with the configured access key.
    pub async fn refresh(&self) -> FxResult<Arc<RateSnapshot>> {
        let key = self.inner.access_key.clone();
        self.refresh_with_key(&key).await
    }

    /// Fetch a new snapshot and publish the outcome.
    #[instrument(skip(self, access_key), fields(provider = %self.inner.provider.name()))]
    pub async fn refresh_with_key(&self, access_key: &str) -> FxResult<Arc<RateSnapshot>> {
        let seq = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.status.set(FetchStatus::Loading);

        match self.inner.provider.fetch_latest(access_key).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                info!(
                    seq,
                    currencies = snapshot.len(),
                    base = ?snapshot.base,
                    "Rate snapshot updated"
                );
                *self.inner.last_error.write() = None;
                self.inner.snapshot.set(Arc::clone(&snapshot));
                self.inner.status.set(FetchStatus::Success);
                Ok(snapshot)
            }
            Err(e) => {
                warn!(
                    seq,
                    error = %e,
                    retryable = e.is_retryable(),
                    "Rate fetch failed, keeping previous snapshot"
                );
                *self.inner.last_error.write() = Some(e.clone());
                self.inner.status.set(FetchStatus::Error);
                Err(e)
            }
        }
    }

    /// Fire a refresh on the tokio runtime.
    pub fn spawn_refresh(&self) -> JoinHandle<FxResult<Arc<RateSnapshot>>> {
        let holder = self.clone();
        tokio::spawn(async move { holder.refresh().await })
    }
}

impl fmt::Debug for RateSnapshotHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateSnapshotHolder")
            .field("provider", &self.inner.provider.name())
            .field("status", &self.status())
            .field("currencies", &self.snapshot().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockRateProvider;
    use calcfx_common::Currency;
    use rust_decimal_macros::dec;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn setup() -> (Arc<MockRateProvider>, RateSnapshotHolder) {
        let provider = Arc::new(MockRateProvider::new("test"));
        provider.set_rate("EUR", dec!(1));
        provider.set_rate("USD", dec!(1.1));
        let holder = RateSnapshotHolder::new(provider.clone(), "secret");
        (provider, holder)
    }

    #[tokio::test]
    async fn test_starts_empty_and_loading() {
        let (_, holder) = setup();
        assert!(holder.snapshot().is_empty());
        assert_eq!(holder.status(), FetchStatus::Loading);
    }

    #[tokio::test]
    async fn test_refresh_success() {
        let (provider, holder) = setup();

        let snapshot = assert_ok!(holder.refresh().await);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(holder.status(), FetchStatus::Success);
        assert_eq!(holder.snapshot().rate(&Currency::usd()).unwrap(), dec!(1.1));
        assert_eq!(provider.access_keys(), vec!["secret".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let (provider, holder) = setup();
        assert_ok!(holder.refresh().await);

        provider.fail_next(FxError::Service {
            code: 104,
            info: "usage limit reached".to_string(),
        });
        let error = assert_err!(holder.refresh().await);

        assert_eq!(error.error_code(), "SERVICE_ERROR");
        assert_eq!(holder.status(), FetchStatus::Error);
        assert_eq!(holder.snapshot().len(), 2);
        assert_eq!(holder.last_error(), Some(error));
    }

    #[tokio::test]
    async fn test_failure_before_first_success_leaves_empty() {
        let (provider, holder) = setup();
        provider.fail_next(FxError::Network("offline".to_string()));

        assert_err!(holder.refresh().await);

        assert!(holder.snapshot().is_empty());
        assert_eq!(holder.status(), FetchStatus::Error);
    }

    #[tokio::test]
    async fn test_retry_after_failure_clears_error() {
        let (provider, holder) = setup();
        provider.fail_next(FxError::Network("offline".to_string()));
        assert_err!(holder.refresh().await);

        assert_ok!(holder.refresh().await);

        assert_eq!(holder.status(), FetchStatus::Success);
        assert!(holder.last_error().is_none());
    }

    #[tokio::test]
    async fn test_status_published_to_subscribers() {
        let (_, holder) = setup();
        let mut status = holder.subscribe_status();
        let mut snapshots = holder.subscribe_snapshot();

        assert_ok!(assert_ok!(holder.spawn_refresh().await));

        assert!(status.has_changed().unwrap());
        assert_eq!(*status.borrow_and_update(), FetchStatus::Success);
        assert!(snapshots.has_changed().unwrap());
        assert_eq!(snapshots.borrow_and_update().len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_order_fetches_last_write_wins() {
        let (provider, holder) = setup();

        // First fetch is slow and succeeds, second is fast and fails.
        provider.delay_next(Duration::from_millis(50));
        let slow = holder.spawn_refresh();
        tokio::time::sleep(Duration::from_millis(5)).await;

        provider.fail_next(FxError::Network("timeout".to_string()));
        let fast = holder.spawn_refresh();

        assert_err!(fast.await.unwrap());
        assert_eq!(holder.status(), FetchStatus::Error);

        assert_ok!(slow.await.unwrap());
        assert_eq!(holder.status(), FetchStatus::Success);
        assert_eq!(holder.snapshot().len(), 2);
        assert_eq!(provider.calls(), 2);
    }
}
