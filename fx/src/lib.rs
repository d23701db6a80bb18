//! CalcFx FX Layer
//!
//! Exchange rate snapshots, the holder that keeps the latest one, and the
//! ratio arithmetic used to convert calculator results between currencies.
//!
//! # Features
//!
//! - Pluggable rate providers, with an HTTP provider for `latest`-style APIs
//! - Immutable snapshots replaced wholesale on every successful fetch
//! - Tri-state fetch status published to subscribers
//! - Conversion under the shared fixed decimal precision
//!
//! # Example
//!
//! ```rust,ignore
//! use calcfx_fx::{HttpRateProvider, RateServiceConfig, RateSnapshotHolder};
//!
//! let config = RateServiceConfig::from_env();
//! let provider = Arc::new(HttpRateProvider::new(&config)?);
//! let holder = RateSnapshotHolder::new(provider, config.access_key.clone());
//!
//! holder.refresh().await?;
//! let usd = holder.snapshot().rate(&Currency::usd())?;
//! ```

pub mod config;
pub mod conversion;
pub mod error;
pub mod holder;
pub mod http;
pub mod provider;
pub mod snapshot;

pub use config::RateServiceConfig;
pub use conversion::{apply_ratio, conversion_ratio, convert_amount, Conversion};
pub use error::{FxError, FxResult};
pub use holder::{FetchStatus, RateSnapshotHolder};
pub use http::HttpRateProvider;
pub use provider::RateProvider;
#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
pub use snapshot::RateSnapshot;
