//! Funding-rate market data: wire types, HTTP client, and the poller.

pub mod client;
pub mod poller;
pub mod types;

pub use client::FundingRateClient;
pub use poller::{MarketPoller, PollHandle};
pub use types::{FundingRateEntry, FundingRateSnapshot};

use async_trait::async_trait;

/// Source of funding-rate snapshots.
///
/// The poller takes this as an injected dependency so the HTTP client can be
/// replaced with a test double.
#[async_trait]
pub trait FundingRateFetcher: Send + Sync {
    /// Fetch a fresh snapshot covering all configured markets.
    async fn fetch(&self) -> crate::Result<FundingRateSnapshot>;
}
