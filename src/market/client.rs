//! Funding-rate REST client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::MarketDataConfig;
use crate::error::Error;

use super::types::{FundingRateEntry, FundingRateSnapshot};
use super::FundingRateFetcher;

/// HTTP client for the exchange's public funding-rate endpoint.
pub struct FundingRateClient {
    http: Client,
    base_url: String,
    markets: Vec<String>,
}

impl FundingRateClient {
    /// Create a new client from configuration.
    pub fn new(config: &MarketDataConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            markets: config.markets.clone(),
        })
    }

    /// Fetch current funding rates for the configured markets.
    ///
    /// Network errors, non-2xx statuses, and malformed payloads all map to
    /// `FetchFailed`; the caller (normally the poller) treats that as
    /// transient and keeps the previous snapshot.
    #[instrument(skip(self))]
    pub async fn get_funding_rates(&self) -> crate::Result<FundingRateSnapshot> {
        let url = format!("{}/funding-rates", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("markets", self.markets.join(","))])
            .send()
            .await
            .map_err(Error::fetch_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchFailed {
                reason: format!("unexpected status {}", status),
            });
        }

        let rates: Vec<FundingRateEntry> = response.json().await.map_err(Error::fetch_failed)?;

        debug!(markets = rates.len(), "funding rates fetched");
        Ok(FundingRateSnapshot::new(rates))
    }
}

#[async_trait]
impl FundingRateFetcher for FundingRateClient {
    async fn fetch(&self) -> crate::Result<FundingRateSnapshot> {
        self.get_funding_rates().await
    }
}
