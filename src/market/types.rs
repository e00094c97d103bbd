//! Wire types for the funding-rate endpoint.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Funding data for one perpetual market.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRateEntry {
    pub market: String,
    /// Current funding rate, in percent.
    pub current_rate: Decimal,
    /// Index price of the underlying.
    pub index_price: Decimal,
}

/// The latest funding-rate data across all configured markets.
///
/// Replaced wholesale on each successful poll, never partially updated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FundingRateSnapshot {
    /// Entries in the order the endpoint returned them.
    pub rates: Vec<FundingRateEntry>,
    /// When this snapshot was fetched; `None` for the initial empty state.
    pub fetched_at: Option<DateTime<Utc>>,
}

impl FundingRateSnapshot {
    /// Snapshot stamped with the current time.
    pub fn new(rates: Vec<FundingRateEntry>) -> Self {
        Self {
            rates,
            fetched_at: Some(Utc::now()),
        }
    }

    /// True before the first successful fetch.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}
