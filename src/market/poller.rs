//! Interval-driven funding-rate poller.
//!
//! Fetches once immediately, then once per interval, publishing each
//! successful snapshot wholesale through a watch channel. Fetch failures
//! retain the previous snapshot; the next tick retries naturally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};

use super::types::FundingRateSnapshot;
use super::FundingRateFetcher;

/// Owns the single-poller-per-session invariant.
pub struct MarketPoller {
    running: Arc<AtomicBool>,
}

impl MarketPoller {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start polling with the given interval and fetcher.
    ///
    /// Performs one fetch immediately, then one per interval until the
    /// returned handle is stopped. Fails with `DoublePollerStart` if a
    /// previous handle from this poller is still running.
    pub fn start(
        &self,
        interval: Duration,
        fetcher: Arc<dyn FundingRateFetcher>,
    ) -> Result<PollHandle> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::DoublePollerStart);
        }

        let (snapshot_tx, snapshot_rx) = watch::channel(FundingRateSnapshot::default());
        let (error_tx, error_rx) = watch::channel(None::<String>);
        let (stop_tx, stop_rx) = watch::channel(false);

        let running = self.running.clone();
        let task = tokio::spawn(async move {
            poll_loop(interval, fetcher, snapshot_tx, error_tx, stop_rx).await;
            running.store(false, Ordering::SeqCst);
        });

        Ok(PollHandle {
            stop_tx,
            task: Mutex::new(Some(task)),
            snapshot_rx,
            error_rx,
        })
    }
}

impl Default for MarketPoller {
    fn default() -> Self {
        Self::new()
    }
}

async fn poll_loop(
    interval: Duration,
    fetcher: Arc<dyn FundingRateFetcher>,
    snapshot_tx: watch::Sender<FundingRateSnapshot>,
    error_tx: watch::Sender<Option<String>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            biased;
            // Errors also when the handle is dropped without stop().
            _ = stop_rx.changed() => break,
            _ = ticker.tick() => {
                let fetched = tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    result = fetcher.fetch() => result,
                };

                // A stop raced the response: discard it.
                if *stop_rx.borrow() {
                    break;
                }

                match fetched {
                    Ok(snapshot) => {
                        debug!(markets = snapshot.rates.len(), "snapshot published");
                        snapshot_tx.send_replace(snapshot);
                        if error_tx.borrow().is_some() {
                            error_tx.send_replace(None);
                        }
                    }
                    Err(err) => {
                        // Previous snapshot stays in place.
                        warn!(error = %err, "funding rate fetch failed, keeping last snapshot");
                        error_tx.send_replace(Some(err.to_string()));
                    }
                }
            }
        }
    }
}

/// Handle to a running poll task.
pub struct PollHandle {
    stop_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
    snapshot_rx: watch::Receiver<FundingRateSnapshot>,
    error_rx: watch::Receiver<Option<String>>,
}

impl PollHandle {
    /// Subscribe to snapshot publications.
    pub fn subscribe(&self) -> watch::Receiver<FundingRateSnapshot> {
        self.snapshot_rx.clone()
    }

    /// The most recently published snapshot (empty before the first fetch).
    pub fn latest(&self) -> FundingRateSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to fetch-failure notifications; `None` clears on recovery.
    pub fn errors(&self) -> watch::Receiver<Option<String>> {
        self.error_rx.clone()
    }

    /// The last recorded fetch failure, if the most recent tick failed.
    pub fn last_error(&self) -> Option<String> {
        self.error_rx.borrow().clone()
    }

    /// Stop polling. Idempotent and safe to call repeatedly.
    ///
    /// When this returns the poll task has exited: the timer is cancelled
    /// and any in-flight fetch has been dropped, so a late response cannot
    /// revive the poller.
    pub async fn stop(&self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
    }
}
