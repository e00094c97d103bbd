//! Read-only view state for a renderer.
//!
//! `ViewState::assemble` is a pure function of the session, the latest
//! snapshot, and the latest signature; `StateAggregator` is the pull-based
//! convenience over the live handles.

use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::market::{FundingRateEntry, FundingRateSnapshot};
use crate::session::{Session, SessionManager, StateHandle};
use crate::signing::SignatureResult;

/// Everything a renderer needs to display, in one read-only value.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub connected: bool,
    pub address: Option<String>,
    pub balance: Option<Decimal>,
    pub funding_rates: Vec<FundingRateEntry>,
    pub last_signature: Option<SignatureResult>,
}

impl ViewState {
    /// Merge the component outputs. Pure; no side effects.
    pub fn assemble(
        session: Option<&Session>,
        snapshot: &FundingRateSnapshot,
        signature: Option<&SignatureResult>,
    ) -> Self {
        Self {
            connected: session.is_some(),
            address: session.map(|s| s.address.clone()),
            balance: session.map(|s| s.balance),
            funding_rates: snapshot.rates.clone(),
            last_signature: signature.cloned(),
        }
    }
}

/// Pull-based aggregator over the session state and the poller's snapshot
/// channel.
pub struct StateAggregator {
    state: StateHandle,
    snapshot_rx: watch::Receiver<FundingRateSnapshot>,
}

impl StateAggregator {
    pub fn new(
        manager: &SessionManager,
        snapshot_rx: watch::Receiver<FundingRateSnapshot>,
    ) -> Self {
        Self {
            state: manager.state_handle(),
            snapshot_rx,
        }
    }

    /// The current view, recomputed from the live handles.
    pub async fn current(&self) -> ViewState {
        let state = self.state.read().await;
        let snapshot = self.snapshot_rx.borrow().clone();
        ViewState::assemble(state.session.as_ref(), &snapshot, state.signature.as_ref())
    }
}
