//! Error taxonomy for wallet session and market data operations.
//!
//! User-initiated operations (`connect`, `sign_order`) surface these to the
//! caller; background operations (auto-reconnect, poll ticks) log and swallow
//! them, keeping the last good state.

use thiserror::Error;

/// Errors surfaced by the session, poller, and signing components.
#[derive(Debug, Error)]
pub enum Error {
    /// No known wallet provider is installed in the host environment.
    #[error("no wallet provider found")]
    NoProviderFound,

    /// The capability's enable step or balance query failed, timed out,
    /// or another connect attempt is already in flight.
    #[error("wallet connection rejected: {reason}")]
    ConnectionRejected { reason: String },

    /// An operation that requires an active session was called without one.
    #[error("no active wallet session")]
    NotConnected,

    /// The wallet declined the signing request or the call failed.
    #[error("signing rejected: {reason}")]
    SigningRejected { reason: String },

    /// A funding-rate fetch failed; transient, retried on the next poll tick.
    #[error("funding rate fetch failed: {reason}")]
    FetchFailed { reason: String },

    /// A second poller was started without stopping the first.
    /// Programming error, fatal to the caller.
    #[error("market data poller is already running")]
    DoublePollerStart,
}

impl Error {
    pub(crate) fn connection_rejected(err: impl std::fmt::Display) -> Self {
        Error::ConnectionRejected {
            reason: err.to_string(),
        }
    }

    pub(crate) fn signing_rejected(err: impl std::fmt::Display) -> Self {
        Error::SigningRejected {
            reason: err.to_string(),
        }
    }

    pub(crate) fn fetch_failed(err: impl std::fmt::Display) -> Self {
        Error::FetchFailed {
            reason: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
