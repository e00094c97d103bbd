//! Provider-agnostic trait for injected wallet capabilities.
//!
//! Provides a common interface over browser-style wallet extensions
//! (Argent X, Braavos, ...) so the session and signing components can be
//! exercised against a test double.

use crate::signing::TypedPayload;
use async_trait::async_trait;

use super::locator::ProviderKind;

/// An installed wallet capability supplied by the host environment.
///
/// Errors from these calls are opaque to the core; the session manager maps
/// them into its own taxonomy (`ConnectionRejected`, `SigningRejected`).
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// Which known provider this capability belongs to.
    fn kind(&self) -> ProviderKind;

    /// Request access to the wallet. Must be called before any account
    /// operation; may prompt the user and be declined.
    async fn enable(&self) -> anyhow::Result<()>;

    /// The address the wallet currently exposes. Only meaningful after a
    /// successful `enable()`.
    fn selected_address(&self) -> String;

    /// Account balance as a smallest-unit integer string (wei-style, 10^18
    /// units per whole token).
    async fn get_balance(&self) -> anyhow::Result<String>;

    /// Sign a typed-data payload, returning the opaque signature string.
    async fn sign_message(&self, payload: &TypedPayload) -> anyhow::Result<String>;
}
