//! Mock wallet capability for tests and the `sign-test` demo flow.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::signing::TypedPayload;

use super::locator::ProviderKind;
use super::traits::WalletCapability;

/// A scriptable wallet capability.
///
/// Failure flags let tests drive each rejection path; the optional enable
/// gate parks `enable()` until released so tests can hold a connect attempt
/// in flight deterministically.
pub struct MockWallet {
    kind: ProviderKind,
    address: String,
    /// Balance as a smallest-unit integer string (10^18 per whole token).
    balance: String,
    fail_enable: AtomicBool,
    fail_balance: AtomicBool,
    fail_sign: AtomicBool,
    enable_calls: AtomicU64,
    sign_calls: AtomicU64,
    enable_gate: Option<EnableGate>,
}

/// Rendezvous for holding `enable()` in flight.
struct EnableGate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl MockWallet {
    /// A healthy wallet with a 1.5-token balance.
    pub fn new(kind: ProviderKind, address: &str) -> Self {
        Self {
            kind,
            address: address.to_string(),
            balance: "1500000000000000000".to_string(),
            fail_enable: AtomicBool::new(false),
            fail_balance: AtomicBool::new(false),
            fail_sign: AtomicBool::new(false),
            enable_calls: AtomicU64::new(0),
            sign_calls: AtomicU64::new(0),
            enable_gate: None,
        }
    }

    /// Override the reported smallest-unit balance.
    pub fn with_balance(mut self, balance: &str) -> Self {
        self.balance = balance.to_string();
        self
    }

    /// Make `enable()` fail (user declined the prompt).
    pub fn with_failing_enable(self) -> Self {
        self.fail_enable.store(true, Ordering::SeqCst);
        self
    }

    /// Make the balance query fail.
    pub fn with_failing_balance(self) -> Self {
        self.fail_balance.store(true, Ordering::SeqCst);
        self
    }

    /// Flip the sign-failure behavior at runtime.
    pub fn set_failing_sign(&self, fail: bool) {
        self.fail_sign.store(fail, Ordering::SeqCst);
    }

    /// Park `enable()` until `release` is notified; `entered` is notified
    /// once the call is in flight.
    pub fn with_enable_gate(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.enable_gate = Some(EnableGate { entered, release });
        self
    }

    /// Number of `enable()` calls observed.
    pub fn enable_calls(&self) -> u64 {
        self.enable_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletCapability for MockWallet {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn enable(&self) -> anyhow::Result<()> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.enable_gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.fail_enable.load(Ordering::SeqCst) {
            anyhow::bail!("user declined the connection prompt");
        }
        Ok(())
    }

    fn selected_address(&self) -> String {
        self.address.clone()
    }

    async fn get_balance(&self) -> anyhow::Result<String> {
        if self.fail_balance.load(Ordering::SeqCst) {
            anyhow::bail!("balance query failed");
        }
        Ok(self.balance.clone())
    }

    async fn sign_message(&self, payload: &TypedPayload) -> anyhow::Result<String> {
        if self.fail_sign.load(Ordering::SeqCst) {
            anyhow::bail!("user declined the signature request");
        }
        let n = self.sign_calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("0xsig{}:{}", n, payload.message.market))
    }
}
