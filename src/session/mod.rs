//! Wallet session lifecycle: connect, auto-reconnect, disconnect.
//!
//! The session is an explicit value owned by one `SessionManager` and
//! published whole-value; dependent components hold a shared handle instead
//! of reaching into ambient globals. Connect attempts are serialized: a
//! second call while one is in flight is rejected, never run in parallel.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::persistence::FlagStore;
use crate::signing::SignatureResult;
use crate::wallet::{ProviderRegistry, WalletCapability};

/// A live, connected-wallet session.
///
/// Existence implies connected: a `Session` value always carries its
/// address, which encodes the address-iff-connected invariant by
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub address: String,
    /// Balance in whole tokens (smallest-unit integer divided by 10^18).
    pub balance: Decimal,
}

/// State shared between the session manager, the order signer, and the
/// state aggregator. Each field is replaced whole-value, never partially
/// mutated.
#[derive(Default)]
pub(crate) struct SharedSessionState {
    pub(crate) session: Option<Session>,
    pub(crate) wallet: Option<Arc<dyn WalletCapability>>,
    pub(crate) signature: Option<SignatureResult>,
}

pub(crate) type StateHandle = Arc<RwLock<SharedSessionState>>;

/// Owns the connect/reconnect/disconnect lifecycle and the persisted
/// reconnect flag.
pub struct SessionManager {
    registry: ProviderRegistry,
    flags: FlagStore,
    state: StateHandle,
    connect_gate: Mutex<()>,
    operation_timeout: Duration,
}

impl SessionManager {
    pub fn new(registry: ProviderRegistry, flags: FlagStore, config: &SessionConfig) -> Self {
        Self {
            registry,
            flags,
            state: Arc::new(RwLock::new(SharedSessionState::default())),
            connect_gate: Mutex::new(()),
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
        }
    }

    pub(crate) fn state_handle(&self) -> StateHandle {
        self.state.clone()
    }

    pub(crate) fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Connect to the first installed wallet provider.
    ///
    /// Fails with `NoProviderFound` when no provider is installed and
    /// `ConnectionRejected` when the enable step or balance query fails or
    /// times out. On success the persisted reconnect flag is set and any
    /// signature from a previous session is cleared.
    pub async fn connect(&self) -> Result<Session> {
        let _gate = self.connect_gate.try_lock().map_err(|_| Error::ConnectionRejected {
            reason: "another connect attempt is in flight".to_string(),
        })?;

        let wallet = self.registry.locate().ok_or(Error::NoProviderFound)?;

        timeout(self.operation_timeout, wallet.enable())
            .await
            .map_err(|_| Error::connection_rejected("wallet enable timed out"))?
            .map_err(Error::connection_rejected)?;

        let address = wallet.selected_address();

        let raw_balance = timeout(self.operation_timeout, wallet.get_balance())
            .await
            .map_err(|_| Error::connection_rejected("balance query timed out"))?
            .map_err(Error::connection_rejected)?;

        let balance =
            balance_from_smallest_units(&raw_balance).map_err(Error::connection_rejected)?;

        let session = Session { address, balance };

        {
            let mut state = self.state.write().await;
            state.session = Some(session.clone());
            state.wallet = Some(wallet);
            // A signature from a previous session is no longer meaningful.
            state.signature = None;
        }

        // The flag is a reconnect hint, not the session's source of truth.
        if let Err(err) = self.flags.set_wallet_connected(true) {
            warn!(error = %err, "could not persist walletConnected flag");
        }

        info!(address = %session.address, balance = %session.balance, "wallet connected");
        Ok(session)
    }

    /// Attempt a reconnect at startup if a previous run left the persisted
    /// flag set.
    ///
    /// A no-op when the flag is absent, touching no capability. Unlike
    /// `connect`, failures here are logged and swallowed so a dead wallet
    /// never interrupts the user on load.
    pub async fn try_auto_reconnect(&self) -> Option<Session> {
        match self.flags.wallet_connected() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(err) => {
                warn!(error = %err, "could not read walletConnected flag");
                return None;
            }
        }

        match self.connect().await {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(error = %err, "auto-reconnect failed");
                None
            }
        }
    }

    /// Clear the session, any held signature, and the persisted flag.
    /// Idempotent.
    pub async fn disconnect(&self) {
        {
            let mut state = self.state.write().await;
            state.session = None;
            state.wallet = None;
            state.signature = None;
        }

        if let Err(err) = self.flags.clear_wallet_connected() {
            warn!(error = %err, "could not clear walletConnected flag");
        }

        info!("wallet disconnected");
    }

    /// The current session, if connected.
    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session.clone()
    }

    /// The most recent signature, if any.
    pub async fn signature(&self) -> Option<SignatureResult> {
        self.state.read().await.signature.clone()
    }
}

/// Convert a smallest-unit integer balance string into whole tokens.
fn balance_from_smallest_units(raw: &str) -> anyhow::Result<Decimal> {
    let units = Decimal::from_str(raw.trim())
        .with_context(|| format!("invalid balance string {:?}", raw))?;
    Ok(units / dec!(1_000_000_000_000_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningConfig;
    use crate::signing::{OrderParams, OrderSigner};
    use crate::wallet::{MockWallet, ProviderKind};
    use tokio::sync::Notify;

    fn manager_with(wallets: Vec<MockWallet>) -> SessionManager {
        let mut registry = ProviderRegistry::empty();
        for wallet in wallets {
            registry.register(Arc::new(wallet));
        }
        SessionManager::new(
            registry,
            FlagStore::in_memory().unwrap(),
            &SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_connect_without_provider_fails() {
        let manager = manager_with(vec![]);
        let result = manager.connect().await;
        assert!(matches!(result, Err(Error::NoProviderFound)));
        assert!(manager.session().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_reports_address_and_converted_balance() {
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc")
            .with_balance("1500000000000000000");
        let manager = manager_with(vec![wallet]);

        let session = manager.connect().await.unwrap();
        assert_eq!(session.address, "0xabc");
        assert_eq!(session.balance, dec!(1.5));
        assert_eq!(manager.session().await, Some(session));
    }

    #[tokio::test]
    async fn test_connect_sets_persisted_flag() {
        let mut registry = ProviderRegistry::empty();
        registry.register(Arc::new(MockWallet::new(ProviderKind::ArgentX, "0xabc")));
        let flags = FlagStore::in_memory().unwrap();
        let manager = SessionManager::new(registry, flags, &SessionConfig::default());

        manager.connect().await.unwrap();
        assert!(manager.flags.wallet_connected().unwrap());
    }

    #[tokio::test]
    async fn test_declined_enable_is_rejected() {
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc").with_failing_enable();
        let manager = manager_with(vec![wallet]);

        let result = manager.connect().await;
        assert!(matches!(result, Err(Error::ConnectionRejected { .. })));
        assert!(manager.session().await.is_none());
        assert!(!manager.flags.wallet_connected().unwrap());
    }

    #[tokio::test]
    async fn test_failing_balance_query_is_rejected() {
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc").with_failing_balance();
        let manager = manager_with(vec![wallet]);

        let result = manager.connect().await;
        assert!(matches!(result, Err(Error::ConnectionRejected { .. })));
        assert!(!manager.flags.wallet_connected().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_enable_times_out() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        // Never released: the enable call hangs until the timeout ceiling.
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc")
            .with_enable_gate(entered, release);
        let manager = manager_with(vec![wallet]);

        let result = manager.connect().await;
        assert!(matches!(result, Err(Error::ConnectionRejected { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_connect_is_rejected() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc")
            .with_enable_gate(entered.clone(), release.clone());
        let manager = Arc::new(manager_with(vec![wallet]));

        let first = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.connect().await })
        };
        entered.notified().await;

        // First attempt is parked inside enable(); a second must not overlap.
        let second = manager.connect().await;
        assert!(matches!(second, Err(Error::ConnectionRejected { .. })));

        release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.address, "0xabc");
    }

    #[tokio::test]
    async fn test_auto_reconnect_without_flag_touches_nothing() {
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc");
        let mut registry = ProviderRegistry::empty();
        let probe = Arc::new(wallet);
        registry.register(probe.clone());
        let manager = SessionManager::new(
            registry,
            FlagStore::in_memory().unwrap(),
            &SessionConfig::default(),
        );

        assert!(manager.try_auto_reconnect().await.is_none());
        assert_eq!(probe.enable_calls(), 0);
    }

    #[tokio::test]
    async fn test_auto_reconnect_swallows_failures() {
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc").with_failing_enable();
        let manager = manager_with(vec![wallet]);
        manager.flags.set_wallet_connected(true).unwrap();

        // Never raises, even though the underlying connect fails.
        assert!(manager.try_auto_reconnect().await.is_none());
    }

    #[tokio::test]
    async fn test_auto_reconnect_with_flag_restores_session() {
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc");
        let manager = manager_with(vec![wallet]);
        manager.flags.set_wallet_connected(true).unwrap();

        let session = manager.try_auto_reconnect().await.unwrap();
        assert_eq!(session.address, "0xabc");
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_idempotent() {
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc");
        let manager = manager_with(vec![wallet]);
        manager.connect().await.unwrap();

        manager.disconnect().await;
        assert!(manager.session().await.is_none());
        assert!(!manager.flags.wallet_connected().unwrap());

        manager.disconnect().await;
        assert!(manager.session().await.is_none());
        assert!(!manager.flags.wallet_connected().unwrap());
    }

    #[tokio::test]
    async fn test_reconnect_clears_previous_signature() {
        let wallet = MockWallet::new(ProviderKind::ArgentX, "0xabc");
        let manager = manager_with(vec![wallet]);
        manager.connect().await.unwrap();

        let signer = OrderSigner::new(&manager, SigningConfig::default());
        signer.sign_order(&OrderParams::test_order()).await.unwrap();
        assert!(manager.signature().await.is_some());

        manager.connect().await.unwrap();
        assert!(manager.signature().await.is_none());
    }

    #[test]
    fn test_balance_conversion() {
        assert_eq!(
            balance_from_smallest_units("1500000000000000000").unwrap(),
            dec!(1.5)
        );
        assert_eq!(balance_from_smallest_units("0").unwrap(), Decimal::ZERO);
        assert!(balance_from_smallest_units("not-a-number").is_err());
    }
}
