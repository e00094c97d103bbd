//! Wallet provider detection.
//!
//! Inspects a fixed, ordered list of known provider identifiers in the host
//! environment and returns the first one present. Absence is a normal,
//! non-exceptional outcome.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::traits::WalletCapability;

/// Known wallet providers, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    ArgentX,
    Braavos,
}

impl ProviderKind {
    /// Fixed detection order: Argent X is preferred over Braavos.
    pub const DETECTION_ORDER: [ProviderKind; 2] = [ProviderKind::ArgentX, ProviderKind::Braavos];

    /// Identifier the host environment registers the provider under.
    pub fn identifier(&self) -> &'static str {
        match self {
            ProviderKind::ArgentX => "starknet_argentX",
            ProviderKind::Braavos => "starknet_braavos",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::ArgentX => write!(f, "Argent X"),
            ProviderKind::Braavos => write!(f, "Braavos"),
        }
    }
}

/// The host environment's set of installed wallet capabilities.
///
/// Borrowed view over capabilities the host injects; the registry never
/// constructs or owns wallet logic itself.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn WalletCapability>>,
}

impl ProviderRegistry {
    /// An environment with no installed providers.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register an installed capability under its provider kind.
    pub fn register(&mut self, capability: Arc<dyn WalletCapability>) {
        self.providers.insert(capability.kind(), capability);
    }

    /// Return the first installed provider in detection order, or `None`.
    /// No side effects; deterministic given the registered set.
    pub fn locate(&self) -> Option<Arc<dyn WalletCapability>> {
        ProviderKind::DETECTION_ORDER
            .iter()
            .find_map(|kind| self.providers.get(kind).cloned())
    }
}
