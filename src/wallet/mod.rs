//! Wallet capability interface and provider detection.
//!
//! The wallet itself is an external collaborator injected by the host
//! environment; this crate only consumes the capability surface.

pub mod locator;
pub mod mock;
pub mod traits;

pub use locator::{ProviderKind, ProviderRegistry};
pub use mock::MockWallet;
pub use traits::WalletCapability;
