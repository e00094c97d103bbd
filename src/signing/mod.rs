//! Typed-data payload construction and order signing.
//!
//! Builds a deterministic SNIP-12-shaped payload from a fixed schema plus
//! caller-supplied order fields, and delegates signing to the active
//! session's wallet capability.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::time::timeout;
use tracing::info;

use crate::config::SigningConfig;
use crate::error::{Error, Result};
use crate::session::{SessionManager, StateHandle};

/// Order side for the signable payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Long,
    Short,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Long => write!(f, "LONG"),
            OrderSide::Short => write!(f, "SHORT"),
        }
    }
}

/// Caller-supplied order fields for a signing request.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderParams {
    pub market: String,
    pub side: OrderSide,
    pub size: Decimal,
    pub price: Decimal,
    /// Unix expiration timestamp; filled as now + the configured horizon
    /// when absent.
    pub expiration: Option<i64>,
}

impl OrderParams {
    /// The canonical test order: 1 ETH-USD long at price 0.
    pub fn test_order() -> Self {
        Self {
            market: "ETH-USD".to_string(),
            side: OrderSide::Long,
            size: Decimal::ONE,
            price: Decimal::ZERO,
            expiration: None,
        }
    }
}

/// Typed-data domain, fixed per deployment.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub name: String,
    pub version: String,
    pub chain_id: String,
}

/// One field of the `Order` type.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

/// The type table: a single `Order` type with ordered felt fields.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TypeSchema {
    #[serde(rename = "Order")]
    pub order: Vec<FieldDescriptor>,
}

/// Order message with all values string-encoded, in schema field order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderMessage {
    pub market: String,
    pub side: String,
    pub size: String,
    pub price: String,
    pub expiration: String,
}

/// The complete signable payload. Immutable once built; deterministic given
/// the schema, order fields, and expiration.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypedPayload {
    pub domain: Domain,
    pub types: TypeSchema,
    pub primary_type: String,
    pub message: OrderMessage,
}

/// Ordered field names of the `Order` type.
const ORDER_FIELDS: [&str; 5] = ["market", "side", "size", "price", "expiration"];

impl TypedPayload {
    /// Build the payload, filling `expiration` from the configured horizon
    /// when the caller leaves it unset.
    pub fn build(schema: &SigningConfig, params: &OrderParams) -> Self {
        let expiration = params
            .expiration
            .unwrap_or_else(|| Utc::now().timestamp() + schema.expiration_horizon_secs);

        Self {
            domain: Domain {
                name: schema.domain_name.clone(),
                version: schema.domain_version.clone(),
                chain_id: schema.chain_id.clone(),
            },
            types: TypeSchema {
                order: ORDER_FIELDS
                    .iter()
                    .map(|name| FieldDescriptor {
                        name: name.to_string(),
                        field_type: "felt".to_string(),
                    })
                    .collect(),
            },
            primary_type: "Order".to_string(),
            message: OrderMessage {
                market: params.market.clone(),
                side: params.side.to_string(),
                size: params.size.to_string(),
                price: params.price.to_string(),
                expiration: expiration.to_string(),
            },
        }
    }
}

/// Opaque signature returned by the wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureResult {
    pub raw: String,
    pub produced_at: DateTime<Utc>,
}

/// Signs orders through the active session's wallet capability.
pub struct OrderSigner {
    state: StateHandle,
    schema: SigningConfig,
    operation_timeout: Duration,
}

impl OrderSigner {
    /// Create a signer sharing the manager's session state.
    pub fn new(manager: &SessionManager, schema: SigningConfig) -> Self {
        Self {
            state: manager.state_handle(),
            schema,
            operation_timeout: manager.operation_timeout(),
        }
    }

    /// Sign an order through the active session.
    ///
    /// Fails with `NotConnected` without a session and `SigningRejected`
    /// when the wallet declines or the call times out. A successful result
    /// replaces any prior signature; a failure retains it. No retry is
    /// attempted here, the caller decides.
    pub async fn sign_order(&self, params: &OrderParams) -> Result<SignatureResult> {
        let wallet = {
            let state = self.state.read().await;
            if state.session.is_none() {
                return Err(Error::NotConnected);
            }
            state.wallet.clone().ok_or(Error::NotConnected)?
        };

        let payload = TypedPayload::build(&self.schema, params);

        let raw = timeout(self.operation_timeout, wallet.sign_message(&payload))
            .await
            .map_err(|_| Error::signing_rejected("signing request timed out"))?
            .map_err(Error::signing_rejected)?;

        let result = SignatureResult {
            raw,
            produced_at: Utc::now(),
        };

        self.state.write().await.signature = Some(result.clone());
        info!(market = %params.market, side = %params.side, "order signed");

        Ok(result)
    }
}
