use chrono::{DateTime, Utc};
use derive_more::{Constructor, Display, From};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vantage_instrument::{OrderStatus, OrderType, Side, Symbol, TimeInForce, VenueId};

#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, From,
)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A venue-assigned client order id, capped at 32 characters and limited
/// to a venue-safe character set.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
pub struct ClientOrderId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("client order id `{value}` exceeds {max} characters or uses an unsafe character")]
pub struct ClientOrderIdError {
    pub value: String,
    pub max: usize,
}

impl ClientOrderId {
    pub const MAX_LEN: usize = 32;

    pub fn new(value: impl Into<String>) -> Result<Self, ClientOrderIdError> {
        let value = value.into();
        let safe = !value.is_empty()
            && value.len() <= Self::MAX_LEN
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if safe {
            Ok(Self(value))
        } else {
            Err(ClientOrderIdError {
                value,
                max: Self::MAX_LEN,
            })
        }
    }

    /// Generates `s{strategyId|"id"}{unixMillis}` truncated to 32 chars
    /// when the caller does not supply one.
    pub fn generate(strategy_id: Option<&str>, unix_millis: i64) -> Self {
        let mut raw = format!("s{}{}", strategy_id.unwrap_or("id"), unix_millis);
        raw.truncate(Self::MAX_LEN);
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Constructor)]
pub struct OrderProvenance {
    pub strategy_id: Option<String>,
    pub strategy_name: Option<String>,
    pub strategy_type: Option<String>,
    pub user_id: Option<String>,
}

/// An inbound order observation from a venue push or poll. Fields that the
/// venue may omit on a given update are `Option`, distinguishing "absent"
/// from "zero" so the merge step can inherit rather than regress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: OrderId,
    pub client_order_id: Option<ClientOrderId>,
    pub venue: VenueId,
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    pub status: OrderStatus,
    pub executed_quantity: Option<Decimal>,
    pub cumulative_quote_quantity: Option<Decimal>,
    pub average_price: Option<Decimal>,
    pub update_time: Option<DateTime<Utc>>,
    pub provenance: OrderProvenance,
}

/// The engine's tracked view of an order: identity, trading fields, mutable
/// state, and strategy provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub client_order_id: Option<ClientOrderId>,
    pub venue: VenueId,
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
    pub status: OrderStatus,
    pub executed_quantity: Decimal,
    pub cumulative_quote_quantity: Decimal,
    pub average_price: Option<Decimal>,
    pub update_time: Option<DateTime<Utc>>,
    pub provenance: OrderProvenance,
}

impl Order {
    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The key used by the engine-wide `OrderCreated` gate: `clientOrderId`
    /// when present, else `id`.
    pub fn created_gate_key(&self) -> &str {
        self.client_order_id
            .as_ref()
            .map(ClientOrderId::as_str)
            .unwrap_or_else(|| self.id.as_str())
    }

    /// Builds (or updates) the tracked `Order` from an incoming `OrderUpdate`,
    /// inheriting `executedQuantity`/`cumulativeQuoteQuantity` from `prior`
    /// when the update omits them, so executed quantity never regresses.
    pub fn from_update(prior: Option<&Order>, update: OrderUpdate) -> Order {
        let executed_quantity = update
            .executed_quantity
            .or_else(|| prior.map(|p| p.executed_quantity))
            .unwrap_or(Decimal::ZERO);
        let cumulative_quote_quantity = update
            .cumulative_quote_quantity
            .or_else(|| prior.map(|p| p.cumulative_quote_quantity))
            .unwrap_or(Decimal::ZERO);

        let mut provenance = update.provenance;
        if let Some(prior) = prior {
            provenance.strategy_id = provenance.strategy_id.or_else(|| prior.provenance.strategy_id.clone());
            provenance.strategy_name = provenance
                .strategy_name
                .or_else(|| prior.provenance.strategy_name.clone());
            provenance.strategy_type = provenance
                .strategy_type
                .or_else(|| prior.provenance.strategy_type.clone());
            provenance.user_id = provenance.user_id.or_else(|| prior.provenance.user_id.clone());
        }

        Order {
            id: update.id,
            client_order_id: update.client_order_id,
            venue: update.venue,
            symbol: update.symbol,
            side: update.side,
            kind: update.kind,
            quantity: update.quantity,
            price: update.price,
            stop_price: update.stop_price,
            time_in_force: update.time_in_force,
            status: update.status,
            executed_quantity,
            cumulative_quote_quantity,
            average_price: update.average_price,
            update_time: update.update_time,
            provenance,
        }
    }
}
