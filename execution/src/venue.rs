use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use vantage_instrument::{OrderType, Side, Symbol, SymbolInfo, TimeInForce, VenueId};

use crate::{
    balance::{AssetBalance, Balance},
    error::ExecutionError,
    order::{ClientOrderId, Order, OrderId},
    position::Position,
    trade::Trade,
};

/// A price/volume/timestamp snapshot for a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticker {
    pub symbol: Symbol,
    pub price: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookLevel {
    pub price: Decimal,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBook {
    pub symbol: Symbol,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kline {
    pub symbol: Symbol,
    pub interval: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Credentials handed to [`VenueAdapter::connect`]; opaque to the engine.
#[derive(Debug, Clone, Default)]
pub struct VenueCredentials {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

/// Extra, venue-specific hints for order placement, e.g. margin trade
/// mode or leverage.
#[derive(Debug, Clone, Default)]
pub struct OrderOptions {
    pub trade_mode: Option<String>,
    pub leverage: Option<Decimal>,
}

/// The interface the engine drives a connected trading venue through.
/// Implementations speak a specific venue's wire protocol; the engine only
/// ever sees this shape.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    fn name(&self) -> &VenueId;

    fn is_connected(&self) -> bool;

    async fn connect(&self, credentials: VenueCredentials) -> Result<(), ExecutionError>;

    async fn subscribe_to_user_data(&self) -> Result<(), ExecutionError>;

    async fn subscribe_to_ticker(&self, symbol: &Symbol) -> Result<(), ExecutionError>;

    async fn subscribe_to_order_book(&self, symbol: &Symbol, depth: u32) -> Result<(), ExecutionError>;

    async fn subscribe_to_trades(&self, symbol: &Symbol) -> Result<(), ExecutionError>;

    async fn subscribe_to_klines(&self, symbol: &Symbol, interval: &str) -> Result<(), ExecutionError>;

    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker, ExecutionError>;

    async fn get_order_book(&self, symbol: &Symbol, depth: u32) -> Result<OrderBook, ExecutionError>;

    async fn get_trades(&self, symbol: &Symbol, limit: u32) -> Result<Vec<Trade>, ExecutionError>;

    async fn get_klines(&self, symbol: &Symbol, interval: &str, limit: u32) -> Result<Vec<Kline>, ExecutionError>;

    async fn get_symbol_info(&self, symbol: &Symbol) -> Result<SymbolInfo, ExecutionError>;

    async fn get_positions(&self) -> Result<Vec<Position>, ExecutionError>;

    async fn get_balances(&self) -> Result<Vec<AssetBalance>, ExecutionError>;

    async fn get_account_info(&self) -> Result<Vec<Balance>, ExecutionError>;

    async fn get_open_orders(&self, symbol: Option<&Symbol>) -> Result<Vec<Order>, ExecutionError>;

    async fn get_order(
        &self,
        symbol: &Symbol,
        id: Option<&OrderId>,
        client_order_id: Option<&ClientOrderId>,
    ) -> Result<Order, ExecutionError>;

    #[allow(clippy::too_many_arguments)]
    async fn create_order(
        &self,
        symbol: &Symbol,
        side: Side,
        kind: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
        time_in_force: TimeInForce,
        client_order_id: ClientOrderId,
        options: OrderOptions,
    ) -> Result<Order, ExecutionError>;

    async fn cancel_order(
        &self,
        symbol: &Symbol,
        id: Option<&OrderId>,
        client_order_id: Option<&ClientOrderId>,
    ) -> Result<(), ExecutionError>;

    fn remove_all_listeners(&self);
}
