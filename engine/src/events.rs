use chrono::{DateTime, Utc};
use derive_more::From;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vantage_execution::venue::{Kline, OrderBook, Ticker};
use vantage_execution::{AssetBalance, Balance, Order, Position, Trade};
use vantage_instrument::{Symbol, VenueId};
use vantage_risk::RiskLimitExceeded;
use vantage_strategy::StrategyError;

/// A market data update for one `(venue, symbol)` pair, tagged with the
/// family so a generic listener can still dispatch on the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerUpdate {
    pub venue: VenueId,
    pub symbol: Symbol,
    pub ticker: Ticker,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookUpdate {
    pub venue: VenueId,
    pub symbol: Symbol,
    pub book: OrderBook,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeUpdate {
    pub venue: VenueId,
    pub symbol: Symbol,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KlineUpdate {
    pub venue: VenueId,
    pub symbol: Symbol,
    pub interval: String,
    pub klines: Vec<Kline>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BalanceUpdate {
    pub venue: VenueId,
    pub balances: Vec<AssetBalance>,
    pub account: Vec<Balance>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub venue: VenueId,
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategySignal {
    pub strategy_id: Option<String>,
    pub strategy_name: String,
    pub decision: vantage_strategy::Decision,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskLimitEvent {
    pub strategy_name: Option<String>,
    pub exceeded: RiskLimitExceeded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmergencyStop {
    pub reason: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineStarted;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineStopped;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineErrorEvent {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeConnected {
    pub venue: VenueId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeDisconnected {
    pub venue: VenueId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeError {
    pub venue: VenueId,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNotional(pub Decimal);

/// Every event family the engine publishes, flattened into one tagged union
/// so a catch-all listener can subscribe once via [`crate::bus::EventBus::subscribe_all`]
/// while a targeted listener still registers per-topic.
#[derive(Debug, Clone, PartialEq, From)]
pub enum EngineEvent {
    TickerUpdate(TickerUpdate),
    OrderBookUpdate(OrderBookUpdate),
    TradeUpdate(TradeUpdate),
    KlineUpdate(KlineUpdate),
    OrderCreated(Order),
    #[from(skip)]
    OrderFilled(Order),
    #[from(skip)]
    OrderPartiallyFilled(Order),
    #[from(skip)]
    OrderCancelled(Order),
    #[from(skip)]
    OrderRejected(Order),
    BalanceUpdate(BalanceUpdate),
    PositionUpdate(PositionUpdate),
    StrategySignal(StrategySignal),
    StrategyError(StrategyError),
    RiskLimitExceeded(RiskLimitEvent),
    EmergencyStop(EmergencyStop),
    EngineStarted(EngineStarted),
    EngineStopped(EngineStopped),
    EngineError(EngineErrorEvent),
    ExchangeConnected(ExchangeConnected),
    ExchangeDisconnected(ExchangeDisconnected),
    ExchangeError(ExchangeError),
}
