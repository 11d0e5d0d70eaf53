use vantage_execution::{AssetBalance, Balance, Order, Position};
use vantage_instrument::Symbol;
use vantage_integration::FnvIndexMap;

use vantage_execution::venue::{Kline, OrderBook, Ticker};

/// The one-shot prefetch delivered to a strategy via `processInitialData`
/// before any live event reaches it. A missing symbol or initial-data config
/// produces an empty bundle rather than an error.
#[derive(Debug, Clone, Default)]
pub struct InitialDataBundle {
    pub symbol: Option<Symbol>,
    pub bars: FnvIndexMap<String, Vec<Kline>>,
    pub positions: Vec<Position>,
    pub open_orders: Vec<Order>,
    pub balances: Vec<AssetBalance>,
    pub account: Vec<Balance>,
    pub ticker: Option<Ticker>,
    pub order_book: Option<OrderBook>,
}

impl InitialDataBundle {
    pub fn empty() -> Self {
        Self::default()
    }
}
