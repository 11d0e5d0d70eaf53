//! Shared stub [`VenueAdapter`] for unit tests across this crate's modules.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use vantage_execution::venue::{Kline, OrderBook, OrderOptions, Ticker, VenueAdapter, VenueCredentials};
use vantage_execution::{AssetBalance, Balance, ClientOrderId, ExecutionError, Order, OrderId, Position, Trade};
use vantage_instrument::{MarketKind, MarketStatus, OrderType, Side, Symbol, SymbolInfo, TimeInForce, VenueId};

pub struct NoopVenue {
    pub name: VenueId,
    pub connected: bool,
}

#[async_trait]
impl VenueAdapter for NoopVenue {
    fn name(&self) -> &VenueId {
        &self.name
    }
    fn is_connected(&self) -> bool {
        self.connected
    }
    async fn connect(&self, _: VenueCredentials) -> Result<(), ExecutionError> {
        Ok(())
    }
    async fn subscribe_to_user_data(&self) -> Result<(), ExecutionError> {
        Ok(())
    }
    async fn subscribe_to_ticker(&self, _: &Symbol) -> Result<(), ExecutionError> {
        Ok(())
    }
    async fn subscribe_to_order_book(&self, _: &Symbol, _: u32) -> Result<(), ExecutionError> {
        Ok(())
    }
    async fn subscribe_to_trades(&self, _: &Symbol) -> Result<(), ExecutionError> {
        Ok(())
    }
    async fn subscribe_to_klines(&self, _: &Symbol, _: &str) -> Result<(), ExecutionError> {
        Ok(())
    }
    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker, ExecutionError> {
        Ok(Ticker { symbol: symbol.clone(), price: dec!(100), volume: dec!(1), timestamp: chrono::Utc::now() })
    }
    async fn get_order_book(&self, symbol: &Symbol, _: u32) -> Result<OrderBook, ExecutionError> {
        Ok(OrderBook { symbol: symbol.clone(), bids: Vec::new(), asks: Vec::new(), timestamp: chrono::Utc::now() })
    }
    async fn get_trades(&self, _: &Symbol, _: u32) -> Result<Vec<Trade>, ExecutionError> {
        Ok(Vec::new())
    }
    async fn get_klines(&self, _: &Symbol, _: &str, _: u32) -> Result<Vec<Kline>, ExecutionError> {
        Ok(Vec::new())
    }
    async fn get_symbol_info(&self, _: &Symbol) -> Result<SymbolInfo, ExecutionError> {
        Ok(SymbolInfo::new(dec!(0.001), dec!(0), dec!(0.001), dec!(0.01), dec!(10), 2, 3, MarketStatus::Trading, MarketKind::Spot))
    }
    async fn get_positions(&self) -> Result<Vec<Position>, ExecutionError> {
        Ok(Vec::new())
    }
    async fn get_balances(&self) -> Result<Vec<AssetBalance>, ExecutionError> {
        Ok(Vec::new())
    }
    async fn get_account_info(&self) -> Result<Vec<Balance>, ExecutionError> {
        Ok(Vec::new())
    }
    async fn get_open_orders(&self, _: Option<&Symbol>) -> Result<Vec<Order>, ExecutionError> {
        Ok(Vec::new())
    }
    async fn get_order(&self, _: &Symbol, _: Option<&OrderId>, _: Option<&ClientOrderId>) -> Result<Order, ExecutionError> {
        Err(ExecutionError::OrderNotFound("not found".into()))
    }
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
        _: OrderOptions,
    ) -> Result<Order, ExecutionError> {
        Ok(Order {
            id: OrderId(format!("generated-{}", client_order_id.as_str())),
            client_order_id: Some(client_order_id),
            venue: self.name.clone(),
            symbol: symbol.clone(),
            side,
            kind,
            quantity,
            price,
            stop_price: None,
            time_in_force,
            status: vantage_instrument::OrderStatus::New,
            executed_quantity: dec!(0),
            cumulative_quote_quantity: dec!(0),
            average_price: None,
            update_time: None,
            provenance: vantage_execution::OrderProvenance::default(),
        })
    }
    async fn cancel_order(&self, _: &Symbol, _: Option<&OrderId>, _: Option<&ClientOrderId>) -> Result<(), ExecutionError> {
        Ok(())
    }
    fn remove_all_listeners(&self) {}
}

pub fn noop_venue(name: &str) -> Arc<dyn VenueAdapter> {
    Arc::new(NoopVenue { name: VenueId::from(name), connected: true })
}
