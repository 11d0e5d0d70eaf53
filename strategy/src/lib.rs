#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::too_many_arguments)]

//! The pluggable side of the engine: the [`Strategy`] trait every strategy
//! implements, the [`Decision`] tagged union `analyze` returns, and the
//! context/descriptor/bundle types the engine uses to wire a strategy up.

pub mod bundle;
pub mod context;
pub mod decision;
pub mod descriptor;
pub mod error;

use async_trait::async_trait;
use vantage_execution::{venue::{Kline, OrderBook, Ticker}, AssetBalance, Order, Position, Trade};
use vantage_instrument::{Symbol, VenueId};
use vantage_integration::NoneOneOrMany;

pub use bundle::InitialDataBundle;
pub use context::{DataSubscriptionConfig, IntervalLimits, InitialDataSpec, StrategyContext, SubscriptionMethod, SubscriptionSpec};
pub use decision::{CancelIntent, Decision, OrderIntent, UpdateIntent};
pub use descriptor::{StrategyDescriptor, StrategyPerformance};
pub use error::StrategyError;

/// One inbound event handed to `analyze`, carrying both the payload and the
/// venue/symbol it was observed on.
#[derive(Debug, Clone)]
pub enum AnalyzeInput {
    Ticker { venue: VenueId, symbol: Symbol, ticker: Ticker },
    OrderBook { venue: VenueId, symbol: Symbol, book: OrderBook },
    Trades { venue: VenueId, symbol: Symbol, trades: Vec<Trade> },
    Klines { venue: VenueId, symbol: Symbol, interval: String, klines: Vec<Kline> },
    Orders { venue: VenueId, orders: Vec<Order> },
    Balances { venue: VenueId, balances: Vec<AssetBalance> },
    Positions { venue: VenueId, positions: Vec<Position> },
}

/// The interface the engine drives every attached strategy through.
/// Implementations analyze one event at a time and return zero or more
/// decisions; everything else is an optional hook with a no-op default.
#[async_trait]
pub trait Strategy: Send + Sync {
    fn descriptor(&self) -> &StrategyDescriptor;

    async fn analyze(&mut self, input: AnalyzeInput) -> Result<NoneOneOrMany<Decision>, StrategyError>;

    async fn process_initial_data(&mut self, _bundle: InitialDataBundle) {}

    async fn on_order_created(&mut self, _order: &Order) {}

    async fn on_order_filled(&mut self, _order: &Order) {}

    async fn on_trade_executed(&mut self, _trade: &Trade) {}

    async fn cleanup(&mut self) {}

    fn performance(&self) -> StrategyPerformance {
        StrategyPerformance::default()
    }

    fn strategy_id(&self) -> Option<&str> {
        self.descriptor().strategy_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SubscriptionSpec;
    use async_trait::async_trait;

    struct HoldStrategy(StrategyDescriptor);

    #[async_trait]
    impl Strategy for HoldStrategy {
        fn descriptor(&self) -> &StrategyDescriptor {
            &self.0
        }

        async fn analyze(&mut self, _input: AnalyzeInput) -> Result<NoneOneOrMany<Decision>, StrategyError> {
            Ok(Decision::Hold.into())
        }
    }

    fn descriptor() -> StrategyDescriptor {
        StrategyDescriptor {
            strategy_type: "hold".into(),
            strategy_name: "hold-1".into(),
            strategy_id: Some("1".into()),
            user_id: None,
            context: StrategyContext {
                symbol: "BTC/USDT".parse().unwrap(),
                venues: VenueId::from("binance").into(),
                subscription: SubscriptionSpec::default(),
                initial_data_config: None,
                method: SubscriptionMethod::Auto,
            },
        }
    }

    #[tokio::test]
    async fn default_hooks_are_no_ops_and_analyze_returns_a_decision() {
        let mut strategy = HoldStrategy(descriptor());
        strategy.process_initial_data(InitialDataBundle::empty()).await;
        strategy.cleanup().await;

        let decisions = strategy
            .analyze(AnalyzeInput::Ticker {
                venue: VenueId::from("binance"),
                symbol: "BTC/USDT".parse().unwrap(),
                ticker: Ticker {
                    symbol: "BTC/USDT".parse().unwrap(),
                    price: Default::default(),
                    volume: Default::default(),
                    timestamp: chrono::Utc::now(),
                },
            })
            .await
            .unwrap();

        assert_eq!(decisions.into_vec(), vec![Decision::Hold]);
    }
}
