use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::context::StrategyContext;

/// Opaque identity plus wiring for one attached strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDescriptor {
    pub strategy_type: String,
    pub strategy_name: String,
    pub strategy_id: Option<String>,
    pub user_id: Option<String>,
    pub context: StrategyContext,
}

/// What `getPerformance()` reports back to the engine for debounced
/// persistence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyPerformance {
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub trade_count: u64,
    pub win_count: u64,
    pub loss_count: u64,
}
