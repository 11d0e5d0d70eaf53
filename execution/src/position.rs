use chrono::{DateTime, Utc};
use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vantage_instrument::{PositionSide, Symbol};

/// A strategy's current exposure in one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct Position {
    pub symbol: Symbol,
    pub side: PositionSide,
    pub size: Decimal,
    pub entry_price: Decimal,
    pub mark_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub percentage: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    pub fn is_closed(&self) -> bool {
        self.size.is_zero()
    }
}
