use derive_more::{Constructor, Display};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a venue currently accepts trading against a symbol.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Trading,
    Halt,
    Break,
}

/// Spot vs. perpetual classification of a symbol, independent of the venue.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketKind {
    Spot,
    Perpetual,
}

/// Per-(venue, symbol) trading rules used by the precision gate.
///
/// Every quantity/price the engine sends to a venue must be rounded and
/// validated against these rules before the order leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct SymbolInfo {
    pub min_quantity: Decimal,
    pub max_quantity: Decimal,
    pub step_size: Decimal,
    pub tick_size: Decimal,
    pub min_notional: Decimal,
    pub price_precision: u32,
    pub quantity_precision: u32,
    pub status: MarketStatus,
    pub market: MarketKind,
}

impl SymbolInfo {
    pub fn is_tradable(&self) -> bool {
        matches!(self.status, MarketStatus::Trading)
    }
}
