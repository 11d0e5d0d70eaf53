use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The five limits the gate evaluates on every order: position size after
/// hypothetical fill, daily realized-loss budget, current drawdown, number
/// of open positions, and leverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Constructor)]
pub struct RiskLimits {
    pub max_position_size: Decimal,
    pub max_daily_loss: Decimal,
    pub max_drawdown: Decimal,
    pub max_open_positions: usize,
    pub max_leverage: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_position_size: Decimal::MAX,
            max_daily_loss: Decimal::MAX,
            max_drawdown: Decimal::ONE,
            max_open_positions: usize::MAX,
            max_leverage: Decimal::MAX,
        }
    }
}

/// The account-level figures a limit check is evaluated against. The gate
/// itself holds no state; the caller supplies a fresh snapshot per check.
#[derive(Debug, Clone, Constructor)]
pub struct RiskAccountState {
    pub open_position_count: usize,
    pub existing_position_size: Decimal,
    pub daily_realized_loss: Decimal,
    pub peak_equity: Decimal,
    pub current_equity: Decimal,
}

impl RiskAccountState {
    pub fn drawdown(&self) -> Decimal {
        if self.peak_equity.is_zero() {
            Decimal::ZERO
        } else {
            (self.peak_equity - self.current_equity) / self.peak_equity
        }
    }
}
