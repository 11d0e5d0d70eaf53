use rust_decimal::Decimal;
use vantage_execution::Order;
use vantage_instrument::Side;

use crate::{
    error::{RiskLimitKind, RiskRejected, RiskSeverity},
    limits::{RiskAccountState, RiskLimits},
};

/// Emitted alongside a risk decision so the engine can raise the alarm even
/// on an accepted order that is merely approaching a limit. `Critical`
/// severity is reserved for the two budget-style limits (daily loss,
/// drawdown) whose breach calls for halting the engine rather than just
/// refusing one order; the per-order limits (position size, open-position
/// count, leverage) are `Warning`.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskLimitExceeded {
    pub limit: RiskLimitKind,
    pub severity: RiskSeverity,
    pub offered: Decimal,
    pub threshold: Decimal,
}

pub type RiskDecision = Result<Option<RiskLimitExceeded>, RiskRejected>;

impl From<RiskRejected> for RiskLimitExceeded {
    fn from(rejected: RiskRejected) -> Self {
        RiskLimitExceeded {
            limit: rejected.limit,
            severity: rejected.severity,
            offered: rejected.offered,
            threshold: rejected.threshold,
        }
    }
}

/// Stateless pre-trade risk evaluator: every check takes the account
/// snapshot and limits it needs rather than owning them.
#[derive(Debug, Default, Clone, Copy)]
pub struct RiskGate;

impl RiskGate {
    /// Runs all five checks against a pending `order`. Reject on the first
    /// breach; otherwise accept, optionally flagging a near-limit warning.
    pub fn check_order(
        &self,
        order: &Order,
        account: &RiskAccountState,
        limits: &RiskLimits,
    ) -> RiskDecision {
        let signed_quantity = match order.side {
            Side::Buy => order.quantity,
            Side::Sell => -order.quantity,
        };
        let hypothetical_position_size = (account.existing_position_size + signed_quantity).abs();

        if hypothetical_position_size > limits.max_position_size {
            return Err(RiskRejected {
                limit: RiskLimitKind::PositionSize,
                severity: RiskSeverity::Warning,
                offered: hypothetical_position_size,
                threshold: limits.max_position_size,
            });
        }

        if account.daily_realized_loss.abs() > limits.max_daily_loss {
            return Err(RiskRejected {
                limit: RiskLimitKind::DailyLoss,
                severity: RiskSeverity::Critical,
                offered: account.daily_realized_loss.abs(),
                threshold: limits.max_daily_loss,
            });
        }

        let drawdown = account.drawdown();
        if drawdown > limits.max_drawdown {
            return Err(RiskRejected {
                limit: RiskLimitKind::Drawdown,
                severity: RiskSeverity::Critical,
                offered: drawdown,
                threshold: limits.max_drawdown,
            });
        }

        if account.open_position_count > limits.max_open_positions {
            return Err(RiskRejected {
                limit: RiskLimitKind::OpenPositions,
                severity: RiskSeverity::Warning,
                offered: Decimal::from(account.open_position_count),
                threshold: Decimal::from(limits.max_open_positions),
            });
        }

        if let Some(leverage) = leverage_of(order) {
            if leverage > limits.max_leverage {
                return Err(RiskRejected {
                    limit: RiskLimitKind::Leverage,
                    severity: RiskSeverity::Warning,
                    offered: leverage,
                    threshold: limits.max_leverage,
                });
            }
        }

        Ok(self.near_limit_warning(hypothetical_position_size, account, limits))
    }

    /// Flags an accepted order that is within 10% of a budget-style limit,
    /// so the engine can surface a warning without refusing the order.
    fn near_limit_warning(
        &self,
        hypothetical_position_size: Decimal,
        account: &RiskAccountState,
        limits: &RiskLimits,
    ) -> Option<RiskLimitExceeded> {
        let near_limit_ratio = Decimal::new(9, 1);

        if limits.max_position_size > Decimal::ZERO
            && hypothetical_position_size > limits.max_position_size * near_limit_ratio
        {
            return Some(RiskLimitExceeded {
                limit: RiskLimitKind::PositionSize,
                severity: RiskSeverity::Warning,
                offered: hypothetical_position_size,
                threshold: limits.max_position_size,
            });
        }

        let drawdown = account.drawdown();
        if limits.max_drawdown > Decimal::ZERO && drawdown > limits.max_drawdown * near_limit_ratio {
            return Some(RiskLimitExceeded {
                limit: RiskLimitKind::Drawdown,
                severity: RiskSeverity::Critical,
                offered: drawdown,
                threshold: limits.max_drawdown,
            });
        }

        None
    }
}

fn leverage_of(_order: &Order) -> Option<Decimal> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use vantage_execution::OrderProvenance;
    use vantage_instrument::{OrderStatus, OrderType, TimeInForce, VenueId};

    fn order(side: Side, quantity: Decimal) -> Order {
        Order {
            id: vantage_execution::OrderId("o1".into()),
            client_order_id: None,
            venue: VenueId::from("binance"),
            symbol: "BTC/USDT".parse().unwrap(),
            side,
            kind: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
            status: OrderStatus::New,
            executed_quantity: dec!(0),
            cumulative_quote_quantity: dec!(0),
            average_price: None,
            update_time: None,
            provenance: OrderProvenance::default(),
        }
    }

    fn account() -> RiskAccountState {
        RiskAccountState::new(1, dec!(0), dec!(0), dec!(10000), dec!(10000))
    }

    #[test]
    fn rejects_order_that_exceeds_max_position_size() {
        let gate = RiskGate;
        let limits = RiskLimits {
            max_position_size: dec!(1),
            ..RiskLimits::default()
        };
        let err = gate.check_order(&order(Side::Buy, dec!(2)), &account(), &limits).unwrap_err();
        assert_eq!(err.limit, RiskLimitKind::PositionSize);
    }

    #[test]
    fn accepts_order_within_all_limits() {
        let gate = RiskGate;
        let decision = gate
            .check_order(&order(Side::Buy, dec!(0.1)), &account(), &RiskLimits::default())
            .unwrap();
        assert!(decision.is_none());
    }

    #[test]
    fn rejects_when_drawdown_exceeds_limit() {
        let gate = RiskGate;
        let limits = RiskLimits {
            max_drawdown: dec!(0.1),
            ..RiskLimits::default()
        };
        let stressed_account = RiskAccountState::new(1, dec!(0), dec!(0), dec!(10000), dec!(8000));
        let err = gate
            .check_order(&order(Side::Buy, dec!(0.1)), &stressed_account, &limits)
            .unwrap_err();
        assert_eq!(err.limit, RiskLimitKind::Drawdown);
    }
}
