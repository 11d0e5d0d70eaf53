use chrono::{DateTime, Utc};
use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vantage_instrument::{Side, VenueId};

use crate::order::Order;

/// A fill derived from two successive observations of the same order:
/// quantity and quote-value deltas between the prior and current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct Trade {
    pub order_id: String,
    pub price: Decimal,
    pub quantity: Decimal,
    pub side: Side,
    pub venue: VenueId,
    pub timestamp: DateTime<Utc>,
}

/// Synthesizes a [`Trade`] from the executed-quantity/quote delta between
/// `prior` and `current`, or `None` if nothing filled.
pub fn synthesize_trade(prior: Option<&Order>, current: &Order, now: DateTime<Utc>) -> Option<Trade> {
    let prior_qty = prior.map(|o| o.executed_quantity).unwrap_or(Decimal::ZERO);
    let prior_quote = prior
        .map(|o| o.cumulative_quote_quantity)
        .unwrap_or(Decimal::ZERO);

    let delta_qty = current.executed_quantity - prior_qty;
    if delta_qty <= Decimal::ZERO {
        return None;
    }
    let delta_quote = current.cumulative_quote_quantity - prior_quote;

    let price = if delta_qty.is_zero() {
        current.price.unwrap_or(Decimal::ZERO)
    } else {
        delta_quote / delta_qty
    };

    Some(Trade::new(
        current.id.as_str().to_string(),
        price,
        delta_qty,
        current.side,
        current.venue.clone(),
        now,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderId, OrderProvenance, OrderUpdate};
    use rust_decimal_macros::dec;
    use vantage_instrument::{OrderStatus, OrderType, TimeInForce};

    fn order_at(executed: Decimal, quote: Decimal, status: OrderStatus) -> Order {
        Order::from_update(
            None,
            OrderUpdate {
                id: OrderId("o1".into()),
                client_order_id: None,
                venue: VenueId::from("binance"),
                symbol: "BTC/USDT".parse().unwrap(),
                side: Side::Buy,
                kind: OrderType::Limit,
                quantity: dec!(0.1),
                price: Some(dec!(50000)),
                stop_price: None,
                time_in_force: TimeInForce::Gtc,
                status,
                executed_quantity: Some(executed),
                cumulative_quote_quantity: Some(quote),
                average_price: None,
                update_time: None,
                provenance: OrderProvenance::default(),
            },
        )
    }

    #[test]
    fn synthesizes_trade_for_partial_fill_delta() {
        let prior = order_at(dec!(0), dec!(0), OrderStatus::New);
        let current = order_at(dec!(0.05), dec!(2500), OrderStatus::PartiallyFilled);

        let trade = synthesize_trade(Some(&prior), &current, Utc::now()).unwrap();
        assert_eq!(trade.quantity, dec!(0.05));
        assert_eq!(trade.price, dec!(50000));
    }

    #[test]
    fn no_trade_when_executed_quantity_unchanged() {
        let prior = order_at(dec!(0.05), dec!(2500), OrderStatus::PartiallyFilled);
        let current = order_at(dec!(0.05), dec!(2500), OrderStatus::PartiallyFilled);
        assert!(synthesize_trade(Some(&prior), &current, Utc::now()).is_none());
    }
}
