use rust_decimal::Decimal;
use vantage_instrument::{OrderStatus, Side, Symbol, VenueId};
use vantage_integration::FnvIndexSet;

use crate::order::{Order, OrderId};

/// Total / open / filled / cancelled / rejected counts plus cumulative
/// executed volume and quote value for a slice of orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderStats {
    pub total: usize,
    pub open: usize,
    pub filled: usize,
    pub cancelled: usize,
    pub rejected: usize,
    pub cumulative_executed_volume: Decimal,
    pub cumulative_quote_value: Decimal,
}

/// The process-local, indexed store of every order the engine has observed
/// (by id, symbol, status and venue). All indices are maintained atomically
/// with the primary map: a status/venue/symbol change removes the order
/// from its old index sets and inserts it into the new ones within the same
/// write.
#[derive(Debug, Default)]
pub struct OrderManager {
    orders: indexmap::IndexMap<OrderId, Order, fnv::FnvBuildHasher>,
    by_symbol: indexmap::IndexMap<Symbol, FnvIndexSet<OrderId>, fnv::FnvBuildHasher>,
    by_status: indexmap::IndexMap<OrderStatus, FnvIndexSet<OrderId>, fnv::FnvBuildHasher>,
    by_venue: indexmap::IndexMap<VenueId, FnvIndexSet<OrderId>, fnv::FnvBuildHasher>,
}

impl OrderManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_insert(&mut self, order: &Order) {
        self.by_symbol
            .entry(order.symbol.clone())
            .or_default()
            .insert(order.id.clone());
        self.by_status
            .entry(order.status)
            .or_default()
            .insert(order.id.clone());
        self.by_venue
            .entry(order.venue.clone())
            .or_default()
            .insert(order.id.clone());
    }

    fn index_remove(&mut self, order: &Order) {
        if let Some(set) = self.by_symbol.get_mut(&order.symbol) {
            set.shift_remove(&order.id);
        }
        if let Some(set) = self.by_status.get_mut(&order.status) {
            set.shift_remove(&order.id);
        }
        if let Some(set) = self.by_venue.get_mut(&order.venue) {
            set.shift_remove(&order.id);
        }
    }

    /// Insert a new order, or replace an existing one with the same id,
    /// rebuilding all secondary indices in the same step.
    pub fn upsert(&mut self, order: Order) {
        if let Some(previous) = self.orders.get(&order.id) {
            let previous = previous.clone();
            self.index_remove(&previous);
        }
        self.index_insert(&order);
        self.orders.insert(order.id.clone(), order);
    }

    pub fn get(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn by_symbol(&self, symbol: &Symbol) -> Vec<&Order> {
        self.by_symbol
            .get(symbol)
            .into_iter()
            .flatten()
            .filter_map(|id| self.orders.get(id))
            .collect()
    }

    pub fn by_venue(&self, venue: &VenueId) -> Vec<&Order> {
        self.by_venue
            .get(venue)
            .into_iter()
            .flatten()
            .filter_map(|id| self.orders.get(id))
            .collect()
    }

    pub fn open_orders(&self) -> Vec<&Order> {
        self.orders.values().filter(|o| o.is_open()).collect()
    }

    /// Volume-weighted average fill price across orders of one `(symbol,
    /// side)`, weighted by `executedQuantity`. `None` if nothing has filled.
    pub fn vwap(&self, symbol: &Symbol, side: Side) -> Option<Decimal> {
        let (weighted, volume) = self
            .by_symbol(symbol)
            .into_iter()
            .filter(|o| o.side == side && !o.executed_quantity.is_zero())
            .filter_map(|o| o.average_price.map(|price| (price * o.executed_quantity, o.executed_quantity)))
            .fold((Decimal::ZERO, Decimal::ZERO), |(w, v), (dw, dv)| (w + dw, v + dv));

        if volume.is_zero() {
            None
        } else {
            Some(weighted / volume)
        }
    }

    pub fn stats(&self, symbol: Option<&Symbol>) -> OrderStats {
        let orders: Box<dyn Iterator<Item = &Order>> = match symbol {
            Some(symbol) => Box::new(self.by_symbol(symbol).into_iter()),
            None => Box::new(self.orders.values()),
        };

        let mut stats = OrderStats::default();
        for order in orders {
            stats.total += 1;
            match order.status {
                OrderStatus::New | OrderStatus::PartiallyFilled => stats.open += 1,
                OrderStatus::Filled => stats.filled += 1,
                OrderStatus::Canceled => stats.cancelled += 1,
                OrderStatus::Rejected => stats.rejected += 1,
                OrderStatus::Expired => {}
            }
            stats.cumulative_executed_volume += order.executed_quantity;
            stats.cumulative_quote_value += order.cumulative_quote_quantity;
        }
        stats
    }

    /// Transitions every open order — optionally scoped to `symbol` — to
    /// `CANCELED` locally. Venue-side cancellation is the caller's
    /// responsibility; this only updates the local mirror.
    pub fn cancel_all_orders(&mut self, symbol: Option<&Symbol>) -> Vec<OrderId> {
        let targets: Vec<OrderId> = self
            .orders
            .values()
            .filter(|o| o.is_open())
            .filter(|o| symbol.map_or(true, |s| &o.symbol == s))
            .map(|o| o.id.clone())
            .collect();

        for id in &targets {
            if let Some(order) = self.orders.get(id) {
                let mut updated = order.clone();
                self.index_remove(&updated);
                updated.status = OrderStatus::Canceled;
                self.index_insert(&updated);
                self.orders.insert(id.clone(), updated);
            }
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderProvenance;
    use rust_decimal_macros::dec;
    use vantage_instrument::{OrderType, TimeInForce};

    fn order(id: &str, symbol: &str, status: OrderStatus) -> Order {
        Order {
            id: OrderId(id.into()),
            client_order_id: None,
            venue: VenueId::from("binance"),
            symbol: symbol.parse().unwrap(),
            side: Side::Buy,
            kind: OrderType::Limit,
            quantity: dec!(1),
            price: Some(dec!(100)),
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
            status,
            executed_quantity: dec!(0),
            cumulative_quote_quantity: dec!(0),
            average_price: None,
            update_time: None,
            provenance: OrderProvenance::default(),
        }
    }

    #[test]
    fn indices_move_with_status_change() {
        let mut manager = OrderManager::new();
        manager.upsert(order("o1", "BTC/USDT", OrderStatus::New));
        assert_eq!(manager.open_orders().len(), 1);

        let mut filled = order("o1", "BTC/USDT", OrderStatus::Filled);
        filled.executed_quantity = dec!(1);
        manager.upsert(filled);

        assert_eq!(manager.open_orders().len(), 0);
        assert_eq!(manager.stats(None).filled, 1);
    }

    #[test]
    fn cancel_all_orders_is_scoped_by_symbol() {
        let mut manager = OrderManager::new();
        manager.upsert(order("o1", "BTC/USDT", OrderStatus::New));
        manager.upsert(order("o2", "ETH/USDT", OrderStatus::New));

        let cancelled = manager.cancel_all_orders(Some(&"BTC/USDT".parse().unwrap()));
        assert_eq!(cancelled, vec![OrderId("o1".into())]);
        assert_eq!(manager.get(&OrderId("o2".into())).unwrap().status, OrderStatus::New);
    }
}
