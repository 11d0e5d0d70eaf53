use std::{collections::VecDeque, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};
use vantage_instrument::{OrderStatus, VenueId};
use vantage_integration::FnvIndexMap;

use crate::{error::ExecutionError, manager::OrderManager, order::Order, venue::VenueAdapter};

/// One reconciled status transition, ready to be published on the event
/// bus. Exactly one is emitted per (order, new-status) pair — the caller is
/// expected to compare against the last-known status before re-publishing.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderSyncEvent {
    Filled(Order),
    PartiallyFilled(Order),
    Cancelled(Order),
    Rejected(Order),
    Expired(Order),
}

impl OrderSyncEvent {
    fn from_status(order: Order) -> Option<Self> {
        match order.status {
            OrderStatus::Filled => Some(Self::Filled(order)),
            OrderStatus::PartiallyFilled => Some(Self::PartiallyFilled(order)),
            OrderStatus::Canceled => Some(Self::Cancelled(order)),
            OrderStatus::Rejected => Some(Self::Rejected(order)),
            OrderStatus::Expired => Some(Self::Expired(order)),
            OrderStatus::New => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncErrorRecord {
    pub venue: VenueId,
    pub order_id: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Read-only counters exposed by the sync service.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    pub total_syncs: u64,
    pub successful_syncs: u64,
    pub failed_syncs: u64,
    pub orders_updated: u64,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub errors: VecDeque<SyncErrorRecord>,
}

/// Periodic reconciliation of open orders against their venues, with
/// de-duplication of status events already observed via push.
pub struct OrderSyncService {
    orders: Arc<RwLock<OrderManager>>,
    venues: FnvIndexMap<VenueId, Arc<dyn VenueAdapter>>,
    batch_size: usize,
    max_error_records: usize,
    stats: RwLock<SyncStats>,
}

impl OrderSyncService {
    pub fn new(
        orders: Arc<RwLock<OrderManager>>,
        venues: FnvIndexMap<VenueId, Arc<dyn VenueAdapter>>,
        batch_size: usize,
    ) -> Self {
        Self {
            orders,
            venues,
            batch_size: batch_size.max(1),
            max_error_records: 50,
            stats: RwLock::new(SyncStats::default()),
        }
    }

    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    /// Runs one reconciliation pass: reads open orders, groups them by
    /// venue, queries authoritative state in batches, and returns the
    /// status-transition events for orders that changed.
    pub async fn tick(&self, now: DateTime<Utc>) -> Vec<OrderSyncEvent> {
        self.bump_total_syncs();

        let open_by_venue: FnvIndexMap<VenueId, Vec<Order>> = {
            let manager = self.orders.read();
            let mut grouped: FnvIndexMap<VenueId, Vec<Order>> = FnvIndexMap::default();
            for order in manager.open_orders() {
                grouped.entry(order.venue.clone()).or_default().push(order.clone());
            }
            grouped
        };

        let mut events = Vec::new();
        let mut any_failure = false;

        for (venue_id, orders) in open_by_venue {
            let Some(adapter) = self.venues.get(&venue_id) else {
                warn!(venue = %venue_id, "no venue adapter registered for order sync");
                continue;
            };

            for batch in orders.chunks(self.batch_size) {
                for prior in batch {
                    match adapter.get_order(&prior.symbol, Some(&prior.id), None).await {
                        Ok(fresh) => {
                            if let Some(event) = self.reconcile(prior, fresh, now) {
                                events.push(event);
                            }
                        }
                        Err(err) => {
                            any_failure = true;
                            self.record_error(venue_id.clone(), prior.id.as_str().to_string(), err, now);
                        }
                    }
                }
            }
        }

        self.finish_tick(now, events.len() as u64, any_failure);
        events
    }

    fn bump_total_syncs(&self) {
        let mut stats = self.stats.write();
        stats.total_syncs += 1;
    }

    fn finish_tick(&self, now: DateTime<Utc>, orders_updated: u64, any_failure: bool) {
        let mut stats = self.stats.write();
        stats.last_sync_time = Some(now);
        stats.orders_updated += orders_updated;
        if any_failure {
            stats.failed_syncs += 1;
        } else {
            stats.successful_syncs += 1;
        }
    }

    fn reconcile(&self, prior: &Order, fresh: Order, now: DateTime<Utc>) -> Option<OrderSyncEvent> {
        let changed = fresh.status != prior.status
            || fresh.executed_quantity != prior.executed_quantity
            || fresh.cumulative_quote_quantity != prior.cumulative_quote_quantity;
        if !changed {
            return None;
        }

        let status_changed = fresh.status != prior.status;
        let mut fresh = fresh;
        fresh.update_time = Some(now);
        self.orders.write().upsert(fresh.clone());

        if status_changed {
            OrderSyncEvent::from_status(fresh)
        } else {
            debug!(order = %fresh.id, "order sync observed a fill delta without a status change");
            None
        }
    }

    fn record_error(&self, venue: VenueId, order_id: String, err: ExecutionError, now: DateTime<Utc>) {
        let mut stats = self.stats.write();
        if stats.errors.len() >= self.max_error_records {
            stats.errors.pop_front();
        }
        stats.errors.push_back(SyncErrorRecord {
            venue,
            order_id,
            message: err.to_string(),
            at: now,
        });
    }
}

/// Minimum sync interval the engine is allowed to configure.
pub const MIN_SYNC_INTERVAL: Duration = Duration::from_secs(1);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderProvenance;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vantage_instrument::{OrderType, Side, Symbol, SymbolInfo, TimeInForce};

    struct StubVenue {
        name: VenueId,
        calls: AtomicUsize,
        respond: OrderStatus,
    }

    #[async_trait]
    impl VenueAdapter for StubVenue {
        fn name(&self) -> &VenueId {
            &self.name
        }
        fn is_connected(&self) -> bool {
            true
        }
        async fn connect(&self, _: crate::venue::VenueCredentials) -> Result<(), ExecutionError> {
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
        async fn get_ticker(&self, _: &Symbol) -> Result<crate::venue::Ticker, ExecutionError> {
            unimplemented!()
        }
        async fn get_order_book(&self, _: &Symbol, _: u32) -> Result<crate::venue::OrderBook, ExecutionError> {
            unimplemented!()
        }
        async fn get_trades(&self, _: &Symbol, _: u32) -> Result<Vec<crate::trade::Trade>, ExecutionError> {
            unimplemented!()
        }
        async fn get_klines(&self, _: &Symbol, _: &str, _: u32) -> Result<Vec<crate::venue::Kline>, ExecutionError> {
            unimplemented!()
        }
        async fn get_symbol_info(&self, _: &Symbol) -> Result<SymbolInfo, ExecutionError> {
            unimplemented!()
        }
        async fn get_positions(&self) -> Result<Vec<crate::position::Position>, ExecutionError> {
            unimplemented!()
        }
        async fn get_balances(&self) -> Result<Vec<crate::balance::AssetBalance>, ExecutionError> {
            unimplemented!()
        }
        async fn get_account_info(&self) -> Result<Vec<crate::balance::Balance>, ExecutionError> {
            unimplemented!()
        }
        async fn get_open_orders(&self, _: Option<&Symbol>) -> Result<Vec<Order>, ExecutionError> {
            unimplemented!()
        }
        async fn get_order(
            &self,
            symbol: &Symbol,
            id: Option<&crate::order::OrderId>,
            _: Option<&crate::order::ClientOrderId>,
        ) -> Result<Order, ExecutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Order {
                id: id.cloned().unwrap(),
                client_order_id: None,
                venue: self.name.clone(),
                symbol: symbol.clone(),
                side: Side::Buy,
                kind: OrderType::Limit,
                quantity: dec!(1),
                price: Some(dec!(100)),
                stop_price: None,
                time_in_force: TimeInForce::Gtc,
                status: self.respond,
                executed_quantity: dec!(1),
                cumulative_quote_quantity: dec!(100),
                average_price: Some(dec!(100)),
                update_time: None,
                provenance: OrderProvenance::default(),
            })
        }
        #[allow(clippy::too_many_arguments)]
        async fn create_order(
            &self,
            _: &Symbol,
            _: Side,
            _: OrderType,
            _: Decimal,
            _: Option<Decimal>,
            _: TimeInForce,
            _: crate::order::ClientOrderId,
            _: crate::venue::OrderOptions,
        ) -> Result<Order, ExecutionError> {
            unimplemented!()
        }
        async fn cancel_order(
            &self,
            _: &Symbol,
            _: Option<&crate::order::OrderId>,
            _: Option<&crate::order::ClientOrderId>,
        ) -> Result<(), ExecutionError> {
            Ok(())
        }
        fn remove_all_listeners(&self) {}
    }

    fn open_order(venue: &str) -> Order {
        Order {
            id: crate::order::OrderId("o1".into()),
            client_order_id: None,
            venue: VenueId::from(venue),
            symbol: "BTC/USDT".parse().unwrap(),
            side: Side::Buy,
            kind: OrderType::Limit,
            quantity: dec!(1),
            price: Some(dec!(100)),
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
            status: OrderStatus::PartiallyFilled,
            executed_quantity: dec!(0.5),
            cumulative_quote_quantity: dec!(50),
            average_price: Some(dec!(100)),
            update_time: None,
            provenance: OrderProvenance::default(),
        }
    }

    #[tokio::test]
    async fn emits_filled_event_when_status_transitions() {
        let manager = Arc::new(RwLock::new(OrderManager::new()));
        manager.write().upsert(open_order("binance"));

        let mut venues = FnvIndexMap::default();
        venues.insert(
            VenueId::from("binance"),
            Arc::new(StubVenue {
                name: VenueId::from("binance"),
                calls: AtomicUsize::new(0),
                respond: OrderStatus::Filled,
            }) as Arc<dyn VenueAdapter>,
        );

        let service = OrderSyncService::new(manager, venues, 5);
        let events = service.tick(Utc::now()).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], OrderSyncEvent::Filled(_)));
        assert_eq!(service.stats().successful_syncs, 1);
    }

    #[tokio::test]
    async fn suppresses_duplicate_status_on_second_tick() {
        let manager = Arc::new(RwLock::new(OrderManager::new()));
        manager.write().upsert(open_order("binance"));

        let mut venues = FnvIndexMap::default();
        venues.insert(
            VenueId::from("binance"),
            Arc::new(StubVenue {
                name: VenueId::from("binance"),
                calls: AtomicUsize::new(0),
                respond: OrderStatus::Filled,
            }) as Arc<dyn VenueAdapter>,
        );

        let service = OrderSyncService::new(manager, venues, 5);
        let first = service.tick(Utc::now()).await;
        assert_eq!(first.len(), 1);

        let second = service.tick(Utc::now()).await;
        assert!(second.is_empty(), "order is now terminal and no longer open, so it drops out of scope");
    }
}
