use parking_lot::RwLock;
use tracing::error;

use crate::events::{
    BalanceUpdate, EmergencyStop, EngineErrorEvent, EngineEvent, EngineStarted, EngineStopped,
    ExchangeConnected, ExchangeDisconnected, ExchangeError, KlineUpdate, OrderBookUpdate,
    PositionUpdate, RiskLimitEvent, StrategySignal, TickerUpdate, TradeUpdate,
};
use vantage_execution::Order;
use vantage_strategy::StrategyError;

type Listener<E> = Box<dyn Fn(&E) + Send + Sync>;

/// One event family's listener registry. Dispatch is synchronous, on the
/// publisher's own call stack: a listener that needs to do real work hands
/// off to its own task rather than blocking every other subscriber.
pub struct Topic<E> {
    listeners: RwLock<Vec<Listener<E>>>,
}

impl<E> Default for Topic<E> {
    fn default() -> Self {
        Self { listeners: RwLock::new(Vec::new()) }
    }
}

impl<E> std::fmt::Debug for Topic<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Topic").field("listeners", &self.listeners.read().len()).finish()
    }
}

impl<E> Topic<E> {
    /// Registers a listener. There is no cap on how many can accumulate;
    /// a busy topic with hundreds of strategies attached is expected, not
    /// an edge case.
    pub fn subscribe(&self, listener: impl Fn(&E) + Send + Sync + 'static) {
        self.listeners.write().push(Box::new(listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn publish(&self, event: &E) {
        for listener in self.listeners.read().iter() {
            listener(event);
        }
    }
}

/// The engine-wide pub/sub hub. Every event family gets its own strongly
/// typed topic; [`EventBus::all`] additionally receives every event,
/// flattened into [`EngineEvent`], for listeners that want one feed.
#[derive(Debug, Default)]
pub struct EventBus {
    pub ticker: Topic<TickerUpdate>,
    pub orderbook: Topic<OrderBookUpdate>,
    pub trades: Topic<TradeUpdate>,
    pub klines: Topic<KlineUpdate>,
    pub order_created: Topic<Order>,
    pub order_filled: Topic<Order>,
    pub order_partially_filled: Topic<Order>,
    pub order_cancelled: Topic<Order>,
    pub order_rejected: Topic<Order>,
    pub balance_update: Topic<BalanceUpdate>,
    pub position_update: Topic<PositionUpdate>,
    pub strategy_signal: Topic<StrategySignal>,
    pub strategy_error: Topic<StrategyError>,
    pub risk_limit_exceeded: Topic<RiskLimitEvent>,
    pub emergency_stop: Topic<EmergencyStop>,
    pub engine_started: Topic<EngineStarted>,
    pub engine_stopped: Topic<EngineStopped>,
    pub engine_error: Topic<EngineErrorEvent>,
    pub exchange_connected: Topic<ExchangeConnected>,
    pub exchange_disconnected: Topic<ExchangeDisconnected>,
    pub exchange_error: Topic<ExchangeError>,
    all: Topic<EngineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener against every event family at once.
    pub fn subscribe_all(&self, listener: impl Fn(&EngineEvent) + Send + Sync + 'static) {
        self.all.subscribe(listener);
    }

    /// Publishes on the event's own typed topic, then fans it out again on
    /// the aggregate feed. Errors raised by a log subscriber never stop the
    /// rest from receiving the event; a panicking listener is the caller's
    /// bug, not the bus's to guard against.
    pub fn publish(&self, event: EngineEvent) {
        match &event {
            EngineEvent::TickerUpdate(e) => self.ticker.publish(e),
            EngineEvent::OrderBookUpdate(e) => self.orderbook.publish(e),
            EngineEvent::TradeUpdate(e) => self.trades.publish(e),
            EngineEvent::KlineUpdate(e) => self.klines.publish(e),
            EngineEvent::OrderCreated(e) => self.order_created.publish(e),
            EngineEvent::OrderFilled(e) => self.order_filled.publish(e),
            EngineEvent::OrderPartiallyFilled(e) => self.order_partially_filled.publish(e),
            EngineEvent::OrderCancelled(e) => self.order_cancelled.publish(e),
            EngineEvent::OrderRejected(e) => self.order_rejected.publish(e),
            EngineEvent::BalanceUpdate(e) => self.balance_update.publish(e),
            EngineEvent::PositionUpdate(e) => self.position_update.publish(e),
            EngineEvent::StrategySignal(e) => self.strategy_signal.publish(e),
            EngineEvent::StrategyError(e) => {
                error!(strategy = %e.strategy_name, message = %e.message, "strategy error");
                self.strategy_error.publish(e);
            }
            EngineEvent::RiskLimitExceeded(e) => self.risk_limit_exceeded.publish(e),
            EngineEvent::EmergencyStop(e) => self.emergency_stop.publish(e),
            EngineEvent::EngineStarted(e) => self.engine_started.publish(e),
            EngineEvent::EngineStopped(e) => self.engine_stopped.publish(e),
            EngineEvent::EngineError(e) => self.engine_error.publish(e),
            EngineEvent::ExchangeConnected(e) => self.exchange_connected.publish(e),
            EngineEvent::ExchangeDisconnected(e) => self.exchange_disconnected.publish(e),
            EngineEvent::ExchangeError(e) => self.exchange_error.publish(e),
        }
        self.all.publish(&event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn supports_many_listeners_on_one_topic() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..128 {
            let hits = hits.clone();
            bus.engine_started.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        bus.publish(EngineEvent::EngineStarted(EngineStarted));
        assert_eq!(hits.load(Ordering::SeqCst), 128);
    }

    #[test]
    fn aggregate_feed_receives_every_family() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits2 = hits.clone();
        bus.subscribe_all(move |_| {
            hits2.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(EngineEvent::EngineStarted(EngineStarted));
        bus.publish(EngineEvent::EngineStopped(EngineStopped));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
