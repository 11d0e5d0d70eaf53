use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::warn;
use vantage_execution::venue::VenueAdapter;
use vantage_instrument::{Symbol, VenueId};
use vantage_integration::{FnvIndexMap, FnvIndexSet};
use vantage_strategy::SubscriptionMethod;

use crate::bus::EventBus;
use crate::error::EngineError;
use crate::events::{EngineEvent, KlineUpdate, OrderBookUpdate, TickerUpdate, TradeUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Ticker,
    OrderBook,
    Trades,
    Klines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ResolvedMethod {
    Push,
    Poll,
}

/// Identifies one upstream subscription: venue, symbol, data family and
/// params. Two requests with different params (e.g. order book depth) are
/// two distinct subscriptions even for the same `(venue, symbol, type)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub venue: VenueId,
    pub symbol: Symbol,
    pub data_type: DataType,
    params: String,
}

impl SubscriptionKey {
    pub fn new(venue: VenueId, symbol: Symbol, data_type: DataType, params: &serde_json::Value) -> Self {
        let params = serde_json::to_string(params).unwrap_or_default();
        Self { venue, symbol, data_type, params }
    }
}

struct SubscriptionRecord {
    strategies: FnvIndexSet<String>,
    method: ResolvedMethod,
    poll_handle: Option<JoinHandle<()>>,
}

#[derive(Debug, Clone, Default)]
pub struct SubscriptionStats {
    pub total: usize,
    pub by_type: Vec<(String, usize)>,
    pub by_method: Vec<(String, usize)>,
    pub by_venue: Vec<(String, usize)>,
}

fn default_cadence(data_type: DataType) -> Duration {
    match data_type {
        DataType::Ticker => Duration::from_secs(5),
        DataType::OrderBook => Duration::from_millis(500),
        DataType::Trades => Duration::from_secs(5),
        DataType::Klines => Duration::from_secs(60),
    }
}

/// Reference-counted map of active subscriptions. Two strategies asking for
/// the same `(venue, symbol, type, params)` share one upstream channel.
pub struct SubscriptionCoordinator {
    bus: Arc<EventBus>,
    venues: Arc<RwLock<FnvIndexMap<VenueId, Arc<dyn VenueAdapter>>>>,
    records: RwLock<FnvIndexMap<SubscriptionKey, SubscriptionRecord>>,
}

impl SubscriptionCoordinator {
    pub fn new(bus: Arc<EventBus>, venues: Arc<RwLock<FnvIndexMap<VenueId, Arc<dyn VenueAdapter>>>>) -> Self {
        Self { bus, venues, records: RwLock::new(FnvIndexMap::default()) }
    }

    pub fn stats(&self) -> SubscriptionStats {
        let records = self.records.read();
        let mut by_type: FnvIndexMap<&str, usize> = FnvIndexMap::default();
        let mut by_method: FnvIndexMap<&str, usize> = FnvIndexMap::default();
        let mut by_venue: FnvIndexMap<String, usize> = FnvIndexMap::default();

        for (key, record) in records.iter() {
            let type_name = match key.data_type {
                DataType::Ticker => "ticker",
                DataType::OrderBook => "orderbook",
                DataType::Trades => "trades",
                DataType::Klines => "klines",
            };
            *by_type.entry(type_name).or_default() += 1;
            let method_name = match record.method {
                ResolvedMethod::Push => "push",
                ResolvedMethod::Poll => "poll",
            };
            *by_method.entry(method_name).or_default() += 1;
            *by_venue.entry(key.venue.to_string()).or_default() += 1;
        }

        SubscriptionStats {
            total: records.len(),
            by_type: by_type.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            by_method: by_method.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            by_venue: by_venue.into_iter().collect(),
        }
    }

    /// Subscribes `strategy_id` to one `(venue, symbol, type, params)` key,
    /// opening the upstream channel on the first subscriber and sharing it
    /// with every later one.
    pub async fn subscribe(
        &self,
        strategy_id: &str,
        venue: &VenueId,
        symbol: &Symbol,
        data_type: DataType,
        params: serde_json::Value,
        method_hint: SubscriptionMethod,
    ) -> Result<(), EngineError> {
        let key = SubscriptionKey::new(venue.clone(), symbol.clone(), data_type, &params);

        if let Some(record) = self.records.write().get_mut(&key) {
            record.strategies.insert(strategy_id.to_string());
            return Ok(());
        }

        let adapter = self
            .venues
            .read()
            .get(venue)
            .cloned()
            .ok_or_else(|| EngineError::NotFound { kind: "venue", name: venue.to_string() })?;

        let method = match method_hint {
            SubscriptionMethod::Push => ResolvedMethod::Push,
            SubscriptionMethod::Poll => ResolvedMethod::Poll,
            SubscriptionMethod::Auto => {
                if adapter.is_connected() {
                    ResolvedMethod::Push
                } else {
                    ResolvedMethod::Poll
                }
            }
        };

        let poll_handle = match method {
            ResolvedMethod::Push => {
                let result = match data_type {
                    DataType::Ticker => adapter.subscribe_to_ticker(symbol).await,
                    DataType::OrderBook => adapter.subscribe_to_order_book(symbol, depth_param(&params)).await,
                    DataType::Trades => adapter.subscribe_to_trades(symbol).await,
                    DataType::Klines => adapter.subscribe_to_klines(symbol, interval_param(&params)).await,
                };
                result.map_err(|err| EngineError::SubscriptionError {
                    venue: venue.to_string(),
                    symbol: symbol.to_string(),
                    message: err.to_string(),
                })?;
                None
            }
            ResolvedMethod::Poll => Some(self.spawn_poller(adapter, venue.clone(), symbol.clone(), data_type, &params)),
        };

        let mut strategies = FnvIndexSet::default();
        strategies.insert(strategy_id.to_string());
        self.records.write().insert(key, SubscriptionRecord { strategies, method, poll_handle });
        Ok(())
    }

    fn spawn_poller(
        &self,
        adapter: Arc<dyn VenueAdapter>,
        venue: VenueId,
        symbol: Symbol,
        data_type: DataType,
        params: &serde_json::Value,
    ) -> JoinHandle<()> {
        let cadence = cadence_param(params).unwrap_or_else(|| default_cadence(data_type));
        let bus = self.bus.clone();
        let depth = depth_param(params);
        let interval_str = interval_param(params).to_string();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cadence);
            loop {
                ticker.tick().await;
                let outcome = match data_type {
                    DataType::Ticker => adapter
                        .get_ticker(&symbol)
                        .await
                        .map(|t| EngineEvent::TickerUpdate(TickerUpdate { venue: venue.clone(), symbol: symbol.clone(), ticker: t })),
                    DataType::OrderBook => adapter
                        .get_order_book(&symbol, depth)
                        .await
                        .map(|b| EngineEvent::OrderBookUpdate(OrderBookUpdate { venue: venue.clone(), symbol: symbol.clone(), book: b })),
                    DataType::Trades => adapter
                        .get_trades(&symbol, 100)
                        .await
                        .map(|t| EngineEvent::TradeUpdate(TradeUpdate { venue: venue.clone(), symbol: symbol.clone(), trades: t })),
                    DataType::Klines => adapter
                        .get_klines(&symbol, &interval_str, 1)
                        .await
                        .map(|k| EngineEvent::KlineUpdate(KlineUpdate { venue: venue.clone(), symbol: symbol.clone(), interval: interval_str.clone(), klines: k })),
                };

                match outcome {
                    Ok(event) => bus.publish(event),
                    Err(err) => warn!(venue = %venue, symbol = %symbol, error = %err, "poll failed, continuing"),
                }
            }
        })
    }

    /// Removes `strategy_id` from one key's subscriber set; on the
    /// decrement that reaches zero, cancels the poller (if any) and drops
    /// the record. Push subscriptions have no venue-side unsubscribe in
    /// [`VenueAdapter`]; the local record is simply dropped.
    pub fn unsubscribe(&self, strategy_id: &str, key: &SubscriptionKey) {
        let mut records = self.records.write();
        let Some(record) = records.get_mut(key) else { return };
        record.strategies.shift_remove(strategy_id);
        if record.strategies.is_empty() {
            if let Some(record) = records.shift_remove(key) {
                if let Some(handle) = record.poll_handle {
                    handle.abort();
                }
            }
        }
    }

    /// Cancels every poller and drops every record. Called on engine stop.
    pub fn clear(&self) {
        let mut records = self.records.write();
        for (_, record) in records.drain(..) {
            if let Some(handle) = record.poll_handle {
                handle.abort();
            }
        }
    }
}

fn depth_param(params: &serde_json::Value) -> u32 {
    params.get("depth").and_then(|v| v.as_u64()).unwrap_or(20) as u32
}

fn interval_param(params: &serde_json::Value) -> &str {
    params.get("interval").and_then(|v| v.as_str()).unwrap_or("1m")
}

fn cadence_param(params: &serde_json::Value) -> Option<Duration> {
    params.get("cadenceMs").and_then(|v| v.as_u64()).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cadences_match_per_family_defaults() {
        assert_eq!(default_cadence(DataType::Ticker), Duration::from_secs(5));
        assert_eq!(default_cadence(DataType::OrderBook), Duration::from_millis(500));
        assert_eq!(default_cadence(DataType::Trades), Duration::from_secs(5));
        assert_eq!(default_cadence(DataType::Klines), Duration::from_secs(60));
    }

    #[test]
    fn distinct_params_produce_distinct_keys() {
        let venue = VenueId::from("binance");
        let symbol: Symbol = "BTC/USDT".parse().unwrap();
        let depth20 = SubscriptionKey::new(venue.clone(), symbol.clone(), DataType::OrderBook, &serde_json::json!({"depth": 20}));
        let depth50 = SubscriptionKey::new(venue, symbol, DataType::OrderBook, &serde_json::json!({"depth": 50}));
        assert_ne!(depth20, depth50);
    }
}
