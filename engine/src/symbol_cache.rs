use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::warn;
use vantage_execution::venue::VenueAdapter;
use vantage_instrument::{Symbol, SymbolInfo, VenueId};
use vantage_integration::FnvIndexMap;

use crate::error::EngineError;

/// How long a cached [`SymbolInfo`] is trusted before a refresh is due.
pub const SYMBOL_INFO_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    rules: SymbolInfo,
    fetched_at: DateTime<Utc>,
}

/// Caches per-`(venue, symbol)` trading rules with a 30 minute TTL. A failed
/// refresh falls back to the stale value when one exists, and only
/// propagates the error when there is nothing to fall back on.
#[derive(Default)]
pub struct SymbolInfoCache {
    entries: RwLock<FnvIndexMap<(VenueId, Symbol), CacheEntry>>,
}

impl SymbolInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(
        &self,
        adapter: &Arc<dyn VenueAdapter>,
        venue: &VenueId,
        symbol: &Symbol,
        now: DateTime<Utc>,
    ) -> Result<SymbolInfo, EngineError> {
        let key = (venue.clone(), symbol.clone());

        if let Some(entry) = self.entries.read().get(&key) {
            let age = now.signed_duration_since(entry.fetched_at);
            if age.to_std().map(|age| age < SYMBOL_INFO_TTL).unwrap_or(false) {
                return Ok(entry.rules.clone());
            }
        }

        match adapter.get_symbol_info(symbol).await {
            Ok(rules) => {
                self.entries.write().insert(key, CacheEntry { rules: rules.clone(), fetched_at: now });
                Ok(rules)
            }
            Err(err) => {
                if let Some(entry) = self.entries.read().get(&key) {
                    warn!(venue = %venue, symbol = %symbol, error = %err, "symbol info refresh failed, serving stale value");
                    Ok(entry.rules.clone())
                } else {
                    Err(EngineError::SubscriptionError {
                        venue: venue.to_string(),
                        symbol: symbol.to_string(),
                        message: err.to_string(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use vantage_execution::ExecutionError;

    struct FlakyVenue {
        name: VenueId,
        calls: AtomicUsize,
        fail_after_first: bool,
    }

    #[async_trait]
    impl VenueAdapter for FlakyVenue {
        fn name(&self) -> &VenueId {
            &self.name
        }
        fn is_connected(&self) -> bool {
            true
        }
        async fn connect(&self, _: vantage_execution::venue::VenueCredentials) -> Result<(), ExecutionError> {
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
        async fn get_ticker(&self, _: &Symbol) -> Result<vantage_execution::venue::Ticker, ExecutionError> {
            unimplemented!()
        }
        async fn get_order_book(&self, _: &Symbol, _: u32) -> Result<vantage_execution::venue::OrderBook, ExecutionError> {
            unimplemented!()
        }
        async fn get_trades(&self, _: &Symbol, _: u32) -> Result<Vec<vantage_execution::Trade>, ExecutionError> {
            unimplemented!()
        }
        async fn get_klines(&self, _: &Symbol, _: &str, _: u32) -> Result<Vec<vantage_execution::venue::Kline>, ExecutionError> {
            unimplemented!()
        }
        async fn get_symbol_info(&self, _: &Symbol) -> Result<SymbolInfo, ExecutionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_after_first && call > 0 {
                Err(ExecutionError::VenueError { venue: self.name.clone(), message: "down".into() })
            } else {
                Ok(SymbolInfo::new(
                    dec!(0.001),
                    dec!(0),
                    dec!(0.001),
                    dec!(0.01),
                    dec!(10),
                    2,
                    3,
                    vantage_instrument::MarketStatus::Trading,
                    vantage_instrument::MarketKind::Spot,
                ))
            }
        }
        async fn get_positions(&self) -> Result<Vec<vantage_execution::Position>, ExecutionError> {
            unimplemented!()
        }
        async fn get_balances(&self) -> Result<Vec<vantage_execution::AssetBalance>, ExecutionError> {
            unimplemented!()
        }
        async fn get_account_info(&self) -> Result<Vec<vantage_execution::Balance>, ExecutionError> {
            unimplemented!()
        }
        async fn get_open_orders(&self, _: Option<&Symbol>) -> Result<Vec<vantage_execution::Order>, ExecutionError> {
            unimplemented!()
        }
        async fn get_order(
            &self,
            _: &Symbol,
            _: Option<&vantage_execution::OrderId>,
            _: Option<&vantage_execution::ClientOrderId>,
        ) -> Result<vantage_execution::Order, ExecutionError> {
            unimplemented!()
        }
        #[allow(clippy::too_many_arguments)]
        async fn create_order(
            &self,
            _: &Symbol,
            _: vantage_instrument::Side,
            _: vantage_instrument::OrderType,
            _: rust_decimal::Decimal,
            _: Option<rust_decimal::Decimal>,
            _: vantage_instrument::TimeInForce,
            _: vantage_execution::ClientOrderId,
            _: vantage_execution::venue::OrderOptions,
        ) -> Result<vantage_execution::Order, ExecutionError> {
            unimplemented!()
        }
        async fn cancel_order(
            &self,
            _: &Symbol,
            _: Option<&vantage_execution::OrderId>,
            _: Option<&vantage_execution::ClientOrderId>,
        ) -> Result<(), ExecutionError> {
            Ok(())
        }
        fn remove_all_listeners(&self) {}
    }

    #[tokio::test]
    async fn falls_back_to_stale_value_on_refresh_failure() {
        let cache = SymbolInfoCache::new();
        let adapter: Arc<dyn VenueAdapter> = Arc::new(FlakyVenue {
            name: VenueId::from("binance"),
            calls: AtomicUsize::new(0),
            fail_after_first: true,
        });
        let venue = VenueId::from("binance");
        let symbol: Symbol = "BTC/USDT".parse().unwrap();
        let now = Utc::now();

        let first = cache.get(&adapter, &venue, &symbol, now).await.unwrap();

        let later = now + chrono::Duration::minutes(31);
        let second = cache.get(&adapter, &venue, &symbol, later).await.unwrap();
        assert_eq!(first, second);
    }
}
