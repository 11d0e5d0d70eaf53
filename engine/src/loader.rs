use std::sync::Arc;

use tracing::warn;
use vantage_execution::venue::VenueAdapter;
use vantage_instrument::{Symbol, VenueId};
use vantage_integration::FnvIndexMap;
use vantage_strategy::{InitialDataBundle, InitialDataSpec};

/// One-shot prefetch of everything a strategy needs before its first live
/// event: historical bars at every requested interval, current positions
/// filtered to its symbol, open orders, balances, account info, ticker and
/// order book. A missing symbol or initial-data spec yields an empty bundle
/// rather than an error.
pub struct StrategyLoader;

impl StrategyLoader {
    pub async fn load(
        adapter: &Arc<dyn VenueAdapter>,
        venue: &VenueId,
        symbol: Option<&Symbol>,
        spec: Option<&InitialDataSpec>,
    ) -> InitialDataBundle {
        let (Some(symbol), Some(spec)) = (symbol, spec) else {
            return InitialDataBundle::empty();
        };

        let mut bars = FnvIndexMap::default();
        if let Some(limits) = &spec.bars {
            for (interval, limit) in limits.clone().into_pairs() {
                match adapter.get_klines(symbol, &interval, limit).await {
                    Ok(klines) => {
                        bars.insert(interval, klines);
                    }
                    Err(err) => warn!(venue = %venue, symbol = %symbol, interval, error = %err, "initial bar load failed"),
                }
            }
        }

        let positions = adapter
            .get_positions()
            .await
            .map(|positions| positions.into_iter().filter(|p| &p.symbol == symbol).collect())
            .unwrap_or_else(|err| {
                warn!(venue = %venue, symbol = %symbol, error = %err, "initial position load failed");
                Vec::new()
            });

        let open_orders = adapter.get_open_orders(Some(symbol)).await.unwrap_or_else(|err| {
            warn!(venue = %venue, symbol = %symbol, error = %err, "initial open-order load failed");
            Vec::new()
        });

        let balances = adapter.get_balances().await.unwrap_or_else(|err| {
            warn!(venue = %venue, error = %err, "initial balance load failed");
            Vec::new()
        });

        let account = adapter.get_account_info().await.unwrap_or_else(|err| {
            warn!(venue = %venue, error = %err, "initial account load failed");
            Vec::new()
        });

        let ticker = adapter.get_ticker(symbol).await.ok();
        let order_book = adapter.get_order_book(symbol, spec.book_depth_or_default()).await.ok();

        InitialDataBundle {
            symbol: Some(symbol.clone()),
            bars,
            positions,
            open_orders,
            balances,
            account,
            ticker,
            order_book,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_spec_returns_empty_bundle() {
        let adapter: Arc<dyn VenueAdapter> = crate::test_support::noop_venue("binance");
        let symbol: Symbol = "BTC/USDT".parse().unwrap();
        let bundle = StrategyLoader::load(&adapter, &VenueId::from("binance"), Some(&symbol), None).await;
        assert!(bundle.bars.is_empty());
        assert!(bundle.symbol.is_none());
    }
}
