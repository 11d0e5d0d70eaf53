use serde::{Deserialize, Serialize};
use vantage_instrument::{Symbol, VenueId};
use vantage_integration::NoneOneOrMany;

/// How a data subscription's upstream channel is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SubscriptionMethod {
    Push,
    Poll,
    #[default]
    Auto,
}

/// One market-data subscription's configuration: either `false`/absent
/// (not subscribed), `true` (subscribed with defaults), or an object
/// carrying an explicit `enabled` flag and extra params (e.g. kline
/// interval, order book depth).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSubscriptionConfig {
    pub enabled: bool,
    #[serde(default)]
    pub params: serde_json::Value,
}

impl DataSubscriptionConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            params: serde_json::Value::Null,
        }
    }

    pub fn with_params(params: serde_json::Value) -> Self {
        Self {
            enabled: true,
            params,
        }
    }
}

/// `context.subscription`: which of the four data families a strategy
/// wants, each independently configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    #[serde(default)]
    pub ticker: Option<DataSubscriptionConfig>,
    #[serde(default)]
    pub orderbook: Option<DataSubscriptionConfig>,
    #[serde(default)]
    pub trades: Option<DataSubscriptionConfig>,
    #[serde(default)]
    pub klines: Option<DataSubscriptionConfig>,
}

/// Historical-bar request shape for the initial data load: either
/// `{interval: limit}` map form or array-of-pairs form (both accepted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntervalLimits {
    Map(std::collections::BTreeMap<String, u32>),
    Pairs(Vec<(String, u32)>),
}

impl IntervalLimits {
    pub fn into_pairs(self) -> Vec<(String, u32)> {
        match self {
            IntervalLimits::Map(map) => map.into_iter().collect(),
            IntervalLimits::Pairs(pairs) => pairs,
        }
    }
}

/// `context.initialDataConfig`: what the strategy loader should prefetch on
/// attach.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitialDataSpec {
    #[serde(default)]
    pub bars: Option<IntervalLimits>,
    #[serde(default)]
    pub book_depth: Option<u32>,
}

impl InitialDataSpec {
    pub fn book_depth_or_default(&self) -> u32 {
        self.book_depth.unwrap_or(20)
    }
}

/// The identity and wiring a strategy declares to the engine: symbol,
/// venues, subscriptions and initial-data needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyContext {
    pub symbol: Symbol,
    pub venues: NoneOneOrMany<VenueId>,
    #[serde(default)]
    pub subscription: SubscriptionSpec,
    #[serde(default)]
    pub initial_data_config: Option<InitialDataSpec>,
    #[serde(default)]
    pub method: SubscriptionMethod,
}
