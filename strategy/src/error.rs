use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Caught per strategy per event; published as `StrategyError` and isolated
/// from every other attached strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("strategy `{strategy_name}` failed: {message}")]
pub struct StrategyError {
    pub strategy_name: String,
    pub message: String,
}

impl StrategyError {
    pub fn new(strategy_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            message: message.into(),
        }
    }
}
