use thiserror::Error;
use vantage_execution::ExecutionError;
use vantage_risk::RiskRejected;
use vantage_strategy::StrategyError;

/// Aggregates every subsystem's error into the one type the engine's public
/// API returns, alongside a handful of engine-native failure modes.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("risk rejected: {0}")]
    RiskRejected(#[from] RiskRejected),

    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} `{name}` is already attached")]
    DuplicateName { kind: &'static str, name: String },

    #[error("engine is not running (current state: {state})")]
    EngineNotReady { state: String },

    #[error("subscription error for {venue}/{symbol}: {message}")]
    SubscriptionError {
        venue: String,
        symbol: String,
        message: String,
    },

    #[error("poll error for {venue}/{symbol}: {message}")]
    PollError {
        venue: String,
        symbol: String,
        message: String,
    },
}
