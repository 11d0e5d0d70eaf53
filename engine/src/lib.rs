#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::too_many_arguments)]

//! Ties the other five Vantage crates together into a running engine:
//! lifecycle management, the event bus, subscription coordination, the
//! symbol-info cache, the strategy loader and the order pipeline.

pub mod bus;
pub mod engine;
pub mod error;
pub mod events;
pub mod loader;
pub mod logging;
pub mod state;
pub mod subscription;
pub mod symbol_cache;

#[cfg(test)]
mod test_support;

pub use bus::{EventBus, Topic};
pub use engine::TradingEngine;
pub use error::EngineError;
pub use events::EngineEvent;
pub use loader::StrategyLoader;
pub use logging::init_tracing;
pub use state::EngineState;
pub use subscription::{DataType, SubscriptionCoordinator, SubscriptionStats};
pub use symbol_cache::SymbolInfoCache;
