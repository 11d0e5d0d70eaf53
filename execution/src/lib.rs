#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! Order, trade, position and balance types; the venue adapter interface;
//! and the three components that sit between a strategy's decision and a
//! venue's wire: the precision gate, the order manager, and the order sync
//! service.

pub mod balance;
pub mod error;
pub mod manager;
pub mod order;
pub mod position;
pub mod precision;
pub mod sync;
pub mod trade;
pub mod venue;

pub use balance::{AssetBalance, Balance};
pub use error::ExecutionError;
pub use manager::{OrderManager, OrderStats};
pub use order::{ClientOrderId, Order, OrderId, OrderProvenance, OrderUpdate};
pub use position::Position;
pub use precision::PrecisionGate;
pub use sync::{OrderSyncEvent, OrderSyncService, SyncStats};
pub use trade::{synthesize_trade, Trade};
pub use venue::{Kline, OrderBook, OrderBookLevel, OrderOptions, Ticker, VenueAdapter, VenueCredentials};
