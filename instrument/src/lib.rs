#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::too_many_arguments)]

//! Core identifiers and trading-rule types shared by every other Vantage crate.
//!
//! This crate owns the data that doesn't belong to any single subsystem: the
//! [`Symbol`] a venue trades, the [`SymbolInfo`] rules that govern how an
//! order against that symbol must be shaped, and the small enums (`Side`,
//! `OrderType`, `TimeInForce`, `OrderStatus`) that appear on every order and
//! every event in the engine.

pub mod order;
pub mod rules;
pub mod side;
pub mod symbol;
pub mod venue;

pub use order::{OrderStatus, OrderType, TimeInForce};
pub use rules::{MarketKind, MarketStatus, SymbolInfo};
pub use side::{PositionSide, Side};
pub use symbol::{Symbol, SymbolParseError};
pub use venue::VenueId;
