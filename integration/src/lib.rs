#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! Low-level utilities with no trading semantics of their own, shared by
//! every other Vantage crate: decimal rounding, fast collections, a
//! one-or-many helper for strategy decision normalisation, and a debounced
//! task scheduler used for strategy performance persistence.

/// Arbitrary-precision decimal rounding, toward zero, used by the precision
/// gate and nowhere else re-implemented.
pub mod decimal;

/// Fast collection type aliases.
pub mod collection;

/// A debounced action scheduler, keyed by an arbitrary id.
pub mod debounce;

/// Collections that represent "exactly one or many" / "none, one, or many".
pub mod none_one_or_many;

/// Trait that communicates if something is terminal (eg/ requires shutdown).
pub trait Terminal {
    fn is_terminal(&self) -> bool;
}

pub use collection::{FnvIndexMap, FnvIndexSet};
pub use debounce::Debouncer;
pub use none_one_or_many::NoneOneOrMany;
