#![warn(
    unused,
    clippy::cognitive_complexity,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::too_many_arguments)]

//! Pre-trade risk evaluation, sitting between the precision gate and a
//! venue call in the order pipeline. The gate itself holds no state — the
//! engine supplies a fresh account snapshot on every check.

pub mod check;
pub mod error;
pub mod limits;

pub use check::{RiskDecision, RiskGate, RiskLimitExceeded};
pub use error::{RiskLimitKind, RiskRejected, RiskSeverity};
pub use limits::{RiskAccountState, RiskLimits};
