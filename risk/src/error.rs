use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal for the order that triggered it: the caller raises this and does
/// not send the order to a venue. Carries the same [`RiskSeverity`] a
/// near-limit warning does, since a breach of a budget-style limit
/// (daily loss, drawdown) is exactly the event that should halt the
/// engine, not just refuse the one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("risk check `{limit}` rejected order: {offered} exceeds limit {threshold}")]
pub struct RiskRejected {
    pub limit: RiskLimitKind,
    pub severity: RiskSeverity,
    pub offered: Decimal,
    pub threshold: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum RiskLimitKind {
    PositionSize,
    DailyLoss,
    Drawdown,
    OpenPositions,
    Leverage,
}

/// Severity of a [`crate::check::RiskLimitExceeded`] event. `Critical`
/// receipt on the event bus triggers engine stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskSeverity {
    Warning,
    Critical,
}
