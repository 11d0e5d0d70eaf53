use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vantage_instrument::VenueId;

/// Errors surfaced while validating or routing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum ExecutionError {
    #[error("invalid order: field `{field}` offered {offered} but requires {requirement}")]
    InvalidOrder {
        field: String,
        offered: Decimal,
        requirement: String,
    },

    #[error("venue `{venue}` call failed: {message}")]
    VenueError { venue: VenueId, message: String },

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("reconciliation failed for order `{order_id}` on venue `{venue}`: {message}")]
    SyncError {
        venue: VenueId,
        order_id: String,
        message: String,
    },
}

impl ExecutionError {
    pub fn invalid_order(
        field: impl Into<String>,
        offered: Decimal,
        requirement: impl Into<String>,
    ) -> Self {
        Self::InvalidOrder {
            field: field.into(),
            offered,
            requirement: requirement.into(),
        }
    }
}
