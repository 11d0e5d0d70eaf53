use derive_more::{Constructor, Display, From};
use serde::{Deserialize, Serialize};

/// A venue's unique name within the engine.
#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Display, From, Constructor, Serialize, Deserialize,
)]
pub struct VenueId(pub String);

impl VenueId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VenueId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
