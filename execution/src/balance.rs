use chrono::{DateTime, Utc};
use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `{asset, free, locked, total}` with `total = free + locked`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Constructor,
)]
pub struct Balance {
    pub free: Decimal,
    pub locked: Decimal,
}

impl Balance {
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Constructor)]
pub struct AssetBalance {
    pub asset: String,
    pub balance: Balance,
    pub time_exchange: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_is_free_plus_locked() {
        let balance = Balance::new(dec!(10), dec!(2.5));
        assert_eq!(balance.total(), dec!(12.5));
    }
}
