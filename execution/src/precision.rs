use rust_decimal::Decimal;
use vantage_instrument::{OrderType, SymbolInfo};
use vantage_integration::decimal::{is_multiple_of, round_to_precision, round_to_step};

use crate::error::ExecutionError;

/// Rounds and validates quantity/price against per-symbol lot, tick and
/// notional rules before an order reaches a venue. Stateless:
/// every method takes the rules it needs rather than caching them — the
/// freshness/TTL concern belongs to the symbol-info cache upstream.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrecisionGate;

impl PrecisionGate {
    /// Rounds toward zero to the nearest exact multiple of `step_size`,
    /// falling back to `quantity_precision` decimal places when
    /// `step_size == 0`.
    pub fn round_quantity(&self, quantity: Decimal, step_size: Decimal, quantity_precision: u32) -> Decimal {
        if step_size.is_zero() {
            round_to_precision(quantity, quantity_precision)
        } else {
            round_to_step(quantity, step_size)
        }
    }

    pub fn round_price(&self, price: Decimal, tick_size: Decimal, price_precision: u32) -> Decimal {
        if tick_size.is_zero() {
            round_to_precision(price, price_precision)
        } else {
            round_to_step(price, tick_size)
        }
    }

    /// A quantity is valid iff it is a non-negative exact multiple of its
    /// step and within `[min, max]`.
    pub fn validate_quantity(&self, quantity: Decimal, rules: &SymbolInfo) -> Result<(), ExecutionError> {
        if quantity < rules.min_quantity {
            return Err(ExecutionError::invalid_order(
                "quantity",
                quantity,
                format!("minQuantity {}", rules.min_quantity),
            ));
        }
        if rules.max_quantity > Decimal::ZERO && quantity > rules.max_quantity {
            return Err(ExecutionError::invalid_order(
                "quantity",
                quantity,
                format!("maxQuantity {}", rules.max_quantity),
            ));
        }
        if !is_multiple_of(quantity, rules.step_size) {
            return Err(ExecutionError::invalid_order(
                "quantity",
                quantity,
                format!("stepSize {}", rules.step_size),
            ));
        }
        Ok(())
    }

    /// Price must be strictly positive and a multiple of the tick size.
    pub fn validate_price(&self, price: Decimal, rules: &SymbolInfo) -> Result<(), ExecutionError> {
        if price <= Decimal::ZERO {
            return Err(ExecutionError::invalid_order("price", price, "strictly positive"));
        }
        if !is_multiple_of(price, rules.tick_size) {
            return Err(ExecutionError::invalid_order(
                "price",
                price,
                format!("tickSize {}", rules.tick_size),
            ));
        }
        Ok(())
    }

    /// Notional is `quantity * price`; must be `>= minNotional`.
    pub fn validate_notional(&self, quantity: Decimal, price: Decimal, rules: &SymbolInfo) -> Result<(), ExecutionError> {
        let notional = quantity * price;
        if notional < rules.min_notional {
            return Err(ExecutionError::invalid_order(
                "notional",
                notional,
                format!("minNotional {}", rules.min_notional),
            ));
        }
        Ok(())
    }

    /// Convenience wrapper applying the full order-pipeline rounding and
    /// validation sequence: round
    /// quantity, validate it, and — if a price is supplied — round and
    /// validate price and notional. Returns the rounded `(quantity, price)`.
    pub fn validate_order(
        &self,
        kind: OrderType,
        quantity: Decimal,
        price: Option<Decimal>,
        rules: &SymbolInfo,
    ) -> Result<(Decimal, Option<Decimal>), ExecutionError> {
        let rounded_quantity = self.round_quantity(quantity, rules.step_size, rules.quantity_precision);
        self.validate_quantity(rounded_quantity, rules)?;

        let rounded_price = match price {
            Some(price) if kind.requires_price() || kind.requires_stop_price() || price > Decimal::ZERO => {
                let rounded = self.round_price(price, rules.tick_size, rules.price_precision);
                self.validate_price(rounded, rules)?;
                self.validate_notional(rounded_quantity, rounded, rules)?;
                Some(rounded)
            }
            _ => None,
        };

        Ok((rounded_quantity, rounded_price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use vantage_instrument::MarketKind;

    fn rules() -> SymbolInfo {
        SymbolInfo::new(
            dec!(0.001),
            dec!(0),
            dec!(0.001),
            dec!(0.01),
            dec!(10),
            2,
            3,
            vantage_instrument::MarketStatus::Trading,
            MarketKind::Spot,
        )
    }

    #[test]
    fn rejects_quantity_rounded_below_minimum() {
        let gate = PrecisionGate::default();
        let (quantity, _) = gate.validate_order(OrderType::Limit, dec!(0.00049), Some(dec!(50000)), &rules()).unwrap_or((dec!(0), None));
        assert_eq!(quantity, dec!(0));
        assert!(gate.validate_quantity(quantity, &rules()).is_err());
    }

    #[test]
    fn accepts_well_formed_limit_order() {
        let gate = PrecisionGate::default();
        let (quantity, price) = gate
            .validate_order(OrderType::Limit, dec!(0.01), Some(dec!(50000)), &rules())
            .unwrap();
        assert_eq!(quantity, dec!(0.01));
        assert_eq!(price, Some(dec!(50000)));
    }

    #[test]
    fn rounding_is_idempotent() {
        let gate = PrecisionGate::default();
        let once = gate.round_quantity(dec!(1.23456), dec!(0.001), 3);
        let twice = gate.round_quantity(once, dec!(0.001), 3);
        assert_eq!(once, twice);
    }
}
