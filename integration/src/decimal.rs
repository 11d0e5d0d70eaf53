use rust_decimal::Decimal;

/// Round `value` down to the nearest exact multiple of `step`, truncating
/// toward zero (floor on positive values).
///
/// `step == 0` is treated as "no step constraint" and `value` is returned
/// unchanged — callers fall back to [`round_to_precision`] in that case.
pub fn round_to_step(value: Decimal, step: Decimal) -> Decimal {
    if step.is_zero() {
        return value;
    }
    (value / step).trunc() * step
}

/// Round `value` to `precision` decimal places, truncating toward zero.
pub fn round_to_precision(value: Decimal, precision: u32) -> Decimal {
    value.trunc_with_scale(precision)
}

/// Round a quantity: `step_size` takes precedence over `precision` when
/// non-zero.
pub fn round_with_step_or_precision(value: Decimal, step: Decimal, precision: u32) -> Decimal {
    if step.is_zero() {
        round_to_precision(value, precision)
    } else {
        round_to_step(value, step)
    }
}

/// `true` iff `value` is a non-negative exact multiple of `step`.
pub fn is_multiple_of(value: Decimal, step: Decimal) -> bool {
    if step.is_zero() {
        return true;
    }
    value >= Decimal::ZERO && (value % step).is_zero()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_quantity_down_to_step() {
        assert_eq!(round_to_step(dec!(0.00049), dec!(0.001)), dec!(0.000));
        assert_eq!(round_to_step(dec!(1.2345), dec!(0.01)), dec!(1.23));
    }

    #[test]
    fn zero_step_falls_back_unchanged() {
        assert_eq!(round_to_step(dec!(1.2345), dec!(0)), dec!(1.2345));
    }

    #[test]
    fn rounding_is_idempotent() {
        let once = round_with_step_or_precision(dec!(1.23456), dec!(0.01), 2);
        let twice = round_with_step_or_precision(once, dec!(0.01), 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn precision_fallback_when_step_is_zero() {
        assert_eq!(round_with_step_or_precision(dec!(1.2399), dec!(0), 2), dec!(1.23));
    }

    #[test]
    fn multiple_of_checks_step() {
        assert!(is_multiple_of(dec!(0.02), dec!(0.01)));
        assert!(!is_multiple_of(dec!(0.025), dec!(0.01)));
        assert!(!is_multiple_of(dec!(-0.01), dec!(0.01)));
    }
}
