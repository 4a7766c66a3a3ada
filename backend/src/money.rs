//! Decimal helpers for currency amounts and rates
//!
//! Amounts are stored as NUMERIC(10,2) and rates as NUMERIC(5,2), so every
//! value accepted from a client is checked against those column limits
//! before it reaches the store.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for currency amounts and rates
pub const DECIMAL_PLACES: u32 = 2;

/// Total digits allowed for `nominal_value` and `payment_value`
pub const AMOUNT_MAX_DIGITS: u32 = 10;

/// Total digits allowed for `interest_rate` and `iof_rate`
pub const RATE_MAX_DIGITS: u32 = 5;

/// Round half-to-even to two places and render at scale 2 (`825` -> `825.00`)
pub fn to_currency(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven);
    at_scale(rounded, DECIMAL_PLACES)
}

/// Re-express a value at a fixed scale without changing it numerically.
///
/// Callers must have checked precision first; digits beyond `scale` are
/// rounded away.
pub fn at_scale(mut value: Decimal, scale: u32) -> Decimal {
    value.rescale(scale);
    value
}

/// Check a value against a NUMERIC(max_digits, decimal_places) column.
///
/// Returns the first violation as a client-facing message. Trailing zeros
/// are ignored, so `1000.000` fits NUMERIC(10,2).
pub fn check_precision(value: Decimal, max_digits: u32, decimal_places: u32) -> Option<String> {
    let normalized = value.normalize();
    let decimals = normalized.scale();
    let mantissa_digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
    let digits = mantissa_digits.max(decimals);
    let whole_digits = digits - decimals;
    let max_whole_digits = max_digits - decimal_places;

    if digits > max_digits {
        Some(format!(
            "Ensure that there are no more than {max_digits} digits in total."
        ))
    } else if decimals > decimal_places {
        Some(format!(
            "Ensure that there are no more than {decimal_places} decimal places."
        ))
    } else if whole_digits > max_whole_digits {
        Some(format!(
            "Ensure that there are no more than {max_whole_digits} digits before the decimal point."
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_currency_pads_scale() {
        assert_eq!(to_currency(dec!(825)).to_string(), "825.00");
        assert_eq!(to_currency(dec!(1000.5)).to_string(), "1000.50");
    }

    #[test]
    fn test_to_currency_rounds_half_to_even() {
        assert_eq!(to_currency(dec!(0.125)), dec!(0.12));
        assert_eq!(to_currency(dec!(0.135)), dec!(0.14));
        assert_eq!(to_currency(dec!(-10.005)), dec!(-10.00));
        assert_eq!(to_currency(dec!(1016.6666666)), dec!(1016.67));
    }

    #[test]
    fn test_check_precision_accepts_column_values() {
        assert_eq!(check_precision(dec!(99999999.99), AMOUNT_MAX_DIGITS, DECIMAL_PLACES), None);
        assert_eq!(check_precision(dec!(0.05), RATE_MAX_DIGITS, DECIMAL_PLACES), None);
        assert_eq!(check_precision(dec!(0), RATE_MAX_DIGITS, DECIMAL_PLACES), None);
        assert_eq!(check_precision(dec!(1000.000), AMOUNT_MAX_DIGITS, DECIMAL_PLACES), None);
        assert_eq!(check_precision(dec!(-250), AMOUNT_MAX_DIGITS, DECIMAL_PLACES), None);
    }

    #[test]
    fn test_check_precision_rejects_too_many_decimals() {
        assert_eq!(
            check_precision(dec!(0.055), RATE_MAX_DIGITS, DECIMAL_PLACES).as_deref(),
            Some("Ensure that there are no more than 2 decimal places.")
        );
    }

    #[test]
    fn test_check_precision_rejects_large_whole_part() {
        assert_eq!(
            check_precision(dec!(123456789), AMOUNT_MAX_DIGITS, DECIMAL_PLACES).as_deref(),
            Some("Ensure that there are no more than 8 digits before the decimal point.")
        );
        assert_eq!(
            check_precision(dec!(12345678901), AMOUNT_MAX_DIGITS, DECIMAL_PLACES).as_deref(),
            Some("Ensure that there are no more than 10 digits in total.")
        );
    }
}
