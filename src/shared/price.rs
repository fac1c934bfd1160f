//! Price formatting for human-readable display.
//!
//! All display rounding goes through `round_to_string`: two decimal places,
//! round-half-to-even (banker's rounding). The same rounding feeds the
//! price-change colour so a displayed `0.00` never carries a sign colour.

use crate::error::InvalidValue;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Round a `Decimal` to two decimal places (half-to-even) and render it as
/// a fixed 2-decimal string.
pub fn round_to_string(value: Decimal) -> String {
    // round_dp uses MidpointNearestEven; {:.2} then only pads zeros.
    format!("{:.2}", value.round_dp(2))
}

/// Parse a numeric string into a `Decimal`.
pub fn parse_decimal(input: &str) -> Result<Decimal, InvalidValue> {
    Decimal::from_str(input.trim()).map_err(|_| InvalidValue {
        input: input.to_string(),
    })
}

/// Coerce a numeric string and format it like `round_to_string`.
///
/// Non-numeric input fails with `InvalidValue` rather than rendering a
/// placeholder — a malformed number reaching the formatter is a
/// data-integrity error, not a display state.
pub fn format_price(input: &str) -> Result<String, InvalidValue> {
    parse_decimal(input).map(round_to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_to_string(dec("0.125")), "0.12");
        assert_eq!(round_to_string(dec("0.135")), "0.14");
        assert_eq!(round_to_string(dec("2.675")), "2.68");
    }

    #[test]
    fn test_round_pads_to_two_decimals() {
        assert_eq!(round_to_string(dec("123.123")), "123.12");
        assert_eq!(round_to_string(dec("0.978")), "0.98");
        assert_eq!(round_to_string(dec("5")), "5.00");
        assert_eq!(round_to_string(dec("0.1")), "0.10");
    }

    #[test]
    fn test_round_negative_values() {
        assert_eq!(round_to_string(dec("-1.005")), "-1.00");
        assert_eq!(round_to_string(dec("-15.456")), "-15.46");
    }

    #[test]
    fn test_parse_decimal_accepts_numeric_strings() {
        assert_eq!(parse_decimal("42"), Ok(dec("42")));
        assert_eq!(parse_decimal(" 0.5 "), Ok(dec("0.5")));
        assert_eq!(parse_decimal("-3.14"), Ok(dec("-3.14")));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        let err = parse_decimal("not-a-price").unwrap_err();
        assert_eq!(err.input, "not-a-price");
        assert!(parse_decimal("").is_err());
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price("123.456").unwrap(), "123.46");
        assert!(format_price("12x").is_err());
    }
}
