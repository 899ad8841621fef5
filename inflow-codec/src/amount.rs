//! Decimal token amounts and their fixed-point integer units
//!
//! `units = decimal × 10^decimals`. Conversions work on the decimal string
//! directly so no floating point is ever involved.

use num_bigint::BigUint;

use crate::{CodecError, Result};

/// Parse a decimal string into integer units, truncating fractional digits
/// beyond `decimals`.
///
/// `"100.50"` at 6 decimals is `100_500_000`; `"1.1234567"` becomes
/// `1_123_456` (the seventh digit is dropped, not rounded).
pub fn parse_decimal_to_units(decimal: &str, decimals: u8) -> Result<BigUint> {
    let (whole, frac) = split_decimal(decimal)?;
    let frac = &frac[..frac.len().min(decimals as usize)];
    digits_to_units(whole, frac, decimals)
}

/// Like [`parse_decimal_to_units`] but rejects amounts with more than
/// `decimals` fractional digits.
pub fn parse_decimal_to_units_strict(decimal: &str, decimals: u8) -> Result<BigUint> {
    let (whole, frac) = split_decimal(decimal)?;
    if frac.len() > decimals as usize {
        return Err(CodecError::TooManyDecimalPlaces {
            amount: decimal.to_string(),
            decimals,
        });
    }
    digits_to_units(whole, frac, decimals)
}

/// Format integer units as a decimal string with exactly `decimals`
/// fractional digits.
pub fn format_units_to_decimal(units: &BigUint, decimals: u8) -> String {
    let digits = units.to_str_radix(10);
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    format!("{whole}.{frac}")
}

/// Strip trailing fractional zeros: `"100.500000"` → `"100.5"`, `"7.000"` → `"7"`.
pub fn normalize_decimal(decimal: &str) -> String {
    match decimal.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => decimal.to_string(),
    }
}

fn split_decimal(decimal: &str) -> Result<(&str, &str)> {
    let decimal = decimal.trim();
    if decimal.is_empty() {
        return Err(CodecError::InvalidAmount("empty amount".to_string()));
    }

    let (whole, frac) = decimal.split_once('.').unwrap_or((decimal, ""));

    if whole.is_empty() && frac.is_empty() {
        return Err(CodecError::InvalidAmount(format!("no digits: {decimal}")));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidAmount(format!("invalid whole part: {whole}")));
    }
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidAmount(format!("invalid fractional part: {frac}")));
    }

    Ok((whole, frac))
}

fn digits_to_units(whole: &str, frac: &str, decimals: u8) -> Result<BigUint> {
    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(frac);
    digits.extend(std::iter::repeat('0').take(decimals as usize - frac.len()));

    if digits.is_empty() {
        return Ok(BigUint::default());
    }

    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| CodecError::InvalidAmount(format!("not a number: {digits}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn units(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_amount_parsing() {
        assert_eq!(parse_decimal_to_units("100.50", 6).unwrap(), units(100_500_000));
        assert_eq!(parse_decimal_to_units("100", 6).unwrap(), units(100_000_000));
        assert_eq!(parse_decimal_to_units("0.000001", 6).unwrap(), units(1));
        assert_eq!(parse_decimal_to_units(".5", 6).unwrap(), units(500_000));
        assert_eq!(parse_decimal_to_units("7.", 6).unwrap(), units(7_000_000));
        assert_eq!(parse_decimal_to_units("0", 6).unwrap(), units(0));
    }

    #[test]
    fn test_excess_precision_truncates() {
        assert_eq!(parse_decimal_to_units("1.1234567", 6).unwrap(), units(1_123_456));
        assert_eq!(parse_decimal_to_units("1.9999999", 6).unwrap(), units(1_999_999));
    }

    #[test]
    fn test_strict_rejects_excess_precision() {
        let err = parse_decimal_to_units_strict("12.1234567", 6).unwrap_err();
        assert_eq!(
            err,
            CodecError::TooManyDecimalPlaces {
                amount: "12.1234567".to_string(),
                decimals: 6
            }
        );
        assert_eq!(parse_decimal_to_units_strict("12.123456", 6).unwrap(), units(12_123_456));
    }

    #[test]
    fn test_malformed_amounts() {
        for bad in ["", ".", "abc", "1.2.3", "-1", "1e6", "1,5", " . "] {
            assert!(parse_decimal_to_units(bad, 6).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(format_units_to_decimal(&units(100_500_000), 6), "100.500000");
        assert_eq!(format_units_to_decimal(&units(1), 6), "0.000001");
        assert_eq!(format_units_to_decimal(&units(0), 6), "0.000000");
        assert_eq!(format_units_to_decimal(&units(42), 0), "42");
    }

    #[test]
    fn test_beyond_u128() {
        let big = "340282366920938463463374607431768211456.5";
        let parsed = parse_decimal_to_units(big, 6).unwrap();
        assert_eq!(
            format_units_to_decimal(&parsed, 6),
            "340282366920938463463374607431768211456.500000"
        );
    }

    #[test]
    fn test_normalize_decimal() {
        assert_eq!(normalize_decimal("100.500000"), "100.5");
        assert_eq!(normalize_decimal("100.000000"), "100");
        assert_eq!(normalize_decimal("100"), "100");
        assert_eq!(normalize_decimal("0.000001"), "0.000001");
    }

    proptest! {
        #[test]
        fn prop_format_parse_roundtrip(whole in 0u64..10_000_000_000, frac in "[0-9]{0,6}") {
            let decimal = if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            };

            let parsed = parse_decimal_to_units(&decimal, 6).unwrap();
            let formatted = format_units_to_decimal(&parsed, 6);

            prop_assert_eq!(normalize_decimal(&formatted), normalize_decimal(&decimal));
            prop_assert_eq!(parse_decimal_to_units(&formatted, 6).unwrap(), parsed);
        }
    }
}
