//! Rounding and display helpers for emitted records.
//!
//! Records keep numeric values; percentage and p-value fields are turned into
//! strings only when serialized.

use serde::Serializer;

/// Round to a fixed number of decimal places.
///
/// Exact halfway cases go to the even digit, so `0.0625` becomes `0.062`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Format with two mantissa decimals and a signed, two-digit exponent,
/// e.g. `1.23e-05`.
pub fn scientific(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let raw = format!("{:.2e}", value);
    match raw.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exp.abs())
        }
        None => raw,
    }
}

/// Render a fraction as a percentage string, e.g. `0.1234` -> `12.34%`.
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub(crate) fn serialize_scientific<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&scientific(*value))
}

pub(crate) fn serialize_percent<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&percent(*value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(-0.0004, 3), 0.0);
        assert_eq!(round_to(12.345678, 2), 12.35);
    }

    #[test]
    fn test_round_to_ties_even() {
        assert_eq!(round_to(0.0625, 3), 0.062);
        assert_eq!(round_to(0.375, 2), 0.38);
        assert_eq!(round_to(-2.5, 0), -2.0);
    }

    #[test]
    fn test_scientific() {
        assert_eq!(scientific(0.00001234), "1.23e-05");
        assert_eq!(scientific(0.5), "5.00e-01");
        assert_eq!(scientific(0.0), "0.00e+00");
        assert_eq!(scientific(1234.0), "1.23e+03");
        assert_eq!(scientific(1e-120), "1.00e-120");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.1234), "12.34%");
        assert_eq!(percent(-0.05), "-5.00%");
    }
}
