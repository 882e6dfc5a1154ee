//! Minor-unit money amounts.
//!
//! Canonical requests carry amounts as an integer count of the currency's
//! minor unit (cents for USD). Gateways want the major-unit decimal form, so
//! [`Amount::to_decimal`] divides by `10^exponent` for the currency.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Currencies without a minor unit.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

/// Currencies whose minor unit is a thousandth.
const THREE_DECIMAL_CURRENCIES: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

/// Returns the ISO-4217 minor-unit exponent for a currency code.
///
/// Unknown codes fall back to 2, which covers the currencies the supported
/// gateways settle in.
#[must_use]
pub fn minor_unit_exponent(currency: &str) -> u32 {
    let code = currency.trim().to_ascii_uppercase();
    if ZERO_DECIMAL_CURRENCIES.contains(&code.as_str()) {
        0
    } else if THREE_DECIMAL_CURRENCIES.contains(&code.as_str()) {
        3
    } else {
        2
    }
}

/// A quantity of money in minor units with its ISO-4217 currency code.
///
/// # Example
///
/// ```rust
/// use tender::amount::Amount;
///
/// let amount = Amount::new(150, "USD");
/// assert_eq!(amount.to_decimal().to_string(), "1.50");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// Number of minor units (e.g. cents).
    pub amount: i64,
    /// ISO-4217 alphabetic currency code, passed to gateways unchanged.
    pub currency: String,
}

impl Amount {
    /// Creates an amount from a minor-unit quantity and a currency code.
    #[must_use]
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Returns the minor-unit exponent of this amount's currency.
    #[must_use]
    pub fn exponent(&self) -> u32 {
        minor_unit_exponent(&self.currency)
    }

    /// Converts to the major-unit decimal, keeping the currency's scale.
    ///
    /// `150 USD` becomes `1.50`, `0 USD` becomes `0.00`.
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.amount, self.exponent())
    }

    /// Converts to the nearest `f64`, for gateways with a float amount field.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.to_decimal().to_f64().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_two_digit_currency() {
        assert_eq!(Amount::new(150, "USD").to_decimal().to_string(), "1.50");
        assert_eq!(Amount::new(100, "USD").to_decimal().to_string(), "1.00");
        assert_eq!(Amount::new(1, "EUR").to_decimal().to_string(), "0.01");
    }

    #[test]
    fn test_to_decimal_zero() {
        assert_eq!(Amount::new(0, "USD").to_decimal().to_string(), "0.00");
    }

    #[test]
    fn test_to_decimal_respects_exponent() {
        assert_eq!(Amount::new(500, "JPY").to_decimal().to_string(), "500");
        assert_eq!(Amount::new(1500, "KWD").to_decimal().to_string(), "1.500");
        assert_eq!(Amount::new(1500, "kwd").exponent(), 3);
    }

    #[test]
    fn test_to_f64() {
        assert!((Amount::new(150, "USD").to_f64() - 1.5).abs() < f64::EPSILON);
        assert!(Amount::new(0, "USD").to_f64().abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_currency_defaults_to_cents() {
        assert_eq!(minor_unit_exponent("ZZZ"), 2);
    }
}
