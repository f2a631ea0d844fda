//! Type-safe price representation using decimal arithmetic.
//!
//! Catalog prices are plain decimals in the store's currency unit. A
//! [`Price`] pairs such an amount with its [`CurrencyCode`] for display and
//! for conversion into the minor units payment gateways expect.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paise).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Amount in the currency's minor unit (paise, cents), rounded half-even.
    ///
    /// Returns `None` for negative amounts or amounts that overflow `i64`.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        if self.amount.is_sign_negative() {
            return None;
        }
        let scale = Decimal::from(10_i64.pow(self.currency_code.minor_unit_digits()));
        self.amount.checked_mul(scale)?.round().to_i64()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:.2}", self.currency_code.symbol(), self.amount)
    }
}

/// ISO 4217 currency codes accepted by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    INR,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::INR => "₹",
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// ISO code, as sent to the payment gateway.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::INR => "INR",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// Number of decimal digits in the minor unit.
    #[must_use]
    pub const fn minor_unit_digits(self) -> u32 {
        2
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when a currency code is not supported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported currency code: {0}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INR" => Ok(Self::INR),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(UnknownCurrency(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(4999, 2), CurrencyCode::USD);
        assert_eq!(price.to_string(), "$49.99");

        let price = Price::new(Decimal::from(100), CurrencyCode::INR);
        assert_eq!(price.to_string(), "₹100.00");
    }

    #[test]
    fn test_to_minor_units() {
        let price = Price::new(Decimal::new(12_345, 2), CurrencyCode::INR);
        assert_eq!(price.to_minor_units(), Some(12_345));

        let price = Price::new(Decimal::from(50), CurrencyCode::INR);
        assert_eq!(price.to_minor_units(), Some(5_000));
    }

    #[test]
    fn test_to_minor_units_rejects_negative() {
        let price = Price::new(Decimal::from(-1), CurrencyCode::INR);
        assert_eq!(price.to_minor_units(), None);
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!("inr".parse::<CurrencyCode>().unwrap(), CurrencyCode::INR);
        assert_eq!(" USD ".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("XYZ".parse::<CurrencyCode>().is_err());
    }
}
