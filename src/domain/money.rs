use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A gross price as reported by the gateway.
///
/// The currency is carried through untouched; the client never converts
/// between currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: Decimal,
    pub currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Price of `quantity` units at this unit price.
    pub fn times(&self, quantity: u32) -> Decimal {
        self.amount * Decimal::from(quantity)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.currency, self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_times() {
        let price = Money::new(dec!(499.50), "INR");
        assert_eq!(price.times(3), dec!(1498.50));
        assert_eq!(price.times(0), Decimal::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::new(dec!(1000), "INR").to_string(), "INR 1000.00");
    }

    #[test]
    fn test_deserialize_from_gateway_number() {
        let money: Money = serde_json::from_str(r#"{"amount": 500.0, "currency": "INR"}"#).unwrap();
        assert_eq!(money.amount, dec!(500));
        assert_eq!(money.currency, "INR");
    }
}
