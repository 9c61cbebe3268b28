//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::define_kind;

/// Amount of money in some [`Currency`].
///
/// Amounts are never rounded implicitly: fractions produced by taxes and
/// discounts are kept as is.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a new [`Money`] amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero [`Money`] amount in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Indicates whether this [`Money`] amount is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Sums this [`Money`] with the `other` one.
    ///
    /// [`None`] if the [`Currency`]s differ or the sum overflows.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        Some(Self::new(self.amount.checked_add(other.amount)?, self.currency))
    }

    /// Multiplies this [`Money`] by the provided `factor`.
    ///
    /// [`None`] if the product overflows.
    #[must_use]
    pub fn checked_mul(self, factor: Decimal) -> Option<Self> {
        Some(Self::new(self.amount.checked_mul(factor)?, self.currency))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        match amount.normalize() {
            a if a.is_integer() => match a.to_i128() {
                Some(i) => write!(f, "{i}{currency}"),
                None => write!(f, "{a}{currency}"),
            },
            a => write!(f, "{a}{currency}"),
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .len()
            .checked_sub(3)
            .filter(|&at| at > 0 && s.is_char_boundary(at))
            .ok_or("too short")?;
        let (amount, currency) = s.split_at(split);

        Ok(Self::new(
            Decimal::from_str(amount).map_err(|_| "invalid amount")?,
            Currency::from_str(currency).map_err(|_| "invalid currency")?,
        ))
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "US Dollar."]
        Usd = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Vietnamese Dong."]
        Vnd = 3,
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money in `{amount}{currency}` format, where:
    /// - `amount` is a decimal number, like `350000` or `12.5`;
    /// - `currency` is a three-letter currency code, like `VND`.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            let s = input.as_string_value().ok_or_else(|| {
                format!("Cannot parse `Money` from non-string value: {input}")
            })?;
            Self::from_str(s)
                .map_err(|e| format!("Cannot parse `Money` from `{s}`: {e}"))
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn vnd(s: &str) -> Money {
        Money::new(s.parse().unwrap(), Currency::Vnd)
    }

    #[test]
    fn parses_amount_with_currency() {
        assert_eq!(Money::from_str("350000VND").unwrap(), vnd("350000"));
        assert_eq!(
            Money::from_str("12.5USD").unwrap(),
            Money::new(Decimal::new(125, 1), Currency::Usd),
        );
        assert_eq!(Money::from_str("-1EUR").unwrap().currency, Currency::Eur);

        for invalid in ["", "VND", "350000", "12.5Us", "12.5Dong", "abcUSD"] {
            assert!(Money::from_str(invalid).is_err(), "{invalid}");
        }
    }

    #[test]
    fn formats_without_trailing_zeros() {
        assert_eq!(vnd("350000").to_string(), "350000VND");
        assert_eq!(vnd("350000.00").to_string(), "350000VND");
        assert_eq!(vnd("386.10").to_string(), "386.1VND");
        assert_eq!(Money::zero(Currency::Usd).to_string(), "0USD");
    }

    #[test]
    fn multiplies_by_factor() {
        assert_eq!(
            vnd("350000").checked_mul(Decimal::from(3)),
            Some(vnd("1050000")),
        );
        assert_eq!(vnd("100").checked_mul(Decimal::new(1, 1)), Some(vnd("10")));
        assert_eq!(
            Money::new(Decimal::MAX, Currency::Vnd).checked_mul(Decimal::TWO),
            None,
        );
    }

    #[test]
    fn adds_same_currency_only() {
        assert_eq!(vnd("1.5").checked_add(vnd("2")), Some(vnd("3.5")));
        assert_eq!(
            vnd("1").checked_add(Money::zero(Currency::Usd)),
            None,
        );
    }

    #[test]
    fn detects_negative_amount() {
        assert!(vnd("-0.01").is_negative());
        assert!(!vnd("0").is_negative());
    }
}
