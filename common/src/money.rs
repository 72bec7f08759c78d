//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::define_kind;

/// Number of decimal places [`Money`] amounts are rounded to.
pub const SCALE: u32 = 2;

/// Rounds the provided `amount` to [`SCALE`] decimal places.
///
/// Midpoints are rounded away from zero, so `0.125` becomes `0.13`.
#[must_use]
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Money {
    /// Amount of this [`Money`].
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a new [`Money`] of the provided `amount` in `currency`.
    #[must_use]
    pub const fn new(amount: Decimal, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Creates a zero [`Money`] in the provided [`Currency`].
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    /// Returns this [`Money`] with its amount [`round`]ed to [`SCALE`] decimal
    /// places.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self::new(round(self.amount), self.currency)
    }

    /// Indicates whether the amount of this [`Money`] is below zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        match amount.is_integer().then(|| amount.to_i128()).flatten() {
            Some(int) => write!(f, "{int}{currency}"),
            None => write!(f, "{amount}{currency}"),
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 || !s.is_char_boundary(s.len() - 3) {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

impl Money {
    /// Multiplies the amount of this [`Money`] by the provided `rhs`.
    ///
    /// [`None`] if the result doesn't fit into a [`Decimal`].
    #[must_use]
    pub fn checked_mul(self, rhs: Decimal) -> Option<Self> {
        self.amount
            .checked_mul(rhs)
            .map(|amount| Self::new(amount, self.currency))
    }
}

/// Sum of [`Money`] amounts, ignoring their [`Currency`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Total(pub Decimal);

impl Total {
    /// Sums the provided [`Money`] amounts.
    ///
    /// [`None`] if the sum doesn't fit into a [`Decimal`].
    #[must_use]
    pub fn of<'a>(items: impl IntoIterator<Item = &'a Money>) -> Option<Self> {
        items
            .into_iter()
            .try_fold(Decimal::ZERO, |sum, m| sum.checked_add(m.amount))
            .map(Self)
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    #[case = "SCREAMING_SNAKE_CASE"]
    enum Currency {
        #[doc = "US Dollar."]
        Usd = 1,

        #[doc = "Euro."]
        Eur = 2,

        #[doc = "Russian Ruble."]
        Rub = 3,
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{round, Currency, Money, Total};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn rounds_midpoint_away_from_zero() {
        assert_eq!(round(decimal("0.125")), decimal("0.13"));
        assert_eq!(round(decimal("0.124")), decimal("0.12"));
        assert_eq!(round(decimal("28.5")), decimal("28.50"));
        assert_eq!(round(decimal("1.005")), decimal("1.01"));
        assert_eq!(round(decimal("10")), decimal("10"));
    }

    #[test]
    fn sums_amounts() {
        let items = [
            Money::new(decimal("50"), Currency::Usd),
            Money::new(decimal("25.25"), Currency::Usd),
        ];
        assert_eq!(Total::of(&items), Some(Total(decimal("75.25"))));
        let none: [Money; 0] = [];
        assert_eq!(Total::of(&none), Some(Total(Decimal::ZERO)));
    }

    #[test]
    fn overflowing_arithmetic_is_none() {
        let max = Money::new(Decimal::MAX, Currency::Usd);
        assert_eq!(Total::of(&[max, max]), None);
        assert_eq!(max.checked_mul(Decimal::TEN), None);
        assert_eq!(
            Money::new(decimal("66.67"), Currency::Usd)
                .checked_mul(Decimal::from(3)),
            Some(Money::new(decimal("200.01"), Currency::Usd)),
        );
    }

    #[test]
    fn deserializes_upper_case_currency_code_only() {
        let money: Money =
            serde_json::from_str(r#"{"amount": "10.00", "currency": "USD"}"#)
                .unwrap();
        assert_eq!(money, Money::new(decimal("10.00"), Currency::Usd));

        assert!(serde_json::from_str::<Money>(
            r#"{"amount": "10.00", "currency": "usd"}"#,
        )
        .is_err());
    }

    #[test]
    fn detects_negative_amount() {
        assert!(Money::new(decimal("-0.01"), Currency::Eur).is_negative());
        assert!(!Money::new(decimal("-0"), Currency::Eur).is_negative());
        assert!(!Money::zero(Currency::Eur).is_negative());
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45USD").unwrap(),
            Money::new(decimal("123.45"), Currency::Usd),
        );
        assert_eq!(
            Money::from_str("123.45EUR").unwrap(),
            Money::new(decimal("123.45"), Currency::Eur),
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Us").is_err());
        assert!(Money::from_str("123.45Usdollar").is_err());

        assert!(Money::from_str("123USD").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Money::new(decimal("313.50"), Currency::Usd).to_string(),
            "313.50USD",
        );
        assert_eq!(
            Money::new(decimal("123.00"), Currency::Rub).to_string(),
            "123RUB",
        );
    }

    #[test]
    fn serializes_currency_code() {
        let json = serde_json::to_value(Money::new(
            decimal("12.5"),
            Currency::Eur,
        ))
        .unwrap();
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["amount"], "12.5");
    }
}
