//! [`Percent`]-related definitions.

use std::str::FromStr;

use derive_more::Display;
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Percentage in the `[0, 100]` range.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Percent(Decimal);

impl Percent {
    /// Creates a new [`Percent`] by checking the provided value is in the
    /// `[0, 100]` range.
    #[must_use]
    pub fn new(val: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE_HUNDRED)
            .contains(&val)
            .then_some(Self(val))
    }

    /// Creates a new [`Percent`] without performing any validation.
    ///
    /// # Safety
    ///
    /// The provided value must be in the `[0, 100]` range.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(val: Decimal) -> Self {
        Self(val)
    }

    /// Returns the share of the provided `amount` this [`Percent`] represents.
    ///
    /// The result is not rounded. [`None`] if it doesn't fit into a
    /// [`Decimal`].
    #[must_use]
    pub fn of(self, amount: Decimal) -> Option<Decimal> {
        amount
            .checked_mul(self.0)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
    }

    /// Returns the underlying [`Decimal`] value of this [`Percent`].
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl FromStr for Percent {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .ok()
            .and_then(Self::new)
            .ok_or("invalid percent value")
    }
}

#[cfg(test)]
mod spec {
    use rust_decimal::Decimal;

    use super::Percent;

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn checks_range() {
        assert!(Percent::new(decimal("0")).is_some());
        assert!(Percent::new(decimal("100")).is_some());
        assert!(Percent::new(decimal("10.5")).is_some());
        assert!(Percent::new(decimal("-0.1")).is_none());
        assert!(Percent::new(decimal("100.01")).is_none());

        assert!("12.5".parse::<Percent>().is_ok());
        assert!("abc".parse::<Percent>().is_err());
    }

    #[test]
    fn takes_share() {
        let ten = Percent::new(decimal("10")).unwrap();
        assert_eq!(ten.of(decimal("285")), Some(decimal("28.5")));
        assert_eq!(ten.of(decimal("0.05")), Some(decimal("0.005")));
        assert_eq!(ten.of(Decimal::MAX), None);

        #[expect(unsafe_code, reason = "constant in range")]
        let ten = unsafe { Percent::new_unchecked(Decimal::TEN) };
        assert_eq!(ten.value(), decimal("10"));
    }
}
