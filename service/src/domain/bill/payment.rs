//! [`Payment`] of a [`Bill`].

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{datetime, define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidationError;
#[cfg(doc)]
use super::Bill;

/// Payment settling a [`Bill`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Payment {
    /// [`Method`] of this [`Payment`].
    pub method: Method,

    /// [`CardType`] of the paying card, if paid by card.
    pub card_type: Option<CardType>,

    /// [`LastFourDigits`] of the paying card, if paid by card.
    pub last_four_digits: Option<LastFourDigits>,

    /// [`TransactionId`] of this [`Payment`], if not paid in cash.
    pub transaction_id: Option<TransactionId>,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`DateTime`] of this [`Payment`].
    #[serde(with = "datetime::serde::rfc3339")]
    pub date: ProcessingDateTime,
}

impl Payment {
    /// Checks this [`Payment`] carries the details its [`Method`] requires.
    ///
    /// # Errors
    ///
    /// With the [`ValidationError`] of the first missing detail.
    pub fn check_details(&self) -> Result<(), ValidationError> {
        use ValidationError as E;

        if self.method.is_card() {
            if self.card_type.is_none() {
                return Err(E::CardTypeRequired);
            }
            if self.last_four_digits.is_none() {
                return Err(E::LastFourDigitsRequired);
            }
        }
        if self.method != Method::Cash && self.transaction_id.is_none() {
            return Err(E::TransactionIdRequired);
        }
        Ok(())
    }
}

/// [`DateTime`] when a [`Payment`] was processed.
pub type ProcessingDateTime = DateTimeOf<(Payment, unit::Payment)>;

define_kind! {
    #[doc = "Method of a [`Payment`]."]
    enum Method {
        #[doc = "Paid with a credit card."]
        CreditCard = 1,

        #[doc = "Paid with a debit card."]
        DebitCard = 2,

        #[doc = "Paid in cash at the front desk."]
        Cash = 3,

        #[doc = "Paid with a bank transfer."]
        BankTransfer = 4,
    }
}

impl Method {
    /// Indicates whether this [`Method`] is a card payment.
    #[must_use]
    pub const fn is_card(self) -> bool {
        matches!(self, Self::CreditCard | Self::DebitCard)
    }
}

define_kind! {
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "Payment is awaited."]
        Pending = 1,

        #[doc = "Payment is received."]
        Completed = 2,

        #[doc = "Payment attempt failed."]
        Failed = 3,
    }
}

/// Type of a paying card, like `visa` or `mastercard`.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(try_from = "String", into = "String")]
pub struct CardType(String);

impl CardType {
    /// Creates a new [`CardType`] if the given `kind` is valid.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Option<Self> {
        let kind = kind.into();
        Self::check(&kind).then_some(Self(kind))
    }

    /// Checks whether the given `kind` is a valid [`CardType`].
    fn check(kind: impl AsRef<str>) -> bool {
        let kind = kind.as_ref();
        kind.trim() == kind && !kind.is_empty() && kind.len() <= 32
    }
}

impl TryFrom<String> for CardType {
    type Error = &'static str;

    fn try_from(kind: String) -> Result<Self, Self::Error> {
        Self::new(kind).ok_or("invalid `CardType`")
    }
}

/// Last four digits of a paying card number.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(try_from = "String", into = "String")]
pub struct LastFourDigits(String);

impl LastFourDigits {
    /// Creates new [`LastFourDigits`] if the given `digits` are valid.
    #[must_use]
    pub fn new(digits: impl Into<String>) -> Option<Self> {
        let digits = digits.into();
        Self::check(&digits).then_some(Self(digits))
    }

    /// Checks whether the given `digits` are valid [`LastFourDigits`].
    fn check(digits: impl AsRef<str>) -> bool {
        /// Regular expression checking [`LastFourDigits`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[0-9]{4}$").expect("valid regex")
        });

        REGEX.is_match(digits.as_ref())
    }
}

impl TryFrom<String> for LastFourDigits {
    type Error = &'static str;

    fn try_from(digits: String) -> Result<Self, Self::Error> {
        Self::new(digits).ok_or("invalid `LastFourDigits`")
    }
}

/// ID of a [`Payment`] transaction in an external payment system.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(try_from = "String", into = "String")]
pub struct TransactionId(String);

impl TransactionId {
    /// Creates a new [`TransactionId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`TransactionId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        !id.is_empty() && id.len() <= 128 && !id.contains(char::is_whitespace)
    }
}

impl TryFrom<String> for TransactionId {
    type Error = &'static str;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id).ok_or("invalid `TransactionId`")
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{
        CardType, LastFourDigits, Method, Payment, Status, TransactionId,
    };
    use crate::domain::bill::ValidationError;

    fn payment(method: Method) -> Payment {
        Payment {
            method,
            card_type: None,
            last_four_digits: None,
            transaction_id: None,
            status: Status::Pending,
            date: DateTime::now().coerce(),
        }
    }

    #[test]
    fn checks_last_four_digits() {
        assert!(LastFourDigits::new("0042").is_some());
        assert!(LastFourDigits::new("042").is_none());
        assert!(LastFourDigits::new("00421").is_none());
        assert!(LastFourDigits::new("00a2").is_none());
        assert!(LastFourDigits::new("٠١٢٣").is_none());
    }

    #[test]
    fn cash_needs_no_details() {
        assert_eq!(payment(Method::Cash).check_details(), Ok(()));
    }

    #[test]
    fn card_needs_card_details() {
        let mut card = payment(Method::CreditCard);
        assert_eq!(
            card.check_details(),
            Err(ValidationError::CardTypeRequired),
        );
        assert_eq!(
            ValidationError::CardTypeRequired.to_string(),
            "Card type is required for credit/debit card payments",
        );

        card.card_type = CardType::new("visa");
        assert_eq!(
            card.check_details(),
            Err(ValidationError::LastFourDigitsRequired),
        );

        card.last_four_digits = LastFourDigits::new("4242");
        assert_eq!(
            card.check_details(),
            Err(ValidationError::TransactionIdRequired),
        );

        card.transaction_id = TransactionId::new("ch_3PqX");
        assert_eq!(card.check_details(), Ok(()));

        card.method = Method::DebitCard;
        card.card_type = None;
        assert_eq!(
            card.check_details(),
            Err(ValidationError::CardTypeRequired),
        );
    }

    #[test]
    fn transfer_needs_transaction_id() {
        let mut transfer = payment(Method::BankTransfer);
        assert_eq!(
            transfer.check_details(),
            Err(ValidationError::TransactionIdRequired),
        );

        transfer.transaction_id = TransactionId::new("SEPA-2024-03-04-001");
        assert_eq!(transfer.check_details(), Ok(()));
    }
}
