//! Charges of a [`Bill`].

use common::{datetime, DateTime, Money};
use derive_more::{AsRef, Display, Into};
use serde::{Deserialize, Serialize};

use crate::domain::{order, Order};

use super::{Stay, ValidationError};
#[cfg(doc)]
use super::Bill;

/// Charge of a [`Bill`] originating from a service [`Order`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OrderCharge {
    /// ID of the charged [`Order`].
    pub order_id: order::Id,

    /// [`order::ServiceType`] of the charged [`Order`].
    pub service_type: order::ServiceType,

    /// [`order::ServiceName`] of the charged [`Order`].
    pub service_name: order::ServiceName,

    /// Charged amount.
    pub amount: Money,

    /// [`DateTime`] when the charged [`Order`] was placed.
    #[serde(with = "datetime::serde::rfc3339")]
    pub date: order::PlacementDateTime,
}

impl OrderCharge {
    /// Checks this [`OrderCharge`] was made during the provided [`Stay`].
    ///
    /// Both ends of the [`Stay`] are inclusive.
    ///
    /// # Errors
    ///
    /// With [`ValidationError::OrderChargeOutsideStay`] if it wasn't.
    pub fn check_within(&self, stay: &Stay) -> Result<(), ValidationError> {
        let date: DateTime = self.date.coerce();
        if date < stay.check_in.coerce() || date > stay.check_out.coerce() {
            return Err(ValidationError::OrderChargeOutsideStay(self.order_id));
        }
        Ok(())
    }
}

impl From<Order> for OrderCharge {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            service_type: order.service_type,
            service_name: order.service_name,
            amount: order.amount,
            date: order.placed_at,
        }
    }
}

/// Miscellaneous charge of a [`Bill`] not tied to any [`Order`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Extra {
    /// [`Description`] of this [`Extra`] charge.
    pub description: Description,

    /// Charged amount.
    pub amount: Money,
}

/// Description of an [`Extra`] charge.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    /// Minimum length of a [`Description`] in characters.
    pub const MIN_LEN: usize = 2;

    /// Maximum length of a [`Description`] in characters.
    pub const MAX_LEN: usize = 200;

    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Description`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        text.trim() == text
            && (Self::MIN_LEN..=Self::MAX_LEN).contains(&text.chars().count())
    }
}

impl TryFrom<String> for Description {
    type Error = &'static str;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::new(text).ok_or("invalid `Description`")
    }
}

#[cfg(test)]
mod spec {
    use super::Description;

    #[test]
    fn checks_description() {
        assert!(Description::new("Late checkout").is_some());
        assert!(Description::new("ok").is_some());
        assert!(Description::new("x").is_none());
        assert!(Description::new(" Late checkout").is_none());
        assert!(Description::new("я".repeat(Description::MAX_LEN)).is_some());
        assert!(
            Description::new("я".repeat(Description::MAX_LEN + 1)).is_none()
        );
    }

    #[test]
    fn rejects_invalid_description_in_json() {
        assert!(serde_json::from_str::<Description>(r#""Towels""#).is_ok());
        assert!(serde_json::from_str::<Description>(r#""""#).is_err());
    }
}
