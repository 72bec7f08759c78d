//! [`Order`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use super::{booking, hotel};

/// Service order placed by a guest during a [`Booking`] stay.
///
/// [`Booking`]: super::Booking
#[derive(Clone, Debug)]
pub struct Order {
    /// ID of this [`Order`].
    pub id: Id,

    /// ID of the [`Booking`] this [`Order`] is charged to.
    ///
    /// [`Booking`]: super::Booking
    pub booking_id: booking::Id,

    /// ID of the hotel this [`Order`] was placed in.
    pub hotel_id: hotel::Id,

    /// [`ServiceType`] of this [`Order`].
    pub service_type: ServiceType,

    /// [`ServiceName`] of this [`Order`].
    pub service_name: ServiceName,

    /// Amount charged for this [`Order`].
    pub amount: Money,

    /// [`DateTime`] when this [`Order`] was placed.
    pub placed_at: PlacementDateTime,
}

super::define_id!(#[doc = "ID of an [`Order`]."]);

define_kind! {
    #[doc = "Type of a hotel service an [`Order`] is placed for."]
    enum ServiceType {
        #[doc = "Meal in a hotel restaurant."]
        Restaurant = 1,

        #[doc = "Delivery to the room."]
        RoomService = 2,

        #[doc = "Spa procedure."]
        Spa = 3,

        #[doc = "Laundry and dry cleaning."]
        Laundry = 4,

        #[doc = "Goods taken from the room minibar."]
        Minibar = 5,

        #[doc = "Any other service."]
        Other = 6,
    }
}

/// Human-readable name of an ordered service.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, Into, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(try_from = "String", into = "String")]
pub struct ServiceName(String);

impl ServiceName {
    /// Minimum length of a [`ServiceName`] in characters.
    pub const MIN_LEN: usize = 2;

    /// Maximum length of a [`ServiceName`] in characters.
    pub const MAX_LEN: usize = 100;

    /// Creates a new [`ServiceName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`ServiceName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name
            && (Self::MIN_LEN..=Self::MAX_LEN).contains(&name.chars().count())
    }
}

impl TryFrom<String> for ServiceName {
    type Error = &'static str;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name).ok_or("invalid `ServiceName`")
    }
}

impl std::str::FromStr for ServiceName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ServiceName`")
    }
}

/// [`DateTime`] when an [`Order`] was placed.
pub type PlacementDateTime = DateTimeOf<(Order, unit::Charge)>;

#[cfg(test)]
mod spec {
    use super::{ServiceName, ServiceType};

    #[test]
    fn checks_service_name() {
        assert!(ServiceName::new("Dinner for two").is_some());
        assert!(ServiceName::new("").is_none());
        assert!(ServiceName::new("x").is_none());
        assert!(ServiceName::new(" Dinner").is_none());
        assert!(ServiceName::new("Dinner ").is_none());
        assert!(ServiceName::new("x".repeat(ServiceName::MAX_LEN)).is_some());
        assert!(
            ServiceName::new("x".repeat(ServiceName::MAX_LEN + 1)).is_none()
        );
    }

    #[test]
    fn service_type_names() {
        assert_eq!(ServiceType::RoomService.to_string(), "room_service");
        assert_eq!(
            "minibar".parse::<ServiceType>().unwrap(),
            ServiceType::Minibar,
        );
        assert_eq!(ServiceType::from_u8(3), Some(ServiceType::Spa));
        assert_eq!(ServiceType::from_u8(0), None);
    }
}
