//! [`Booking`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use rust_decimal::Decimal;

use super::{guest, hotel, room};

/// Room reservation of a guest in a hotel.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the hotel this [`Booking`] is made in.
    pub hotel_id: hotel::Id,

    /// ID of the guest this [`Booking`] is made for.
    pub guest_id: guest::Id,

    /// ID of the booked room.
    pub room_id: room::Id,

    /// Price of a single night in the booked room.
    ///
    /// Its currency is the currency of everything charged to this
    /// [`Booking`].
    pub nightly_rate: Money,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when the guest checked in.
    pub checked_in_at: Option<CheckInDateTime>,

    /// [`DateTime`] when the guest checked out.
    pub checked_out_at: Option<CheckOutDateTime>,
}

impl Booking {
    /// Returns the room charges of this [`Booking`] for the provided number
    /// of `nights`.
    ///
    /// [`None`] if the charges don't fit into a [`Decimal`].
    #[must_use]
    pub fn room_charges(&self, nights: u16) -> Option<Money> {
        self.nightly_rate
            .checked_mul(Decimal::from(nights))
            .map(Money::rounded)
    }
}

super::define_id!(#[doc = "ID of a [`Booking`]."]);

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "Room is reserved, the guest has not arrived yet."]
        Confirmed = 1,

        #[doc = "Guest lives in the room."]
        CheckedIn = 2,

        #[doc = "Guest has left and the bill is issued."]
        CheckedOut = 3,

        #[doc = "Reservation is cancelled."]
        Cancelled = 4,
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a guest checked in.
pub type CheckInDateTime = DateTimeOf<(Booking, unit::CheckIn)>;

/// [`DateTime`] when a guest checked out.
pub type CheckOutDateTime = DateTimeOf<(Booking, unit::CheckOut)>;
