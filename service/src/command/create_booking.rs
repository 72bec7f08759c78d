//! [`Command`] for creating a new [`Booking`].

use common::{operations::Insert, DateTime, Money};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, guest, hotel, room, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Booking`].
#[derive(Clone, Copy, Debug)]
pub struct CreateBooking {
    /// ID of the hotel to book a room in.
    pub hotel_id: hotel::Id,

    /// ID of the guest the room is booked for.
    pub guest_id: guest::Id,

    /// ID of the booked room.
    pub room_id: room::Id,

    /// Price of a single night in the booked room.
    pub nightly_rate: Money,
}

impl<Db> Command<CreateBooking> for Service<Db>
where
    Db: Database<Insert<Booking>, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            hotel_id,
            guest_id,
            room_id,
            nightly_rate,
        } = cmd;

        if nightly_rate.is_negative() {
            return Err(tracerr::new!(E::NegativeNightlyRate(nightly_rate)));
        }

        let booking = Booking {
            id: booking::Id::new(),
            hotel_id,
            guest_id,
            room_id,
            nightly_rate,
            status: booking::Status::Confirmed,
            created_at: DateTime::now().coerce(),
            checked_in_at: None,
            checked_out_at: None,
        };
        self.database()
            .execute(Insert(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Booking(id: {})` created", booking.id);

        Ok(booking)
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided nightly rate is below zero.
    #[display("Nightly rate `{_0}` must not be negative")]
    NegativeNightlyRate(#[error(not(source))] Money),
}
