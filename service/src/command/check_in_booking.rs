//! [`Command`] for checking a guest in by its [`Booking`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for checking a guest in by its [`Booking`].
#[derive(Clone, Copy, Debug)]
pub struct CheckInBooking {
    /// ID of the [`Booking`] to check in by.
    pub booking_id: booking::Id,

    /// [`DateTime`] when the guest checked in.
    ///
    /// [`DateTime`]: common::DateTime
    pub checked_in_at: booking::CheckInDateTime,
}

impl<Db> Command<CheckInBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CheckInBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CheckInBooking {
            booking_id,
            checked_in_at,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        if booking.status != booking::Status::Confirmed {
            return Err(tracerr::new!(E::WrongBookingStatus(booking.status)));
        }

        booking.status = booking::Status::CheckedIn;
        booking.checked_in_at = Some(checked_in_at);

        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!("`Booking(id: {booking_id})` checked in");

        Ok(booking)
    }
}

/// Error of [`CheckInBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] is not [`booking::Status::Confirmed`].
    #[display("`Booking` cannot be checked in while `{_0}`")]
    WrongBookingStatus(#[error(not(source))] booking::Status),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{
            spec::{at, checked_in, service, usd},
            Command as _, CreateBooking,
        },
        domain::{booking, guest, hotel, room},
    };

    use super::{CheckInBooking, ExecutionError};

    #[tokio::test]
    async fn checks_in_confirmed_booking() {
        let svc = service();

        let booking = svc
            .execute(CreateBooking {
                hotel_id: hotel::Id::new(),
                guest_id: guest::Id::new(),
                room_id: room::Id::new(),
                nightly_rate: usd("90"),
            })
            .await
            .unwrap();

        let checked_in_at = at("2024-05-10T15:30:00Z");
        let booking = svc
            .execute(CheckInBooking {
                booking_id: booking.id,
                checked_in_at,
            })
            .await
            .unwrap();

        assert_eq!(booking.status, booking::Status::CheckedIn);
        assert_eq!(booking.checked_in_at, Some(checked_in_at));
    }

    #[tokio::test]
    async fn rejects_second_check_in() {
        let svc = service();
        let booking = checked_in(&svc).await;

        let err = svc
            .execute(CheckInBooking {
                booking_id: booking.id,
                checked_in_at: at("2024-03-02T10:00:00Z"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::WrongBookingStatus(booking::Status::CheckedIn),
        ));
    }

    #[tokio::test]
    async fn rejects_unknown_booking() {
        let err = service()
            .execute(CheckInBooking {
                booking_id: booking::Id::new(),
                checked_in_at: at("2024-03-02T10:00:00Z"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::BookingNotExists(_),
        ));
    }
}
