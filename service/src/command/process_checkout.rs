//! [`Command`] for checking a guest out and issuing its [`Bill`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        bill::{self, OrderCharge, ValidationError},
        booking, employee, Bill, Booking, Order,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for checking a guest out and issuing its [`Bill`].
///
/// Every [`Order`] placed on the [`Booking`] becomes an [`OrderCharge`] of
/// the issued [`Bill`].
#[derive(Clone, Debug)]
pub struct ProcessCheckout {
    /// ID of the [`Booking`] to check out by.
    pub booking_id: booking::Id,

    /// ID of the employee processing the checkout.
    pub employee_id: employee::Id,

    /// [`DateTime`] when the guest checked out.
    pub checked_out_at: booking::CheckOutDateTime,

    /// [`bill::Extra`] charges to put on the [`Bill`].
    pub extras: Vec<bill::Extra>,

    /// [`bill::Payment`] of the [`Bill`].
    pub payment: bill::Payment,
}

impl<Db> Command<ProcessCheckout> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Order>, booking::Id>>,
            Ok = Vec<Order>,
            Err = Traced<database::Error>,
        > + Database<Insert<Bill>, Err = Traced<database::Error>>
        + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Bill;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ProcessCheckout,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ProcessCheckout {
            booking_id,
            employee_id,
            checked_out_at,
            extras,
            payment,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent checkouts and orders placed during the checkout.
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

        let checked_in_at = match (booking.status, booking.checked_in_at) {
            (booking::Status::CheckedIn, Some(at)) => at,
            (status, _) => {
                return Err(tracerr::new!(E::WrongBookingStatus(status)));
            }
        };

        let orders = tx
            .execute(Select(By::<Vec<Order>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Out of range durations are left for the `Bill` validation to
        // reject.
        let nights = u16::try_from(checked_in_at.days_until(&checked_out_at))
            .unwrap_or(u16::MAX);
        let room_charges = booking
            .room_charges(nights)
            .ok_or(E::InvalidBill(ValidationError::AmountOverflow))
            .map_err(tracerr::wrap!())?;
        let currency = booking.nightly_rate.currency;
        let now = DateTime::now();
        let bill = Bill {
            id: bill::Id::new(),
            booking_id,
            hotel_id: booking.hotel_id,
            guest_id: booking.guest_id,
            room_id: booking.room_id,
            employee_id,
            currency,
            stay: bill::Stay {
                check_in: checked_in_at,
                check_out: checked_out_at,
                nights,
                room_charges,
            },
            order_charges: orders.into_iter().map(OrderCharge::from).collect(),
            extras,
            subtotal: Money::zero(currency),
            tax: Money::zero(currency),
            grand_total: Money::zero(currency),
            payment,
            status: bill::Status::Pending,
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
        .prepare_for_save()
        .and_then(|b| b.validate().map(|()| b))
        .map_err(E::InvalidBill)
        .map_err(tracerr::wrap!())?;

        tx.execute(Insert(bill.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        booking.status = booking::Status::CheckedOut;
        booking.checked_out_at = Some(checked_out_at);
        tx.execute(Update(booking))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Booking(id: {booking_id})` checked out with `Bill(id: {})` \
             of {}",
            bill.id,
            bill.grand_total,
        );

        Ok(bill)
    }
}

/// Error of [`ProcessCheckout`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Issued [`Bill`] violates its invariants.
    #[display("Invalid bill: {_0}")]
    InvalidBill(ValidationError),

    /// [`Booking`] is not [`booking::Status::CheckedIn`].
    #[display("`Booking` cannot be checked out while `{_0}`")]
    WrongBookingStatus(#[error(not(source))] booking::Status),
}
