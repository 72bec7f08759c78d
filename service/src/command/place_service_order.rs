//! [`Command`] for placing a service [`Order`] on a [`Booking`].

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Transacted},
    Currency, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, order, Booking, Order},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for placing a service [`Order`] on a [`Booking`].
///
/// A [`booking::Status::CheckedOut`] [`Booking`] still accepts [`Order`]s
/// made during its stay, such as minibar consumption found on the room
/// inspection. These are left uncharged until charged to the issued
/// [`Bill`] with [`AddBillCharge::Order`].
///
/// [`AddBillCharge::Order`]: super::AddBillCharge::Order
/// [`Bill`]: crate::domain::Bill
#[derive(Clone, Debug)]
pub struct PlaceServiceOrder {
    /// ID of the [`Booking`] the [`Order`] is charged to.
    pub booking_id: booking::Id,

    /// Type of the ordered service.
    pub service_type: order::ServiceType,

    /// Name of the ordered service.
    pub service_name: order::ServiceName,

    /// Price of the ordered service.
    pub amount: Money,

    /// [`DateTime`] when the [`Order`] was placed.
    ///
    /// [`DateTime`]: common::DateTime
    pub placed_at: order::PlacementDateTime,
}

impl<Db> Command<PlaceServiceOrder> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<Insert<Order>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Order;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: PlaceServiceOrder,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let PlaceServiceOrder {
            booking_id,
            service_type,
            service_name,
            amount,
            placed_at,
        } = cmd;

        if amount.is_negative() {
            return Err(tracerr::new!(E::NegativeAmount(amount)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid placing orders concurrently with the checkout.
        tx.execute(Lock(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        let (checked_in_at, checked_out_at) = match &booking {
            Booking {
                status: booking::Status::CheckedIn,
                checked_in_at: Some(at),
                ..
            } => (*at, None),
            Booking {
                status: booking::Status::CheckedOut,
                checked_in_at: Some(at),
                checked_out_at: Some(out),
                ..
            } => (*at, Some(*out)),
            Booking { status, .. } => {
                return Err(tracerr::new!(E::WrongBookingStatus(*status)));
            }
        };
        if amount.currency != booking.nightly_rate.currency {
            return Err(tracerr::new!(E::CurrencyMismatch(
                booking.nightly_rate.currency
            )));
        }
        if placed_at.coerce::<()>() < checked_in_at.coerce() {
            return Err(tracerr::new!(E::PlacedBeforeCheckIn));
        }
        if let Some(out) = checked_out_at {
            if placed_at.coerce::<()>() > out.coerce() {
                return Err(tracerr::new!(E::PlacedAfterCheckOut));
            }
        }

        let order = Order {
            id: order::Id::new(),
            booking_id,
            hotel_id: booking.hotel_id,
            service_type,
            service_name,
            amount,
            placed_at,
        };
        tx.execute(Insert(order.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Order(id: {})` of {} placed on `Booking(id: {booking_id})`",
            order.id,
            order.amount,
        );

        Ok(order)
    }
}

/// Error of [`PlaceServiceOrder`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Order`] amount is not in the [`Booking`] currency.
    #[display("`Order` amount must be in `{_0}`")]
    CurrencyMismatch(#[error(not(source))] Currency),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Order`] amount is below zero.
    #[display("`Order` amount `{_0}` must not be negative")]
    NegativeAmount(#[error(not(source))] Money),

    /// [`Order`] is placed after the guest checked out.
    #[display("`Order` cannot be placed after the check-out")]
    PlacedAfterCheckOut,

    /// [`Order`] is placed before the guest checked in.
    #[display("`Order` cannot be placed before the check-in")]
    PlacedBeforeCheckIn,

    /// [`Booking`] is neither [`booking::Status::CheckedIn`] nor
    /// [`booking::Status::CheckedOut`].
    #[display("`Order` cannot be placed on a `{_0}` booking")]
    WrongBookingStatus(#[error(not(source))] booking::Status),
}

#[cfg(test)]
mod spec {
    use common::{Currency, Money};

    use crate::{
        command::{
            spec::{
                at, cash, checked_in, checked_out, place_order, service, usd,
            },
            Command as _, CreateBooking,
        },
        domain::{bill::payment, booking, guest, hotel, order, room},
        query,
    };

    use super::{ExecutionError, PlaceServiceOrder};

    fn dinner(booking_id: booking::Id, placed_at: &str) -> PlaceServiceOrder {
        PlaceServiceOrder {
            booking_id,
            service_type: order::ServiceType::Restaurant,
            service_name: order::ServiceName::new("Dinner").unwrap(),
            amount: usd("50"),
            placed_at: at(placed_at),
        }
    }

    #[tokio::test]
    async fn places_order_on_checked_in_booking() {
        let svc = service();
        let booking = checked_in(&svc).await;

        let late =
            place_order(&svc, booking.id, "25", "2024-03-03T08:15:00Z").await;
        let early =
            place_order(&svc, booking.id, "50", "2024-03-02T19:30:00Z").await;
        assert_eq!(early.hotel_id, booking.hotel_id);

        let orders = svc
            .execute(query::order::ByBooking::by(booking.id))
            .await
            .unwrap();
        assert_eq!(
            orders.iter().map(|o| o.id).collect::<Vec<_>>(),
            [early.id, late.id],
        );
    }

    #[tokio::test]
    async fn rejects_not_checked_in_booking() {
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

        let err = svc
            .execute(dinner(booking.id, "2024-03-02T19:30:00Z"))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::WrongBookingStatus(booking::Status::Confirmed),
        ));
    }

    #[tokio::test]
    async fn places_late_order_on_checked_out_booking() {
        let svc = service();
        let booking = checked_in(&svc).await;
        _ = checked_out(&svc, booking.id, cash(payment::Status::Pending)).await;

        let order = place_order(
            &svc,
            booking.id,
            "12.40",
            "2024-03-03T23:10:00Z",
        )
        .await;

        assert_eq!(order.booking_id, booking.id);
    }

    #[tokio::test]
    async fn rejects_order_after_check_out() {
        let svc = service();
        let booking = checked_in(&svc).await;
        _ = checked_out(&svc, booking.id, cash(payment::Status::Pending)).await;

        let err = svc
            .execute(dinner(booking.id, "2024-03-04T11:30:00Z"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PlacedAfterCheckOut));
    }

    #[tokio::test]
    async fn rejects_order_before_check_in() {
        let svc = service();
        let booking = checked_in(&svc).await;

        let err = svc
            .execute(dinner(booking.id, "2024-03-01T13:00:00Z"))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PlacedBeforeCheckIn));
    }

    #[tokio::test]
    async fn rejects_foreign_currency() {
        let svc = service();
        let booking = checked_in(&svc).await;

        let mut cmd = dinner(booking.id, "2024-03-02T19:30:00Z");
        cmd.amount = Money::new(cmd.amount.amount, Currency::Eur);
        let err = svc.execute(cmd).await.unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::CurrencyMismatch(Currency::Usd),
        ));
    }

    #[tokio::test]
    async fn rejects_negative_amount() {
        let svc = service();
        let booking = checked_in(&svc).await;

        let mut cmd = dinner(booking.id, "2024-03-02T19:30:00Z");
        cmd.amount = usd("-5");
        let err = svc.execute(cmd).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NegativeAmount(_)));
    }
}
