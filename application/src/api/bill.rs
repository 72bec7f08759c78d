//! [`Bill`]-related definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Extension, Json,
};
use common::{datetime, Currency, DateTime, Money};
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{
        self,
        bill::{self, payment, Extra, ValidationError},
        booking, employee, guest, hotel, order, room,
    },
    query, Command as _, Query as _,
};

use crate::{api, define_error, AsError, Error, Service};

/// Financial record of a guest stay.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// ID of this [`Bill`].
    pub id: bill::Id,

    /// ID of the booking this [`Bill`] is issued for.
    pub booking_id: booking::Id,

    /// ID of the hotel issuing this [`Bill`].
    pub hotel_id: hotel::Id,

    /// ID of the billed guest.
    pub guest_id: guest::Id,

    /// ID of the room the guest stayed in.
    pub room_id: room::Id,

    /// ID of the employee who processed the checkout.
    pub employee_id: employee::Id,

    /// Currency of every amount on this [`Bill`].
    pub currency: Currency,

    /// [`Stay`] this [`Bill`] is issued for.
    pub stay: Stay,

    /// Charges for the service orders.
    pub order_charges: Vec<OrderCharge>,

    /// Miscellaneous charges.
    pub extras: Vec<Extra>,

    /// Sum of all the charges.
    pub subtotal: Money,

    /// Tax taken from the subtotal.
    pub tax: Money,

    /// Amount to be paid.
    pub grand_total: Money,

    /// [`Payment`] of this [`Bill`].
    pub payment: Payment,

    /// Status of this [`Bill`].
    pub status: bill::Status,

    /// [`DateTime`] when this [`Bill`] was created.
    #[serde(with = "datetime::serde::rfc3339")]
    pub created_at: bill::CreationDateTime,

    /// [`DateTime`] when this [`Bill`] was modified last time.
    #[serde(with = "datetime::serde::rfc3339")]
    pub updated_at: bill::ModificationDateTime,

    /// Number of started days of the [`Stay`].
    pub duration_days: i64,

    /// Room charges per night of the [`Stay`].
    pub average_daily_rate: Money,
}

impl From<domain::Bill> for Bill {
    fn from(bill: domain::Bill) -> Self {
        let duration_days = bill.duration_days();
        let average_daily_rate = bill.average_daily_rate();

        let domain::Bill {
            id,
            booking_id,
            hotel_id,
            guest_id,
            room_id,
            employee_id,
            currency,
            stay,
            order_charges,
            extras,
            subtotal,
            tax,
            grand_total,
            payment,
            status,
            created_at,
            updated_at,
        } = bill;
        Self {
            id,
            booking_id,
            hotel_id,
            guest_id,
            room_id,
            employee_id,
            currency,
            stay: stay.into(),
            order_charges: order_charges.into_iter().map(Into::into).collect(),
            extras,
            subtotal,
            tax,
            grand_total,
            payment: payment.into(),
            status,
            created_at,
            updated_at,
            duration_days,
            average_daily_rate,
        }
    }
}

/// Guest stay a [`Bill`] is issued for.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stay {
    /// [`DateTime`] when the guest checked in.
    #[serde(with = "datetime::serde::rfc3339")]
    pub check_in: booking::CheckInDateTime,

    /// [`DateTime`] when the guest checked out.
    #[serde(with = "datetime::serde::rfc3339")]
    pub check_out: booking::CheckOutDateTime,

    /// Number of nights the guest stayed.
    pub nights: u16,

    /// Charges for the room over all the nights.
    pub room_charges: Money,
}

impl From<bill::Stay> for Stay {
    fn from(stay: bill::Stay) -> Self {
        let bill::Stay {
            check_in,
            check_out,
            nights,
            room_charges,
        } = stay;
        Self {
            check_in,
            check_out,
            nights,
            room_charges,
        }
    }
}

/// Charge of a [`Bill`] for a service order.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCharge {
    /// ID of the charged order.
    pub order_id: order::Id,

    /// Type of the ordered service.
    pub service_type: order::ServiceType,

    /// Name of the ordered service.
    pub service_name: order::ServiceName,

    /// Charged amount.
    pub amount: Money,

    /// [`DateTime`] when the order was placed.
    #[serde(with = "datetime::serde::rfc3339")]
    pub date: order::PlacementDateTime,
}

impl From<bill::OrderCharge> for OrderCharge {
    fn from(charge: bill::OrderCharge) -> Self {
        let bill::OrderCharge {
            order_id,
            service_type,
            service_name,
            amount,
            date,
        } = charge;
        Self {
            order_id,
            service_type,
            service_name,
            amount,
            date,
        }
    }
}

/// Payment settling a [`Bill`].
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Method of this [`Payment`].
    pub method: payment::Method,

    /// Type of the paying card, if paid by card.
    #[serde(default)]
    pub card_type: Option<payment::CardType>,

    /// Last four digits of the paying card, if paid by card.
    #[serde(default)]
    pub last_four_digits: Option<payment::LastFourDigits>,

    /// ID of the transaction in an external payment system, if not paid in
    /// cash.
    #[serde(default)]
    pub transaction_id: Option<payment::TransactionId>,

    /// Status of this [`Payment`].
    pub status: payment::Status,

    /// [`DateTime`] of this [`Payment`]. Current one, if omitted.
    #[serde(default, with = "datetime::serde::rfc3339::option")]
    pub date: Option<payment::ProcessingDateTime>,
}

impl From<bill::Payment> for Payment {
    fn from(payment: bill::Payment) -> Self {
        let bill::Payment {
            method,
            card_type,
            last_four_digits,
            transaction_id,
            status,
            date,
        } = payment;
        Self {
            method,
            card_type,
            last_four_digits,
            transaction_id,
            status,
            date: Some(date),
        }
    }
}

impl From<Payment> for bill::Payment {
    fn from(payment: Payment) -> Self {
        let Payment {
            method,
            card_type,
            last_four_digits,
            transaction_id,
            status,
            date,
        } = payment;
        Self {
            method,
            card_type,
            last_four_digits,
            transaction_id,
            status,
            date: date.unwrap_or_else(|| DateTime::now().coerce()),
        }
    }
}

/// Charge to be added to an issued [`Bill`].
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Charge {
    /// Service order placed after the checkout.
    #[serde(rename_all = "camelCase")]
    Order {
        /// ID of the order to charge.
        order_id: order::Id,
    },

    /// Miscellaneous charge.
    Extra(Extra),
}

define_error! {
    enum BillError {
        #[code = "BILL_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Bill` with the provided ID does not exist"]
        NotExists,

        #[code = "BILL_CANCELLED"]
        #[status = CONFLICT]
        #[message = "`Bill` is cancelled"]
        Cancelled,

        #[code = "BILL_CLOSED"]
        #[status = CONFLICT]
        #[message = "`Bill` is paid or cancelled and cannot be charged"]
        Closed,

        #[code = "BILL_PAID"]
        #[status = CONFLICT]
        #[message = "`Bill` is paid and cannot be cancelled"]
        Paid,

        #[code = "ORDER_ALREADY_CHARGED"]
        #[status = CONFLICT]
        #[message = "Order is charged to the `Bill` already"]
        OrderAlreadyCharged,

        #[code = "ORDER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Order with the provided ID does not exist"]
        OrderNotExists,

        #[code = "ORDER_OF_OTHER_BOOKING"]
        #[status = CONFLICT]
        #[message = "Order belongs to another booking"]
        OrderOfOtherBooking,
    }
}

/// Returns the [`Bill`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `BILL_NOT_EXISTS` - the [`Bill`] does not exist.
#[tracing::instrument(skip_all, fields(bill.id = tracing::field::Empty))]
pub async fn get(
    Extension(service): Extension<Service>,
    id: Result<Path<bill::Id>, PathRejection>,
) -> Result<Json<Bill>, Error> {
    let id = api::path("bill.id", id)?;

    service
        .execute(query::bill::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| BillError::NotExists.into())
        .map(|b| Json(b.into()))
}

/// Adds a [`Charge`] to the open [`Bill`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `BILL_NOT_EXISTS` - the [`Bill`] does not exist;
/// - `BILL_CLOSED` - the [`Bill`] is paid or cancelled;
/// - `ORDER_NOT_EXISTS` - the charged order does not exist;
/// - `ORDER_OF_OTHER_BOOKING` - the order belongs to another booking;
/// - `ORDER_ALREADY_CHARGED` - the order is charged already;
/// - `INVALID_BILL` - the charged [`Bill`] is inconsistent.
#[tracing::instrument(skip_all, fields(bill.id = tracing::field::Empty))]
pub async fn add_charge(
    Extension(service): Extension<Service>,
    id: Result<Path<bill::Id>, PathRejection>,
    req: Result<Json<Charge>, JsonRejection>,
) -> Result<Json<Bill>, Error> {
    let bill_id = api::path("bill.id", id)?;
    let cmd = match api::body(req)? {
        Charge::Order { order_id } => {
            command::AddBillCharge::Order { bill_id, order_id }
        }
        Charge::Extra(extra) => {
            command::AddBillCharge::Extra { bill_id, extra }
        }
    };

    service
        .execute(cmd)
        .await
        .map_err(AsError::into_error)
        .map(|b| Json(b.into()))
}

/// Records the [`Payment`] of the [`Bill`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `BILL_NOT_EXISTS` - the [`Bill`] does not exist;
/// - `BILL_CANCELLED` - the [`Bill`] is cancelled;
/// - `INVALID_BILL` - the [`Payment`] misses required details.
#[tracing::instrument(skip_all, fields(bill.id = tracing::field::Empty))]
pub async fn record_payment(
    Extension(service): Extension<Service>,
    id: Result<Path<bill::Id>, PathRejection>,
    req: Result<Json<Payment>, JsonRejection>,
) -> Result<Json<Bill>, Error> {
    let bill_id = api::path("bill.id", id)?;
    let payment = api::body(req)?.into();

    service
        .execute(command::RecordPayment { bill_id, payment })
        .await
        .map_err(AsError::into_error)
        .map(|b| Json(b.into()))
}

/// Cancels the [`Bill`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `BILL_NOT_EXISTS` - the [`Bill`] does not exist;
/// - `BILL_CANCELLED` - the [`Bill`] is cancelled already;
/// - `BILL_PAID` - the [`Bill`] is paid.
#[tracing::instrument(skip_all, fields(bill.id = tracing::field::Empty))]
pub async fn cancel(
    Extension(service): Extension<Service>,
    id: Result<Path<bill::Id>, PathRejection>,
) -> Result<Json<Bill>, Error> {
    let bill_id = api::path("bill.id", id)?;

    service
        .execute(command::CancelBill { bill_id })
        .await
        .map_err(AsError::into_error)
        .map(|b| Json(b.into()))
}

impl AsError for ValidationError {
    fn try_as_error(&self) -> Option<Error> {
        Some(Error::new(
            "INVALID_BILL",
            http::StatusCode::UNPROCESSABLE_ENTITY,
            self,
        ))
    }
}

impl AsError for command::add_bill_charge::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::BillClosed(_) => BillError::Closed.into(),
            Self::BillNotExists(_) => BillError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidBill(e) => return e.try_as_error(),
            Self::OrderAlreadyCharged(_) => {
                BillError::OrderAlreadyCharged.into()
            }
            Self::OrderNotExists(_) => BillError::OrderNotExists.into(),
            Self::OrderOfOtherBooking(_) => {
                BillError::OrderOfOtherBooking.into()
            }
        })
    }
}

impl AsError for command::record_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::BillCancelled(_) => BillError::Cancelled.into(),
            Self::BillNotExists(_) => BillError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidBill(e) => return e.try_as_error(),
        })
    }
}

impl AsError for command::cancel_bill::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::AlreadyCancelled(_) => BillError::Cancelled.into(),
            Self::BillNotExists(_) => BillError::NotExists.into(),
            Self::BillPaid(_) => BillError::Paid.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidBill(e) => return e.try_as_error(),
        })
    }
}
