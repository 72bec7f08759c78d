//! Checkout definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Extension, Json,
};
use common::{datetime, DateTime};
use serde::Deserialize;
use service::{
    command,
    domain::{bill::Extra, booking, employee},
    query, Command as _, Query as _,
};

use crate::{
    api::{self, bill::BillError, booking::BookingError, Bill},
    AsError, Error, Service,
};

/// Request for checking a guest out.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    /// ID of the booking to check out.
    pub booking_id: booking::Id,

    /// ID of the employee processing the checkout.
    pub employee_id: employee::Id,

    /// [`DateTime`] of the checkout. Current one, if omitted.
    #[serde(default, with = "datetime::serde::rfc3339::option")]
    pub checked_out_at: Option<booking::CheckOutDateTime>,

    /// Miscellaneous charges of the stay.
    #[serde(default)]
    pub extras: Vec<Extra>,

    /// Payment of the issued [`Bill`].
    pub payment: api::bill::Payment,
}

/// Checks the guest of a booking out, issuing its [`Bill`].
///
/// # Errors
///
/// Possible error codes:
/// - `BOOKING_NOT_EXISTS` - the booking does not exist;
/// - `WRONG_BOOKING_STATUS` - the guest is not checked in;
/// - `INVALID_BILL` - the issued [`Bill`] is inconsistent.
#[tracing::instrument(skip_all, fields(booking.id = tracing::field::Empty))]
pub async fn process(
    Extension(service): Extension<Service>,
    req: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<(http::StatusCode, Json<Bill>), Error> {
    let ProcessRequest {
        booking_id,
        employee_id,
        checked_out_at,
        extras,
        payment,
    } = api::body(req)?;
    _ = tracing::Span::current()
        .record("booking.id", tracing::field::display(booking_id));

    let bill = service
        .execute(command::ProcessCheckout {
            booking_id,
            employee_id,
            checked_out_at: checked_out_at
                .unwrap_or_else(|| DateTime::now().coerce()),
            extras,
            payment: payment.into(),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(bill.into())))
}

/// Returns the [`Bill`] issued at checkout of the booking with the provided
/// ID.
///
/// # Errors
///
/// Possible error codes:
/// - `BILL_NOT_EXISTS` - the booking is not checked out yet.
#[tracing::instrument(skip_all, fields(booking.id = tracing::field::Empty))]
pub async fn details(
    Extension(service): Extension<Service>,
    id: Result<Path<booking::Id>, PathRejection>,
) -> Result<Json<Bill>, Error> {
    let id = api::path("booking.id", id)?;

    service
        .execute(query::bill::ByBooking::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| BillError::NotExists.into())
        .map(|b| Json(b.into()))
}

impl AsError for command::process_checkout::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::BookingNotExists(_) => BookingError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidBill(e) => return e.try_as_error(),
            Self::WrongBookingStatus(_) => api::booking::wrong_status(self),
        })
    }
}

#[cfg(test)]
mod spec {
    use super::ProcessRequest;

    #[test]
    fn deserializes_process_request() {
        let req: ProcessRequest = serde_json::from_str(
            r#"{
                "bookingId": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "employeeId": "67e55044-10b1-426f-9247-bb680e5fe0c9",
                "checkedOutAt": "2024-03-04T11:00:00Z",
                "extras": [{
                    "description": "Late checkout",
                    "amount": {"amount": "10.00", "currency": "USD"}
                }],
                "payment": {"method": "cash", "status": "pending"}
            }"#,
        )
        .unwrap();

        assert_eq!(req.extras.len(), 1);
        assert!(req.checked_out_at.is_some());
        assert!(req.payment.date.is_none());
    }

    #[test]
    fn extras_are_optional() {
        let req: ProcessRequest = serde_json::from_str(
            r#"{
                "bookingId": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "employeeId": "67e55044-10b1-426f-9247-bb680e5fe0c9",
                "payment": {"method": "cash", "status": "pending"}
            }"#,
        )
        .unwrap();

        assert!(req.extras.is_empty());
        assert!(req.checked_out_at.is_none());
    }
}
