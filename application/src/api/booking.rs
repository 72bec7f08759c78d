//! [`Booking`]-related definitions.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Extension, Json,
};
use common::{datetime, DateTime, Money};
use serde::{Deserialize, Serialize};
use service::{
    command,
    domain::{self, booking, guest, hotel, room},
    query, Command as _, Query as _,
};

use crate::{api, define_error, AsError, Error, Service};

/// Room reservation of a guest in a hotel.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: booking::Id,

    /// ID of the hotel this [`Booking`] is made in.
    pub hotel_id: hotel::Id,

    /// ID of the guest this [`Booking`] is made for.
    pub guest_id: guest::Id,

    /// ID of the booked room.
    pub room_id: room::Id,

    /// Price of a single night in the booked room.
    pub nightly_rate: Money,

    /// Status of this [`Booking`].
    pub status: booking::Status,

    /// [`DateTime`] when this [`Booking`] was created.
    #[serde(with = "datetime::serde::rfc3339")]
    pub created_at: booking::CreationDateTime,

    /// [`DateTime`] when the guest checked in, if any.
    #[serde(with = "datetime::serde::rfc3339::option")]
    pub checked_in_at: Option<booking::CheckInDateTime>,

    /// [`DateTime`] when the guest checked out, if any.
    #[serde(with = "datetime::serde::rfc3339::option")]
    pub checked_out_at: Option<booking::CheckOutDateTime>,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        let domain::Booking {
            id,
            hotel_id,
            guest_id,
            room_id,
            nightly_rate,
            status,
            created_at,
            checked_in_at,
            checked_out_at,
        } = booking;
        Self {
            id,
            hotel_id,
            guest_id,
            room_id,
            nightly_rate,
            status,
            created_at,
            checked_in_at,
            checked_out_at,
        }
    }
}

/// Request for creating a new [`Booking`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// ID of the hotel to make the [`Booking`] in.
    pub hotel_id: hotel::Id,

    /// ID of the guest to make the [`Booking`] for.
    pub guest_id: guest::Id,

    /// ID of the room to book.
    pub room_id: room::Id,

    /// Price of a single night in the room.
    pub nightly_rate: Money,
}

/// Request for checking a guest in.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    /// [`DateTime`] of the check-in. Current one, if omitted.
    #[serde(default, with = "datetime::serde::rfc3339::option")]
    pub checked_in_at: Option<booking::CheckInDateTime>,
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the provided ID does not exist"]
        NotExists,

        #[code = "NEGATIVE_NIGHTLY_RATE"]
        #[status = BAD_REQUEST]
        #[message = "Nightly rate must not be negative"]
        NegativeNightlyRate,
    }
}

/// Creates a new confirmed [`Booking`].
///
/// # Errors
///
/// Possible error codes:
/// - `NEGATIVE_NIGHTLY_RATE` - the provided nightly rate is below zero.
#[tracing::instrument(skip_all, fields(booking.id = tracing::field::Empty))]
pub async fn create(
    Extension(service): Extension<Service>,
    req: Result<Json<CreateRequest>, JsonRejection>,
) -> Result<(http::StatusCode, Json<Booking>), Error> {
    let CreateRequest {
        hotel_id,
        guest_id,
        room_id,
        nightly_rate,
    } = api::body(req)?;

    let booking = service
        .execute(command::CreateBooking {
            hotel_id,
            guest_id,
            room_id,
            nightly_rate,
        })
        .await
        .map_err(AsError::into_error)?;
    _ = tracing::Span::current()
        .record("booking.id", tracing::field::display(booking.id));

    Ok((http::StatusCode::CREATED, Json(booking.into())))
}

/// Returns the [`Booking`] with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `BOOKING_NOT_EXISTS` - the [`Booking`] does not exist.
#[tracing::instrument(skip_all, fields(booking.id = tracing::field::Empty))]
pub async fn get(
    Extension(service): Extension<Service>,
    id: Result<Path<booking::Id>, PathRejection>,
) -> Result<Json<Booking>, Error> {
    let id = api::path("booking.id", id)?;

    service
        .execute(query::booking::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| BookingError::NotExists.into())
        .map(|b| Json(b.into()))
}

/// Checks the guest of the [`Booking`] with the provided ID in.
///
/// # Errors
///
/// Possible error codes:
/// - `BOOKING_NOT_EXISTS` - the [`Booking`] does not exist;
/// - `WRONG_BOOKING_STATUS` - the [`Booking`] is not confirmed.
#[tracing::instrument(skip_all, fields(booking.id = tracing::field::Empty))]
pub async fn check_in(
    Extension(service): Extension<Service>,
    id: Result<Path<booking::Id>, PathRejection>,
    req: Result<Json<CheckInRequest>, JsonRejection>,
) -> Result<Json<Booking>, Error> {
    let booking_id = api::path("booking.id", id)?;
    let CheckInRequest { checked_in_at } = api::body(req)?;

    service
        .execute(command::CheckInBooking {
            booking_id,
            checked_in_at: checked_in_at
                .unwrap_or_else(|| DateTime::now().coerce()),
        })
        .await
        .map_err(AsError::into_error)
        .map(|b| Json(b.into()))
}

/// Returns an [`Error`] of a [`Booking`] being in a status the operation
/// doesn't allow.
pub(crate) fn wrong_status(msg: &impl ToString) -> Error {
    Error::new("WRONG_BOOKING_STATUS", http::StatusCode::CONFLICT, msg)
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::NegativeNightlyRate(_) => {
                BookingError::NegativeNightlyRate.into()
            }
        })
    }
}

impl AsError for command::check_in_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::BookingNotExists(_) => BookingError::NotExists.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::WrongBookingStatus(_) => wrong_status(self),
        })
    }
}

#[cfg(test)]
mod spec {
    use common::{Currency, DateTime, Money};
    use service::domain::{self, booking, guest, hotel, room};

    use super::{Booking, CheckInRequest, CreateRequest};

    #[test]
    fn serializes_in_camel_case() {
        let booking = domain::Booking {
            id: booking::Id::new(),
            hotel_id: hotel::Id::new(),
            guest_id: guest::Id::new(),
            room_id: room::Id::new(),
            nightly_rate: Money::new("200.00".parse().unwrap(), Currency::Usd),
            status: booking::Status::CheckedIn,
            created_at: DateTime::from_rfc3339("2024-02-01T10:00:00Z")
                .unwrap()
                .coerce(),
            checked_in_at: Some(
                DateTime::from_rfc3339("2024-03-01T14:00:00Z")
                    .unwrap()
                    .coerce(),
            ),
            checked_out_at: None,
        };

        let json = serde_json::to_value(Booking::from(booking)).unwrap();

        assert_eq!(json["status"], "checked_in");
        assert_eq!(json["nightlyRate"]["amount"], "200.00");
        assert_eq!(json["nightlyRate"]["currency"], "USD");
        assert_eq!(json["checkedInAt"], "2024-03-01T14:00:00Z");
        assert!(json["checkedOutAt"].is_null());
        assert!(json.get("hotelId").is_some());
    }

    #[test]
    fn deserializes_requests() {
        let req: CreateRequest = serde_json::from_str(
            r#"{
                "hotelId": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "guestId": "67e55044-10b1-426f-9247-bb680e5fe0c9",
                "roomId": "67e55044-10b1-426f-9247-bb680e5fe0ca",
                "nightlyRate": {"amount": "150.50", "currency": "EUR"}
            }"#,
        )
        .unwrap();
        assert_eq!(req.nightly_rate.currency, Currency::Eur);

        let req: CheckInRequest = serde_json::from_str("{}").unwrap();
        assert!(req.checked_in_at.is_none());

        let req: CheckInRequest =
            serde_json::from_str(r#"{"checkedInAt": "2024-03-01T14:00:00Z"}"#)
                .unwrap();
        assert!(req.checked_in_at.is_some());
    }
}
