//! Service [`Order`]-related definitions.

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
    domain::{self, booking, hotel, order},
    query, Command as _, Query as _,
};

use crate::{api, define_error, AsError, Error, Service};

/// Service order placed by a guest during a stay.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// ID of this [`Order`].
    pub id: order::Id,

    /// ID of the booking this [`Order`] is charged to.
    pub booking_id: booking::Id,

    /// ID of the hotel this [`Order`] was placed in.
    pub hotel_id: hotel::Id,

    /// Type of the ordered service.
    pub service_type: order::ServiceType,

    /// Name of the ordered service.
    pub service_name: order::ServiceName,

    /// Charged amount.
    pub amount: Money,

    /// [`DateTime`] when this [`Order`] was placed.
    #[serde(with = "datetime::serde::rfc3339")]
    pub placed_at: order::PlacementDateTime,
}

impl From<domain::Order> for Order {
    fn from(order: domain::Order) -> Self {
        let domain::Order {
            id,
            booking_id,
            hotel_id,
            service_type,
            service_name,
            amount,
            placed_at,
        } = order;
        Self {
            id,
            booking_id,
            hotel_id,
            service_type,
            service_name,
            amount,
            placed_at,
        }
    }
}

/// Request for placing a new [`Order`].
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRequest {
    /// Type of the ordered service.
    pub service_type: order::ServiceType,

    /// Name of the ordered service.
    pub service_name: order::ServiceName,

    /// Amount to charge, in the booking currency.
    pub amount: Money,

    /// [`DateTime`] of the [`Order`]. Current one, if omitted.
    #[serde(default, with = "datetime::serde::rfc3339::option")]
    pub placed_at: Option<order::PlacementDateTime>,
}

define_error! {
    enum OrderError {
        #[code = "CURRENCY_MISMATCH"]
        #[status = BAD_REQUEST]
        #[message = "`Order` amount must be in the booking currency"]
        CurrencyMismatch,

        #[code = "NEGATIVE_AMOUNT"]
        #[status = BAD_REQUEST]
        #[message = "`Order` amount must not be negative"]
        NegativeAmount,

        #[code = "PLACED_BEFORE_CHECK_IN"]
        #[status = BAD_REQUEST]
        #[message = "`Order` cannot be placed before the check-in"]
        PlacedBeforeCheckIn,

        #[code = "PLACED_AFTER_CHECK_OUT"]
        #[status = BAD_REQUEST]
        #[message = "`Order` cannot be placed after the check-out"]
        PlacedAfterCheckOut,
    }
}

/// Lists all the [`Order`]s of the booking with the provided ID, oldest
/// first.
///
/// # Errors
///
/// Possible error codes:
/// - `BOOKING_NOT_EXISTS` - the booking does not exist.
#[tracing::instrument(skip_all, fields(booking.id = tracing::field::Empty))]
pub async fn list(
    Extension(service): Extension<Service>,
    id: Result<Path<booking::Id>, PathRejection>,
) -> Result<Json<Vec<Order>>, Error> {
    let id = api::path("booking.id", id)?;

    if service
        .execute(query::booking::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .is_none()
    {
        return Err(api::booking::BookingError::NotExists.into());
    }

    let orders = service
        .execute(query::order::ByBooking::by(id))
        .await
        .map_err(AsError::into_error)?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Places a new [`Order`] on the booking with the provided ID.
///
/// A checked-out booking accepts [`Order`]s made during its stay. They are
/// charged separately to its bill.
///
/// # Errors
///
/// Possible error codes:
/// - `BOOKING_NOT_EXISTS` - the booking does not exist;
/// - `WRONG_BOOKING_STATUS` - the guest has never checked in;
/// - `CURRENCY_MISMATCH` - the amount is not in the booking currency;
/// - `NEGATIVE_AMOUNT` - the amount is below zero;
/// - `PLACED_BEFORE_CHECK_IN` - the [`Order`] predates the check-in;
/// - `PLACED_AFTER_CHECK_OUT` - the [`Order`] is later than the check-out.
#[tracing::instrument(skip_all, fields(booking.id = tracing::field::Empty))]
pub async fn place(
    Extension(service): Extension<Service>,
    id: Result<Path<booking::Id>, PathRejection>,
    req: Result<Json<PlaceRequest>, JsonRejection>,
) -> Result<(http::StatusCode, Json<Order>), Error> {
    let booking_id = api::path("booking.id", id)?;
    let PlaceRequest {
        service_type,
        service_name,
        amount,
        placed_at,
    } = api::body(req)?;

    let order = service
        .execute(command::PlaceServiceOrder {
            booking_id,
            service_type,
            service_name,
            amount,
            placed_at: placed_at.unwrap_or_else(|| DateTime::now().coerce()),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((http::StatusCode::CREATED, Json(order.into())))
}

impl AsError for command::place_service_order::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::booking::BookingError;

        Some(match self {
            Self::BookingNotExists(_) => BookingError::NotExists.into(),
            Self::CurrencyMismatch(_) => OrderError::CurrencyMismatch.into(),
            Self::Db(e) => return e.try_as_error(),
            Self::NegativeAmount(_) => OrderError::NegativeAmount.into(),
            Self::PlacedAfterCheckOut => OrderError::PlacedAfterCheckOut.into(),
            Self::PlacedBeforeCheckIn => OrderError::PlacedBeforeCheckIn.into(),
            Self::WrongBookingStatus(_) => api::booking::wrong_status(self),
        })
    }
}

#[cfg(test)]
mod spec {
    use service::{command::place_service_order::ExecutionError, domain::order};

    use crate::AsError as _;

    use super::PlaceRequest;

    #[test]
    fn rejects_order_after_check_out() {
        let err = ExecutionError::PlacedAfterCheckOut.as_error();

        assert_eq!(err.code, "PLACED_AFTER_CHECK_OUT");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn deserializes_place_request() {
        let req: PlaceRequest = serde_json::from_str(
            r#"{
                "serviceType": "room_service",
                "serviceName": "Club sandwich",
                "amount": {"amount": "12.40", "currency": "USD"},
                "placedAt": "2024-03-02T21:15:00Z"
            }"#,
        )
        .unwrap();

        assert_eq!(req.service_type, order::ServiceType::RoomService);
        assert_eq!(req.service_name.to_string(), "Club sandwich");
        assert_eq!(req.amount.amount.to_string(), "12.40");
        assert!(req.placed_at.is_some());
    }

    #[test]
    fn rejects_malformed_service_name() {
        let res = serde_json::from_str::<PlaceRequest>(
            r#"{
                "serviceType": "spa",
                "serviceName": "x",
                "amount": {"amount": "80.00", "currency": "USD"}
            }"#,
        );

        assert!(res.is_err());
    }
}
