//! REST API definitions.

pub mod bill;
pub mod booking;
pub mod checkout;
pub mod order;

use std::fmt;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    routing::{get, post},
    Json, Router,
};

use crate::{AsError as _, Error};

pub use self::{bill::Bill, booking::Booking, order::Order};

/// Builds the [`Router`] of the whole REST API.
///
/// Handlers expect the [`Service`] to be provided as an [`Extension`] layer.
///
/// [`Extension`]: axum::Extension
/// [`Service`]: crate::Service
pub fn router() -> Router {
    Router::new()
        .route("/bookings", post(booking::create))
        .route("/bookings/:id", get(booking::get))
        .route("/bookings/:id/check-in", post(booking::check_in))
        .route("/bookings/:id/orders", get(order::list).post(order::place))
        .route("/checkout/process", post(checkout::process))
        .route("/checkout/details/booking/:id", get(checkout::details))
        .route("/bills/:id", get(bill::get))
        .route("/bills/:id/charges", post(bill::add_charge))
        .route("/bills/:id/payment", post(bill::record_payment))
        .route("/bills/:id/cancel", post(bill::cancel))
}

/// Unwraps the extracted path parameter, recording it as the `field` of the
/// current [`tracing::Span`].
fn path<T: fmt::Display>(
    field: &'static str,
    extracted: Result<Path<T>, PathRejection>,
) -> Result<T, Error> {
    let Path(value) = extracted.map_err(|e| e.into_error())?;
    _ = tracing::Span::current()
        .record(field, tracing::field::display(&value));
    Ok(value)
}

/// Unwraps the extracted JSON body of a request.
fn body<T>(extracted: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    extracted.map(|Json(v)| v).map_err(|e| e.into_error())
}
