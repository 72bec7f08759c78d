//! [`Command`] definition.

pub mod add_bill_charge;
pub mod cancel_bill;
pub mod check_in_booking;
pub mod create_booking;
pub mod place_service_order;
pub mod process_checkout;
pub mod record_payment;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    add_bill_charge::AddBillCharge, cancel_bill::CancelBill,
    check_in_booking::CheckInBooking, create_booking::CreateBooking,
    place_service_order::PlaceServiceOrder, process_checkout::ProcessCheckout,
    record_payment::RecordPayment,
};
