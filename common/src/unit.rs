//! Marker types distinguishing [`DateTimeOf`] kinds of the same entity.
//!
//! [`DateTimeOf`]: crate::DateTimeOf

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing the last modification of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker type describing a guest arrival.
#[derive(Clone, Copy, Debug)]
pub struct CheckIn;

/// Marker type describing a guest departure.
#[derive(Clone, Copy, Debug)]
pub struct CheckOut;

/// Marker type describing the moment a charge was incurred.
#[derive(Clone, Copy, Debug)]
pub struct Charge;

/// Marker type describing the moment a payment was attempted.
#[derive(Clone, Copy, Debug)]
pub struct Payment;
