//! [`Query`] collection related to service [`Order`]s.

use common::operations::By;

use crate::domain::{booking, Order};
#[cfg(doc)]
use crate::{domain::Booking, Query};

use super::DatabaseQuery;

/// Queries all the [`Order`]s charged to a [`Booking`], oldest first.
pub type ByBooking = DatabaseQuery<By<Vec<Order>, booking::Id>>;
