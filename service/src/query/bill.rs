//! [`Query`] collection related to a single [`Bill`].

use common::operations::By;

use crate::domain::{bill, booking, Bill};
#[cfg(doc)]
use crate::{domain::Booking, Query};

use super::DatabaseQuery;

/// Queries a [`Bill`] by its [`bill::Id`].
pub type ById = DatabaseQuery<By<Option<Bill>, bill::Id>>;

/// Queries the [`Bill`] issued at checkout of a [`Booking`].
pub type ByBooking = DatabaseQuery<By<Option<Bill>, booking::Id>>;
