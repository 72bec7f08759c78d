//! Domain definitions.

pub mod bill;
pub mod booking;
pub mod order;

pub use self::{bill::Bill, booking::Booking, order::Order};

/// Defines a new UUID-backed `Id` type of an entity.
macro_rules! define_id {
    (#[doc = $doc:literal]) => {
        #[derive(
            Clone,
            Copy,
            Debug,
            Default,
            ::serde::Deserialize,
            ::derive_more::Display,
            Eq,
            ::derive_more::From,
            ::derive_more::FromStr,
            Hash,
            ::derive_more::Into,
            Ord,
            PartialEq,
            PartialOrd,
            ::serde::Serialize,
        )]
        #[cfg_attr(
            feature = "postgres",
            derive(::postgres_types::FromSql, ::postgres_types::ToSql),
            postgres(transparent)
        )]
        #[doc = $doc]
        pub struct Id(::uuid::Uuid);

        impl Id {
            /// Creates a new random [`Id`].
            #[must_use]
            pub fn new() -> Self {
                Self(::uuid::Uuid::new_v4())
            }
        }
    };
}
use define_id;

pub mod employee {
    //! Hotel employee references.

    super::define_id!(#[doc = "ID of a hotel employee processing a checkout."]);
}

pub mod guest {
    //! Hotel guest references.

    super::define_id!(#[doc = "ID of a hotel guest."]);
}

pub mod hotel {
    //! Hotel references.

    super::define_id!(#[doc = "ID of a hotel."]);
}

pub mod room {
    //! Hotel room references.

    super::define_id!(#[doc = "ID of a hotel room."]);
}
