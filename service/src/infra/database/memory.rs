//! In-memory [`Database`] implementation.

use std::{collections::HashMap, sync::Arc};

use common::operations::{By, Commit, Insert, Lock, Select, Transact, Update};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{bill, booking, order, Bill, Booking, Order},
    infra::{database, Database},
};

/// [`Database`] keeping everything in the process memory.
///
/// Transactions are not isolated: writes are visible right away, [`Lock`]s
/// and [`Commit`]s do nothing. Suitable for tests and local runs only.
#[derive(Clone, Debug, Default)]
pub struct Memory(Arc<RwLock<Storage>>);

/// Entities stored in a [`Memory`] database.
#[derive(Debug, Default)]
struct Storage {
    /// Stored [`Booking`]s.
    bookings: HashMap<booking::Id, Booking>,

    /// Stored [`Order`]s.
    orders: HashMap<order::Id, Order>,

    /// Stored [`Bill`]s.
    bills: HashMap<bill::Id, Bill>,
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Booking>, booking::Id>>> for Memory {
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.bookings.get(&by.into_inner()).cloned())
    }
}

impl Database<Insert<Booking>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.0.write().await.bookings.insert(booking.id, booking);
        Ok(())
    }
}

impl Database<Update<Booking>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Insert(booking)).await
    }
}

impl Database<Lock<By<Booking, booking::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Order>, order::Id>>> for Memory {
    type Ok = Option<Order>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Order>, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.orders.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<Order>, booking::Id>>> for Memory {
    type Ok = Vec<Order>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Order>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking_id = by.into_inner();
        let mut orders = self
            .0
            .read()
            .await
            .orders
            .values()
            .filter(|o| o.booking_id == booking_id)
            .cloned()
            .collect::<Vec<_>>();
        orders.sort_by_key(|o| (o.placed_at, o.id));
        Ok(orders)
    }
}

impl Database<Insert<Order>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(order): Insert<Order>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.0.write().await.orders.insert(order.id, order);
        Ok(())
    }
}

impl Database<Select<By<Option<Bill>, bill::Id>>> for Memory {
    type Ok = Option<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bill>, bill::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.0.read().await.bills.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Option<Bill>, booking::Id>>> for Memory {
    type Ok = Option<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bill>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking_id = by.into_inner();
        Ok(self
            .0
            .read()
            .await
            .bills
            .values()
            .find(|b| b.booking_id == booking_id)
            .cloned())
    }
}

impl Database<Insert<Bill>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(bill): Insert<Bill>,
    ) -> Result<Self::Ok, Self::Err> {
        _ = self.0.write().await.bills.insert(bill.id, bill);
        Ok(())
    }
}

impl Database<Update<Bill>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(bill): Update<Bill>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Insert(bill)).await
    }
}

impl Database<Lock<By<Bill, bill::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Bill, bill::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}
