//! [`Command`] for adding a charge to an issued [`Bill`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        bill::{self, OrderCharge, ValidationError},
        booking, order, Bill, Order,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for adding a charge to an issued [`Bill`].
#[derive(Clone, Debug)]
pub enum AddBillCharge {
    /// Charges an [`Order`] of the [`Bill`]'s [`Booking`].
    ///
    /// [`Booking`]: crate::domain::Booking
    Order {
        /// ID of the [`Bill`] to charge.
        bill_id: bill::Id,

        /// ID of the [`Order`] to be charged.
        order_id: order::Id,
    },

    /// Charges a [`bill::Extra`].
    Extra {
        /// ID of the [`Bill`] to charge.
        bill_id: bill::Id,

        /// [`bill::Extra`] to be charged.
        extra: bill::Extra,
    },
}

impl AddBillCharge {
    /// Returns ID of the [`Bill`] to charge.
    #[must_use]
    pub const fn bill_id(&self) -> bill::Id {
        match self {
            Self::Order { bill_id, .. } | Self::Extra { bill_id, .. } => {
                *bill_id
            }
        }
    }
}

impl<Db> Command<AddBillCharge> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Bill, bill::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Bill>, bill::Id>>,
            Ok = Option<Bill>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Order>, order::Id>>,
            Ok = Option<Order>,
            Err = Traced<database::Error>,
        > + Database<Update<Bill>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Bill;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AddBillCharge,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let bill_id = cmd.bill_id();

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Lock(By::new(bill_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut bill = tx
            .execute(Select(By::<Option<Bill>, _>::new(bill_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BillNotExists(bill_id))
            .map_err(tracerr::wrap!())?;

        if !bill.is_open() {
            return Err(tracerr::new!(E::BillClosed(bill.status)));
        }

        match cmd {
            AddBillCharge::Order { order_id, .. } => {
                let order = tx
                    .execute(Select(By::<Option<Order>, _>::new(order_id)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or(E::OrderNotExists(order_id))
                    .map_err(tracerr::wrap!())?;

                if order.booking_id != bill.booking_id {
                    return Err(tracerr::new!(E::OrderOfOtherBooking(
                        order.booking_id
                    )));
                }
                if bill.order_charges.iter().any(|c| c.order_id == order_id) {
                    return Err(tracerr::new!(E::OrderAlreadyCharged(
                        order_id
                    )));
                }

                bill.order_charges.push(OrderCharge::from(order));
            }
            AddBillCharge::Extra { extra, .. } => bill.extras.push(extra),
        }

        bill.updated_at = DateTime::now().coerce();
        let bill = bill
            .prepare_for_save()
            .and_then(|b| b.validate().map(|()| b))
            .map_err(E::InvalidBill)
            .map_err(tracerr::wrap!())?;

        tx.execute(Update(bill.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "`Bill(id: {bill_id})` charged, grand total is {}",
            bill.grand_total,
        );

        Ok(bill)
    }
}

/// Error of [`AddBillCharge`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Bill`] is already paid or cancelled.
    #[display("`Bill` cannot be charged while `{_0}`")]
    BillClosed(#[error(not(source))] bill::Status),

    /// [`Bill`] with the provided ID does not exist.
    #[display("`Bill(id: {_0})` does not exist")]
    BillNotExists(#[error(not(source))] bill::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Charged [`Bill`] violates its invariants.
    #[display("Invalid bill: {_0}")]
    InvalidBill(ValidationError),

    /// [`Order`] is charged to the [`Bill`] already.
    #[display("`Order(id: {_0})` is charged already")]
    OrderAlreadyCharged(#[error(not(source))] order::Id),

    /// [`Order`] with the provided ID does not exist.
    #[display("`Order(id: {_0})` does not exist")]
    OrderNotExists(#[error(not(source))] order::Id),

    /// [`Order`] is placed on a [`Booking`] other than the [`Bill`] one.
    ///
    /// [`Booking`]: crate::domain::Booking
    #[display("`Order` belongs to another `Booking(id: {_0})`")]
    OrderOfOtherBooking(#[error(not(source))] booking::Id),
}
