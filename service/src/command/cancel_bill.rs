//! [`Command`] for cancelling a [`Bill`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        bill::{self, payment, ValidationError},
        Bill,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Bill`].
///
/// A pending [`Payment`] of the [`Bill`] is marked as failed.
///
/// [`Payment`]: bill::Payment
#[derive(Clone, Copy, Debug)]
pub struct CancelBill {
    /// ID of the [`Bill`] to be cancelled.
    pub bill_id: bill::Id,
}

impl<Db> Command<CancelBill> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Bill, bill::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Bill>, bill::Id>>,
            Ok = Option<Bill>,
            Err = Traced<database::Error>,
        > + Database<Update<Bill>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Bill;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CancelBill) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelBill { bill_id } = cmd;

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

        match (bill.status, bill.payment.status) {
            (bill::Status::Cancelled, _) => {
                return Err(tracerr::new!(E::AlreadyCancelled(bill_id)));
            }
            (_, payment::Status::Completed) => {
                return Err(tracerr::new!(E::BillPaid(bill_id)));
            }
            (_, payment::Status::Pending) => {
                // Otherwise the status sync reverts the cancellation.
                bill.payment.status = payment::Status::Failed;
            }
            (_, payment::Status::Failed) => {}
        }

        bill.status = bill::Status::Cancelled;
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

        log::info!("`Bill(id: {bill_id})` cancelled");

        Ok(bill)
    }
}

/// Error of [`CancelBill`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Bill`] is cancelled already.
    #[display("`Bill(id: {_0})` is cancelled already")]
    AlreadyCancelled(#[error(not(source))] bill::Id),

    /// [`Bill`] with the provided ID does not exist.
    #[display("`Bill(id: {_0})` does not exist")]
    BillNotExists(#[error(not(source))] bill::Id),

    /// [`Bill`] has a completed payment.
    #[display("`Bill(id: {_0})` is paid and cannot be cancelled")]
    BillPaid(#[error(not(source))] bill::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Cancelled [`Bill`] violates its invariants.
    #[display("Invalid bill: {_0}")]
    InvalidBill(ValidationError),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{
            spec::{cash, checked_in, checked_out, service},
            Command as _, RecordPayment,
        },
        domain::bill::{self, payment},
        query,
    };

    use super::{CancelBill, ExecutionError};

    #[tokio::test]
    async fn cancels_pending_bill() {
        let svc = service();
        let booking = checked_in(&svc).await;
        let bill =
            checked_out(&svc, booking.id, cash(payment::Status::Pending)).await;

        let cancelled =
            svc.execute(CancelBill { bill_id: bill.id }).await.unwrap();
        assert_eq!(cancelled.status, bill::Status::Cancelled);
        assert_eq!(cancelled.payment.status, payment::Status::Failed);

        let stored = svc
            .execute(query::bill::ById::by(bill.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, bill::Status::Cancelled);
    }

    #[tokio::test]
    async fn cancels_bill_with_failed_payment() {
        let svc = service();
        let booking = checked_in(&svc).await;
        let bill =
            checked_out(&svc, booking.id, cash(payment::Status::Pending)).await;
        _ = svc
            .execute(RecordPayment {
                bill_id: bill.id,
                payment: cash(payment::Status::Failed),
            })
            .await
            .unwrap();

        let cancelled =
            svc.execute(CancelBill { bill_id: bill.id }).await.unwrap();
        assert_eq!(cancelled.status, bill::Status::Cancelled);
    }

    #[tokio::test]
    async fn rejects_paid_bill() {
        let svc = service();
        let booking = checked_in(&svc).await;
        let bill =
            checked_out(&svc, booking.id, cash(payment::Status::Completed))
                .await;

        let err = svc
            .execute(CancelBill { bill_id: bill.id })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::BillPaid(_)));
    }

    #[tokio::test]
    async fn rejects_second_cancellation() {
        let svc = service();
        let booking = checked_in(&svc).await;
        let bill =
            checked_out(&svc, booking.id, cash(payment::Status::Pending)).await;
        _ = svc.execute(CancelBill { bill_id: bill.id }).await.unwrap();

        let err = svc
            .execute(CancelBill { bill_id: bill.id })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::AlreadyCancelled(_)));
    }
}
