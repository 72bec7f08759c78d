//! [`Command`] for recording a [`Payment`] of a [`Bill`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        bill::{self, Payment, ValidationError},
        Bill,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for recording a [`Payment`] of a [`Bill`].
///
/// Replaces the current [`Payment`] of the [`Bill`], so its [`bill::Status`]
/// follows the new one.
#[derive(Clone, Debug)]
pub struct RecordPayment {
    /// ID of the paid [`Bill`].
    pub bill_id: bill::Id,

    /// [`Payment`] to record.
    pub payment: Payment,
}

impl<Db> Command<RecordPayment> for Service<Db>
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

    async fn execute(
        &self,
        cmd: RecordPayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RecordPayment { bill_id, payment } = cmd;

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

        if bill.status == bill::Status::Cancelled {
            return Err(tracerr::new!(E::BillCancelled(bill_id)));
        }

        bill.payment = payment;
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
            "`Bill(id: {bill_id})` payment recorded as `{}`, bill is `{}`",
            bill.payment.status,
            bill.status,
        );

        Ok(bill)
    }
}

/// Error of [`RecordPayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Bill`] is cancelled.
    #[display("`Bill(id: {_0})` is cancelled")]
    BillCancelled(#[error(not(source))] bill::Id),

    /// [`Bill`] with the provided ID does not exist.
    #[display("`Bill(id: {_0})` does not exist")]
    BillNotExists(#[error(not(source))] bill::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Paid [`Bill`] violates its invariants.
    #[display("Invalid bill: {_0}")]
    InvalidBill(ValidationError),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{
            spec::{cash, checked_in, checked_out, service},
            CancelBill, Command as _,
        },
        domain::bill::{self, payment, Payment, ValidationError},
        query,
    };

    use super::{ExecutionError, RecordPayment};

    fn transfer(status: payment::Status) -> Payment {
        Payment {
            method: payment::Method::BankTransfer,
            transaction_id: payment::TransactionId::new("TRX-20240304-17"),
            ..cash(status)
        }
    }

    #[tokio::test]
    async fn marks_bill_paid() {
        let svc = service();
        let booking = checked_in(&svc).await;
        let bill =
            checked_out(&svc, booking.id, cash(payment::Status::Pending)).await;

        let paid = svc
            .execute(RecordPayment {
                bill_id: bill.id,
                payment: transfer(payment::Status::Completed),
            })
            .await
            .unwrap();
        assert_eq!(paid.status, bill::Status::Paid);
        assert_eq!(paid.grand_total, bill.grand_total);

        let stored = svc
            .execute(query::bill::ById::by(bill.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, bill::Status::Paid);
        assert_eq!(stored.payment.method, payment::Method::BankTransfer);
    }

    #[tokio::test]
    async fn keeps_status_on_failed_payment() {
        let svc = service();
        let booking = checked_in(&svc).await;
        let bill =
            checked_out(&svc, booking.id, cash(payment::Status::Pending)).await;

        let bill = svc
            .execute(RecordPayment {
                bill_id: bill.id,
                payment: transfer(payment::Status::Failed),
            })
            .await
            .unwrap();

        assert_eq!(bill.status, bill::Status::Pending);
        assert_eq!(bill.payment.status, payment::Status::Failed);
    }

    #[tokio::test]
    async fn rejects_payment_without_transaction_id() {
        let svc = service();
        let booking = checked_in(&svc).await;
        let bill =
            checked_out(&svc, booking.id, cash(payment::Status::Pending)).await;

        let err = svc
            .execute(RecordPayment {
                bill_id: bill.id,
                payment: Payment {
                    transaction_id: None,
                    ..transfer(payment::Status::Completed)
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::InvalidBill(ValidationError::TransactionIdRequired),
        ));
    }

    #[tokio::test]
    async fn rejects_cancelled_bill() {
        let svc = service();
        let booking = checked_in(&svc).await;
        let bill =
            checked_out(&svc, booking.id, cash(payment::Status::Pending)).await;
        _ = svc.execute(CancelBill { bill_id: bill.id }).await.unwrap();

        let err = svc
            .execute(RecordPayment {
                bill_id: bill.id,
                payment: cash(payment::Status::Completed),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::BillCancelled(_)));
    }
}
