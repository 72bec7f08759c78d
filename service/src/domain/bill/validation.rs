//! [`Bill`] consistency checks.

use common::Money;
use derive_more::{Display, Error};
use rust_decimal::Decimal;

use crate::domain::order;

use super::{payment, Bill, Status, Stay};

/// Maximum difference tolerated between a stored total and the recalculated
/// one.
const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Violated [`Bill`] invariant.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum ValidationError {
    /// [`Stay`] check-out is not after its check-in.
    #[display("Check-out date must be after check-in date")]
    CheckOutNotAfterCheckIn,

    /// [`Stay`] nights don't match its duration.
    #[display("Number of nights must match the stay duration")]
    NightsMismatch,

    /// An amount is in a [`Currency`] other than the [`Bill`] one.
    ///
    /// [`Currency`]: common::Currency
    #[display("`{_0}` must be in the bill currency")]
    CurrencyMismatch(#[error(not(source))] &'static str),

    /// An amount is below zero.
    #[display("`{_0}` must not be negative")]
    NegativeAmount(#[error(not(source))] &'static str),

    /// [`OrderCharge`] was made outside of the [`Stay`].
    ///
    /// [`OrderCharge`]: super::OrderCharge
    #[display("Order charge date must be within the stay period")]
    OrderChargeOutsideStay(#[error(not(source))] order::Id),

    /// [`Bill::subtotal`] doesn't match the charges.
    #[display("Subtotal does not match the sum of all charges")]
    SubtotalMismatch,

    /// [`Bill::grand_total`] doesn't match the subtotal and tax.
    #[display("Grand total does not match the sum of subtotal and tax")]
    GrandTotalMismatch,

    /// Totals of the [`Bill`] don't fit into a [`Decimal`].
    #[display("Bill totals exceed the supported amount range")]
    AmountOverflow,

    /// Card [`Payment`] has no [`payment::CardType`].
    ///
    /// [`Payment`]: super::Payment
    #[display("Card type is required for credit/debit card payments")]
    CardTypeRequired,

    /// Card [`Payment`] has no [`payment::LastFourDigits`].
    ///
    /// [`Payment`]: super::Payment
    #[display("Last four digits are required for credit/debit card payments")]
    LastFourDigitsRequired,

    /// Non-cash [`Payment`] has no [`payment::TransactionId`].
    ///
    /// [`Payment`]: super::Payment
    #[display("Transaction ID is required for non-cash payments")]
    TransactionIdRequired,

    /// [`Status::Paid`] [`Bill`] has an incomplete [`Payment`].
    ///
    /// [`Payment`]: super::Payment
    #[display("Bill cannot be marked as paid unless payment is completed")]
    PaidWithoutCompletedPayment,

    /// [`Status::Cancelled`] [`Bill`] has a completed [`Payment`].
    ///
    /// [`Payment`]: super::Payment
    #[display("Cancelled bill cannot have a completed payment")]
    CancelledWithCompletedPayment,
}

impl Stay {
    /// Checks the check-out of this [`Stay`] follows its check-in, and the
    /// nights match its duration.
    ///
    /// # Errors
    ///
    /// With the [`ValidationError`] of the first violated invariant.
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.check_out.coerce::<()>() <= self.check_in.coerce() {
            return Err(ValidationError::CheckOutNotAfterCheckIn);
        }
        if i64::from(self.nights) != self.duration_days() {
            return Err(ValidationError::NightsMismatch);
        }
        Ok(())
    }
}

impl Bill {
    /// Checks every invariant of this [`Bill`].
    ///
    /// Stored totals are compared with the charges as they are, without
    /// recalculation, so a [`Bill`] should be validated after
    /// [`Bill::prepare_for_save()`].
    ///
    /// # Errors
    ///
    /// With the [`ValidationError`] of the first violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        use ValidationError as E;

        self.stay.check()?;
        self.check_amounts()?;
        for charge in &self.order_charges {
            charge.check_within(&self.stay)?;
        }

        // Amounts are non-negative here, so only sums may overflow.
        if (self.subtotal.amount - self.charges_sum()?).abs() > TOLERANCE {
            return Err(E::SubtotalMismatch);
        }
        let total = self
            .subtotal
            .amount
            .checked_add(self.tax.amount)
            .ok_or(E::AmountOverflow)?;
        if (self.grand_total.amount - total).abs() > TOLERANCE {
            return Err(E::GrandTotalMismatch);
        }

        self.payment.check_details()?;

        let completed = self.payment.status == payment::Status::Completed;
        match self.status {
            Status::Paid if !completed => Err(E::PaidWithoutCompletedPayment),
            Status::Cancelled if completed => {
                Err(E::CancelledWithCompletedPayment)
            }
            Status::Pending
            | Status::Paid
            | Status::PartiallyPaid
            | Status::Cancelled => Ok(()),
        }
    }

    /// Checks every amount of this [`Bill`] is non-negative and in its
    /// [`Currency`].
    ///
    /// [`Currency`]: common::Currency
    fn check_amounts(&self) -> Result<(), ValidationError> {
        let amounts = [
            ("room_charges", &self.stay.room_charges),
            ("subtotal", &self.subtotal),
            ("tax", &self.tax),
            ("grand_total", &self.grand_total),
        ]
        .into_iter()
        .chain(self.order_charges.iter().map(|c| ("order_charges", &c.amount)))
        .chain(self.extras.iter().map(|e| ("extras", &e.amount)));

        for (field, amount) in amounts {
            check_amount(field, amount, self)?;
        }
        Ok(())
    }
}

/// Checks the provided `amount` of the `field` is valid for the `bill`.
fn check_amount(
    field: &'static str,
    amount: &Money,
    bill: &Bill,
) -> Result<(), ValidationError> {
    if amount.currency != bill.currency {
        return Err(ValidationError::CurrencyMismatch(field));
    }
    if amount.is_negative() {
        return Err(ValidationError::NegativeAmount(field));
    }
    Ok(())
}

#[cfg(test)]
mod spec {
    use common::{Currency, Money};

    use super::ValidationError;
    use crate::domain::bill::{
        payment,
        spec::{at, bill, decimal, order_charge, usd},
        Status,
    };

    #[test]
    fn accepts_prepared_bill() {
        assert_eq!(bill().prepare_for_save().unwrap().validate(), Ok(()));
    }

    #[test]
    fn rejects_check_out_not_after_check_in() {
        let mut bill = bill();
        bill.stay.check_out = at("2024-03-01T14:00:00Z");
        let bill = bill.prepare_for_save().unwrap();

        assert_eq!(
            bill.validate(),
            Err(ValidationError::CheckOutNotAfterCheckIn),
        );
        assert_eq!(
            ValidationError::CheckOutNotAfterCheckIn.to_string(),
            "Check-out date must be after check-in date",
        );

        let mut bill = bill;
        bill.stay.check_out = at("2024-02-28T14:00:00Z");
        assert_eq!(
            bill.validate(),
            Err(ValidationError::CheckOutNotAfterCheckIn),
        );
    }

    #[test]
    fn rejects_nights_mismatch() {
        let mut bill = bill();
        bill.stay.nights = 2;

        assert_eq!(
            bill.prepare_for_save().unwrap().validate(),
            Err(ValidationError::NightsMismatch),
        );
    }

    #[test]
    fn rejects_order_charge_after_check_out() {
        let mut bill = bill();
        let late = order_charge("15", "2024-03-04T11:00:01Z");
        let order_id = late.order_id;
        bill.order_charges.push(late);

        let err = bill.prepare_for_save().unwrap().validate().unwrap_err();
        assert_eq!(err, ValidationError::OrderChargeOutsideStay(order_id));
        assert_eq!(
            err.to_string(),
            "Order charge date must be within the stay period",
        );
    }

    #[test]
    fn rejects_order_charge_before_check_in() {
        let mut bill = bill();
        bill.order_charges = vec![order_charge("15", "2024-03-01T13:59:59Z")];

        assert!(matches!(
            bill.prepare_for_save().unwrap().validate(),
            Err(ValidationError::OrderChargeOutsideStay(_)),
        ));
    }

    #[test]
    fn accepts_order_charges_on_stay_bounds() {
        let mut bill = bill();
        bill.order_charges = vec![
            order_charge("1", "2024-03-01T14:00:00Z"),
            order_charge("2", "2024-03-04T11:00:00Z"),
        ];

        assert_eq!(bill.prepare_for_save().unwrap().validate(), Ok(()));
    }

    #[test]
    fn rejects_stale_subtotal() {
        let mut bill = bill().prepare_for_save().unwrap();
        bill.extras[0].amount = usd("10.02");

        assert_eq!(bill.validate(), Err(ValidationError::SubtotalMismatch));
        assert_eq!(
            ValidationError::SubtotalMismatch.to_string(),
            "Subtotal does not match the sum of all charges",
        );
    }

    #[test]
    fn tolerates_a_cent_of_difference() {
        let mut bill = bill().prepare_for_save().unwrap();
        bill.extras[0].amount = usd("10.01");
        bill.grand_total = usd("313.51");

        assert_eq!(bill.validate(), Ok(()));
    }

    #[test]
    fn rejects_stale_grand_total() {
        let mut bill = bill().prepare_for_save().unwrap();
        bill.tax = usd("28.52");

        assert_eq!(bill.validate(), Err(ValidationError::GrandTotalMismatch));
        assert_eq!(
            ValidationError::GrandTotalMismatch.to_string(),
            "Grand total does not match the sum of subtotal and tax",
        );
    }

    #[test]
    fn rejects_card_payment_without_card_type() {
        let mut bill = bill();
        bill.payment.method = payment::Method::CreditCard;
        bill.payment.last_four_digits = payment::LastFourDigits::new("4242");
        bill.payment.transaction_id = payment::TransactionId::new("ch_1");

        let err = bill.prepare_for_save().unwrap().validate().unwrap_err();
        assert_eq!(err, ValidationError::CardTypeRequired);
        assert_eq!(
            err.to_string(),
            "Card type is required for credit/debit card payments",
        );
    }

    #[test]
    fn rejects_paid_status_without_completed_payment() {
        let mut bill = bill().prepare_for_save().unwrap();
        bill.status = Status::Paid;

        let err = bill.validate().unwrap_err();
        assert_eq!(err, ValidationError::PaidWithoutCompletedPayment);
        assert_eq!(
            err.to_string(),
            "Bill cannot be marked as paid unless payment is completed",
        );
    }

    #[test]
    fn rejects_cancelled_status_with_completed_payment() {
        let mut bill = bill().prepare_for_save().unwrap();
        bill.payment.status = payment::Status::Completed;
        bill.status = Status::Cancelled;

        let err = bill.validate().unwrap_err();
        assert_eq!(err, ValidationError::CancelledWithCompletedPayment);
        assert_eq!(
            err.to_string(),
            "Cancelled bill cannot have a completed payment",
        );

        bill.payment.status = payment::Status::Failed;
        assert_eq!(bill.validate(), Ok(()));
    }

    #[test]
    fn accepts_partially_paid_status() {
        let mut bill = bill().prepare_for_save().unwrap();
        bill.status = Status::PartiallyPaid;

        assert_eq!(bill.validate(), Ok(()));
    }

    #[test]
    fn rejects_negative_amounts() {
        let mut bill = bill();
        bill.extras[0].amount = usd("-10");

        assert_eq!(
            bill.prepare_for_save().unwrap().validate(),
            Err(ValidationError::NegativeAmount("extras")),
        );
    }

    #[test]
    fn rejects_foreign_currency() {
        let mut bill = bill();
        bill.order_charges[1].amount =
            Money::new(decimal("25"), Currency::Eur);

        assert_eq!(
            bill.prepare_for_save().unwrap().validate(),
            Err(ValidationError::CurrencyMismatch("order_charges")),
        );
    }
}
