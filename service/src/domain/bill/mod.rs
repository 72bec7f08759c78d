//! [`Bill`] definitions and its totals engine.
//!
//! A [`Bill`] is never persisted as is. Callers run it through
//! [`Bill::prepare_for_save()`] and then [`Bill::validate()`] before handing
//! it to a [`Database`].
//!
//! [`Database`]: crate::infra::Database

pub mod charge;
pub mod payment;
mod validation;

#[cfg(doc)]
use common::DateTime;
use common::{
    define_kind,
    money::{self, Total},
    unit, Currency, DateTimeOf, Money, Percent,
};
use rust_decimal::Decimal;

use super::{booking, employee, guest, hotel, room};

pub use self::{
    charge::{Extra, OrderCharge},
    payment::Payment,
    validation::ValidationError,
};

/// Tax rate applied to the subtotal of every [`Bill`].
#[expect(unsafe_code, reason = "constant in range")]
pub const TAX_RATE: Percent = unsafe { Percent::new_unchecked(Decimal::TEN) };

/// Financial record summarizing the charges of a guest stay and its
/// [`Payment`].
#[derive(Clone, Debug)]
pub struct Bill {
    /// ID of this [`Bill`].
    pub id: Id,

    /// ID of the [`Booking`] this [`Bill`] is issued for.
    ///
    /// [`Booking`]: super::Booking
    pub booking_id: booking::Id,

    /// ID of the hotel issuing this [`Bill`].
    pub hotel_id: hotel::Id,

    /// ID of the billed guest.
    pub guest_id: guest::Id,

    /// ID of the room the guest stayed in.
    pub room_id: room::Id,

    /// ID of the employee who processed the checkout.
    pub employee_id: employee::Id,

    /// [`Currency`] of every amount on this [`Bill`].
    pub currency: Currency,

    /// [`Stay`] this [`Bill`] is issued for.
    pub stay: Stay,

    /// [`OrderCharge`]s of this [`Bill`].
    pub order_charges: Vec<OrderCharge>,

    /// [`Extra`] charges of this [`Bill`].
    pub extras: Vec<Extra>,

    /// Sum of all the charges.
    pub subtotal: Money,

    /// Tax taken from the [`Bill::subtotal`] at the [`TAX_RATE`].
    pub tax: Money,

    /// Amount to be paid.
    pub grand_total: Money,

    /// [`Payment`] of this [`Bill`].
    pub payment: Payment,

    /// [`Status`] of this [`Bill`].
    pub status: Status,

    /// [`DateTime`] when this [`Bill`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Bill`] was modified last time.
    pub updated_at: ModificationDateTime,
}

impl Bill {
    /// Recalculates [`Bill::subtotal`], [`Bill::tax`] and
    /// [`Bill::grand_total`] from the charges.
    ///
    /// Every step is rounded to cents, so calling it again on unchanged
    /// charges gives the same totals.
    ///
    /// # Errors
    ///
    /// With [`ValidationError::AmountOverflow`] if the totals don't fit into
    /// a [`Decimal`]. The stored totals are left untouched then.
    pub fn calculate_totals(&mut self) -> Result<(), ValidationError> {
        let subtotal = money::round(self.charges_sum()?);
        let tax = TAX_RATE
            .of(subtotal)
            .map(money::round)
            .ok_or(ValidationError::AmountOverflow)?;
        let grand_total = subtotal
            .checked_add(tax)
            .map(money::round)
            .ok_or(ValidationError::AmountOverflow)?;

        self.subtotal = Money::new(subtotal, self.currency);
        self.tax = Money::new(tax, self.currency);
        self.grand_total = Money::new(grand_total, self.currency);
        Ok(())
    }

    /// Returns the unrounded sum of all the charges of this [`Bill`].
    fn charges_sum(&self) -> Result<Decimal, ValidationError> {
        let Total(orders) =
            Total::of(self.order_charges.iter().map(|c| &c.amount))
                .ok_or(ValidationError::AmountOverflow)?;
        let Total(extras) = Total::of(self.extras.iter().map(|e| &e.amount))
            .ok_or(ValidationError::AmountOverflow)?;
        self.stay
            .room_charges
            .amount
            .checked_add(orders)
            .and_then(|sum| sum.checked_add(extras))
            .ok_or(ValidationError::AmountOverflow)
    }

    /// Aligns [`Bill::status`] with the [`Payment`] status.
    ///
    /// A [`payment::Status::Failed`] payment leaves the [`Status`] as is.
    pub fn sync_status_from_payment(&mut self) {
        match self.payment.status {
            payment::Status::Completed => self.status = Status::Paid,
            payment::Status::Pending => self.status = Status::Pending,
            payment::Status::Failed => {}
        }
    }

    /// Returns this [`Bill`] with recalculated totals and the [`Status`]
    /// synced with its [`Payment`].
    ///
    /// # Errors
    ///
    /// See [`Bill::calculate_totals()`].
    pub fn prepare_for_save(mut self) -> Result<Self, ValidationError> {
        self.calculate_totals()?;
        self.sync_status_from_payment();
        Ok(self)
    }

    /// Returns the number of started days of the [`Stay`].
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        self.stay.duration_days()
    }

    /// Returns the room charges per night of the [`Stay`].
    #[must_use]
    pub fn average_daily_rate(&self) -> Money {
        let Stay {
            nights,
            room_charges,
            ..
        } = self.stay;
        let rate = room_charges
            .amount
            .checked_div(Decimal::from(nights))
            .map_or(Decimal::ZERO, money::round);
        Money::new(rate, room_charges.currency)
    }

    /// Indicates whether charges still may be added to this [`Bill`].
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.status, Status::Paid | Status::Cancelled)
    }
}

super::define_id!(#[doc = "ID of a [`Bill`]."]);

define_kind! {
    #[doc = "Status of a [`Bill`]."]
    enum Status {
        #[doc = "[`Bill`] awaits its [`Payment`]."]
        Pending = 1,

        #[doc = "[`Bill`] is paid in full."]
        Paid = 2,

        #[doc = "[`Bill`] is paid in part."]
        PartiallyPaid = 3,

        #[doc = "[`Bill`] is cancelled."]
        Cancelled = 4,
    }
}

/// Guest stay a [`Bill`] is issued for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Stay {
    /// [`DateTime`] when the guest checked in.
    pub check_in: booking::CheckInDateTime,

    /// [`DateTime`] when the guest checked out.
    pub check_out: booking::CheckOutDateTime,

    /// Number of nights the guest stayed.
    pub nights: u16,

    /// Charges for the room over all the nights.
    pub room_charges: Money,
}

impl Stay {
    /// Returns the number of started days between the check-in and the
    /// check-out.
    #[must_use]
    pub fn duration_days(&self) -> i64 {
        self.check_in.days_until(&self.check_out)
    }
}

/// [`DateTime`] when a [`Bill`] was created.
pub type CreationDateTime = DateTimeOf<(Bill, unit::Creation)>;

/// [`DateTime`] when a [`Bill`] was modified.
pub type ModificationDateTime = DateTimeOf<(Bill, unit::Modification)>;

#[cfg(test)]
pub(crate) mod spec {
    use common::{Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use super::{
        charge::Description, payment, Bill, Extra, Id, OrderCharge, Payment,
        Status, Stay, ValidationError,
    };
    use crate::domain::{booking, employee, guest, hotel, order, room};

    pub(crate) fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    pub(crate) fn usd(s: &str) -> Money {
        Money::new(decimal(s), Currency::Usd)
    }

    pub(crate) fn at<Of: ?Sized>(s: &str) -> common::DateTimeOf<Of> {
        DateTime::from_rfc3339(s).unwrap().coerce()
    }

    pub(crate) fn order_charge(amount: &str, date: &str) -> OrderCharge {
        OrderCharge {
            order_id: order::Id::new(),
            service_type: order::ServiceType::Restaurant,
            service_name: order::ServiceName::new("Dinner").unwrap(),
            amount: usd(amount),
            date: at(date),
        }
    }

    pub(crate) fn extra(amount: &str) -> Extra {
        Extra {
            description: Description::new("Late checkout").unwrap(),
            amount: usd(amount),
        }
    }

    /// Pending [`Bill`] for a 3-night stay from 2024-03-01 to 2024-03-04.
    pub(crate) fn bill() -> Bill {
        Bill {
            id: Id::new(),
            booking_id: booking::Id::new(),
            hotel_id: hotel::Id::new(),
            guest_id: guest::Id::new(),
            room_id: room::Id::new(),
            employee_id: employee::Id::new(),
            currency: Currency::Usd,
            stay: Stay {
                check_in: at("2024-03-01T14:00:00Z"),
                check_out: at("2024-03-04T11:00:00Z"),
                nights: 3,
                room_charges: usd("200"),
            },
            order_charges: vec![
                order_charge("50", "2024-03-02T19:30:00Z"),
                order_charge("25", "2024-03-03T08:15:00Z"),
            ],
            extras: vec![extra("10")],
            subtotal: usd("0"),
            tax: usd("0"),
            grand_total: usd("0"),
            payment: Payment {
                method: payment::Method::Cash,
                card_type: None,
                last_four_digits: None,
                transaction_id: None,
                status: payment::Status::Pending,
                date: at("2024-03-04T11:00:00Z"),
            },
            status: Status::Pending,
            created_at: at("2024-03-04T11:00:00Z"),
            updated_at: at("2024-03-04T11:00:00Z"),
        }
    }

    #[test]
    fn calculates_totals() {
        let mut bill = bill();
        bill.calculate_totals().unwrap();

        assert_eq!(bill.subtotal, usd("285.00"));
        assert_eq!(bill.tax, usd("28.50"));
        assert_eq!(bill.grand_total, usd("313.50"));
    }

    #[test]
    fn rounds_every_step_to_cents() {
        let mut bill = bill();
        bill.stay.room_charges = usd("100.004");
        bill.order_charges =
            vec![order_charge("0.001", "2024-03-02T10:00:00Z")];
        bill.extras = vec![extra("0.05")];
        bill.calculate_totals().unwrap();

        assert_eq!(bill.subtotal.amount, decimal("100.06"));
        assert_eq!(bill.tax.amount, decimal("10.01"));
        assert_eq!(bill.grand_total.amount, decimal("110.07"));
        assert_eq!(bill.grand_total.amount.scale(), 2);
    }

    #[test]
    fn calculates_totals_without_charges() {
        let mut bill = bill();
        bill.order_charges.clear();
        bill.extras.clear();
        bill.calculate_totals().unwrap();

        assert_eq!(bill.subtotal, usd("200"));
        assert_eq!(bill.tax, usd("20"));
        assert_eq!(bill.grand_total, usd("220"));
    }

    #[test]
    fn totals_are_idempotent() {
        let mut once = bill();
        once.stay.room_charges = usd("333.335");
        once.calculate_totals().unwrap();

        let mut twice = once.clone();
        twice.calculate_totals().unwrap();

        assert_eq!(once.subtotal, twice.subtotal);
        assert_eq!(once.tax, twice.tax);
        assert_eq!(once.grand_total, twice.grand_total);
    }

    #[test]
    fn rejects_overflowing_totals() {
        let mut bill = bill();
        bill.stay.room_charges = Money::new(Decimal::MAX, Currency::Usd);

        assert_eq!(
            bill.calculate_totals(),
            Err(ValidationError::AmountOverflow),
        );
        assert_eq!(bill.subtotal, usd("0"));
        assert_eq!(bill.validate(), Err(ValidationError::AmountOverflow));

        // Subtotal fits, but the tax on it doesn't.
        bill.stay.room_charges = usd("10000000000000000000000000000");
        bill.order_charges.clear();
        bill.extras.clear();
        assert!(bill.prepare_for_save().is_err());
    }

    #[test]
    fn completed_payment_marks_paid() {
        for status in [Status::Pending, Status::PartiallyPaid, Status::Paid] {
            let mut bill = bill();
            bill.status = status;
            bill.payment.status = payment::Status::Completed;

            assert_eq!(bill.prepare_for_save().unwrap().status, Status::Paid);
        }
    }

    #[test]
    fn pending_payment_marks_pending() {
        for status in [Status::Paid, Status::PartiallyPaid, Status::Cancelled] {
            let mut bill = bill();
            bill.status = status;
            bill.payment.status = payment::Status::Pending;

            let bill = bill.prepare_for_save().unwrap();
            assert_eq!(bill.status, Status::Pending);
        }
    }

    #[test]
    fn failed_payment_keeps_status() {
        let statuses =
            [Status::Pending, Status::PartiallyPaid, Status::Cancelled];
        for status in statuses {
            let mut bill = bill();
            bill.status = status;
            bill.payment.status = payment::Status::Failed;

            assert_eq!(bill.prepare_for_save().unwrap().status, status);
        }
    }

    #[test]
    fn prepares_totals_for_save() {
        let bill = bill().prepare_for_save().unwrap();

        assert_eq!(bill.grand_total, usd("313.50"));
        assert_eq!(bill.validate(), Ok(()));
    }

    #[test]
    fn computes_virtuals() {
        let mut bill = bill();
        assert_eq!(bill.duration_days(), 3);
        assert_eq!(bill.average_daily_rate(), usd("66.67"));

        bill.stay.nights = 0;
        assert_eq!(bill.average_daily_rate(), usd("0"));
    }

    #[test]
    fn paid_and_cancelled_bills_are_closed() {
        let mut bill = bill();
        assert!(bill.is_open());

        bill.status = Status::PartiallyPaid;
        assert!(bill.is_open());

        bill.status = Status::Paid;
        assert!(!bill.is_open());

        bill.status = Status::Cancelled;
        assert!(!bill.is_open());
    }
}
