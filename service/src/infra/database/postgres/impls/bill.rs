//! [`Bill`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Currency, Money,
};
use postgres_types::Json;
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{
        bill::{self, Extra, OrderCharge, Payment, Stay},
        booking, Bill,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of a [`Bill`] row.
const COLUMNS: &str = "\
    id, booking_id, hotel_id, guest_id, room_id, employee_id, \
    currency, \
    check_in, check_out, nights, room_charges, \
    order_charges, extras, \
    subtotal, tax, grand_total, \
    payment_method, card_type, last_four_digits, transaction_id, \
    payment_status, payment_date, \
    status, \
    created_at, updated_at";

/// Builds a [`Bill`] out of the provided [`COLUMNS`] `row`.
fn from_row(row: &Row) -> Bill {
    let currency: Currency = row.get("currency");
    let money = |column: &str| Money {
        amount: row.get(column),
        currency,
    };
    Bill {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        hotel_id: row.get("hotel_id"),
        guest_id: row.get("guest_id"),
        room_id: row.get("room_id"),
        employee_id: row.get("employee_id"),
        currency,
        stay: Stay {
            check_in: row.get("check_in"),
            check_out: row.get("check_out"),
            nights: u16::try_from(row.get::<_, i32>("nights"))
                .unwrap_or(u16::MAX),
            room_charges: money("room_charges"),
        },
        order_charges: row
            .get::<_, Json<Vec<OrderCharge>>>("order_charges")
            .0,
        extras: row.get::<_, Json<Vec<Extra>>>("extras").0,
        subtotal: money("subtotal"),
        tax: money("tax"),
        grand_total: money("grand_total"),
        payment: Payment {
            method: row.get("payment_method"),
            card_type: row.get("card_type"),
            last_four_digits: row.get("last_four_digits"),
            transaction_id: row.get("transaction_id"),
            status: row.get("payment_status"),
            date: row.get("payment_date"),
        },
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl<C> Database<Select<By<Option<Bill>, bill::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bill>, bill::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: bill::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bills \
             WHERE id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Option<Bill>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Bill>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bill>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let booking_id: booking::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bills \
             WHERE booking_id = $1::UUID \
             LIMIT 1",
        );
        Ok(self
            .query_opt(&sql, &[&booking_id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Insert<Bill>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Bill>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(bill): Insert<Bill>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(bill)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Bill>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(bill): Update<Bill>,
    ) -> Result<Self::Ok, Self::Err> {
        let Bill {
            id,
            booking_id,
            hotel_id,
            guest_id,
            room_id,
            employee_id,
            currency,
            stay:
                Stay {
                    check_in,
                    check_out,
                    nights,
                    room_charges,
                },
            order_charges,
            extras,
            subtotal,
            tax,
            grand_total,
            payment,
            status,
            created_at,
            updated_at,
        } = bill;

        let nights = i32::from(nights);
        let order_charges = Json(order_charges);
        let extras = Json(extras);

        const SQL: &str = "\
            INSERT INTO bills (\
                id, booking_id, hotel_id, guest_id, room_id, employee_id, \
                currency, \
                check_in, check_out, nights, room_charges, \
                order_charges, extras, \
                subtotal, tax, grand_total, \
                payment_method, card_type, last_four_digits, transaction_id, \
                payment_status, payment_date, \
                status, \
                created_at, updated_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, $5::UUID, $6::UUID, \
                $7::INT2, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ, $10::INT4, $11::NUMERIC, \
                $12::JSONB, $13::JSONB, \
                $14::NUMERIC, $15::NUMERIC, $16::NUMERIC, \
                $17::INT2, $18::VARCHAR, $19::VARCHAR, $20::VARCHAR, \
                $21::INT2, $22::TIMESTAMPTZ, \
                $23::INT2, \
                $24::TIMESTAMPTZ, $25::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET check_in = EXCLUDED.check_in, \
                check_out = EXCLUDED.check_out, \
                nights = EXCLUDED.nights, \
                room_charges = EXCLUDED.room_charges, \
                order_charges = EXCLUDED.order_charges, \
                extras = EXCLUDED.extras, \
                subtotal = EXCLUDED.subtotal, \
                tax = EXCLUDED.tax, \
                grand_total = EXCLUDED.grand_total, \
                payment_method = EXCLUDED.payment_method, \
                card_type = EXCLUDED.card_type, \
                last_four_digits = EXCLUDED.last_four_digits, \
                transaction_id = EXCLUDED.transaction_id, \
                payment_status = EXCLUDED.payment_status, \
                payment_date = EXCLUDED.payment_date, \
                status = EXCLUDED.status, \
                updated_at = EXCLUDED.updated_at";
        self.exec(
            SQL,
            &[
                &id,
                &booking_id,
                &hotel_id,
                &guest_id,
                &room_id,
                &employee_id,
                &currency,
                &check_in,
                &check_out,
                &nights,
                &room_charges.amount,
                &order_charges,
                &extras,
                &subtotal.amount,
                &tax.amount,
                &grand_total.amount,
                &payment.method,
                &payment.card_type,
                &payment.last_four_digits,
                &payment.transaction_id,
                &payment.status,
                &payment.date,
                &status,
                &created_at,
                &updated_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Bill, bill::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Bill, bill::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: bill::Id = by.into_inner();

        const SQL: &str = "\
            INSERT INTO bills_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
