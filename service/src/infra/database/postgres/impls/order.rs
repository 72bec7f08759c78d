//! [`Order`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, order, Order},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

/// Columns of an [`Order`] row.
const COLUMNS: &str = "\
    id, booking_id, hotel_id, \
    service_type, service_name, \
    amount, currency, \
    placed_at";

/// Builds an [`Order`] out of the provided [`COLUMNS`] `row`.
fn from_row(row: &Row) -> Order {
    Order {
        id: row.get("id"),
        booking_id: row.get("booking_id"),
        hotel_id: row.get("hotel_id"),
        service_type: row.get("service_type"),
        service_name: row.get("service_name"),
        amount: Money {
            amount: row.get("amount"),
            currency: row.get("currency"),
        },
        placed_at: row.get("placed_at"),
    }
}

impl<C> Database<Select<By<Option<Order>, order::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Order>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Order>, order::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: order::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM orders \
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

impl<C> Database<Select<By<Vec<Order>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Order>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Order>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let booking_id: booking::Id = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM orders \
             WHERE booking_id = $1::UUID \
             ORDER BY placed_at ASC, id ASC",
        );
        Ok(self
            .query(&sql, &[&booking_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Insert<Order>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(order): Insert<Order>,
    ) -> Result<Self::Ok, Self::Err> {
        let Order {
            id,
            booking_id,
            hotel_id,
            service_type,
            service_name,
            amount,
            placed_at,
        } = order;

        const SQL: &str = "\
            INSERT INTO orders (\
                id, booking_id, hotel_id, \
                service_type, service_name, \
                amount, currency, \
                placed_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::INT2, $5::VARCHAR, \
                $6::NUMERIC, $7::INT2, \
                $8::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &booking_id,
                &hotel_id,
                &service_type,
                &service_name,
                &amount.amount,
                &amount.currency,
                &placed_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
