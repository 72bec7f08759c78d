//! [`Booking`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{booking, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, hotel_id, guest_id, room_id, \
                   nightly_rate, currency, \
                   status, \
                   created_at, checked_in_at, checked_out_at \
            FROM bookings \
            WHERE id = $1::UUID \
            LIMIT 1";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Booking {
                id: row.get("id"),
                hotel_id: row.get("hotel_id"),
                guest_id: row.get("guest_id"),
                room_id: row.get("room_id"),
                nightly_rate: Money {
                    amount: row.get("nightly_rate"),
                    currency: row.get("currency"),
                },
                status: row.get("status"),
                created_at: row.get("created_at"),
                checked_in_at: row.get("checked_in_at"),
                checked_out_at: row.get("checked_out_at"),
            }))
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
    Self: Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.execute(Update(booking)).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            hotel_id,
            guest_id,
            room_id,
            nightly_rate,
            status,
            created_at,
            checked_in_at,
            checked_out_at,
        } = booking;

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, hotel_id, guest_id, room_id, \
                nightly_rate, currency, \
                status, \
                created_at, checked_in_at, checked_out_at \
            ) VALUES (\
                $1::UUID, $2::UUID, $3::UUID, $4::UUID, \
                $5::NUMERIC, $6::INT2, \
                $7::INT2, \
                $8::TIMESTAMPTZ, $9::TIMESTAMPTZ, $10::TIMESTAMPTZ \
            ) \
            ON CONFLICT (id) DO UPDATE \
            SET hotel_id = EXCLUDED.hotel_id, \
                guest_id = EXCLUDED.guest_id, \
                room_id = EXCLUDED.room_id, \
                nightly_rate = EXCLUDED.nightly_rate, \
                currency = EXCLUDED.currency, \
                status = EXCLUDED.status, \
                created_at = EXCLUDED.created_at, \
                checked_in_at = EXCLUDED.checked_in_at, \
                checked_out_at = EXCLUDED.checked_out_at";
        self.exec(
            SQL,
            &[
                &id,
                &hotel_id,
                &guest_id,
                &room_id,
                &nightly_rate.amount,
                &nightly_rate.currency,
                &status,
                &created_at,
                &checked_in_at,
                &checked_out_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: booking::Id = by.into_inner();

        // Updating the conflicting row holds its lock until the transaction
        // ends.
        const SQL: &str = "\
            INSERT INTO bookings_lock \
            VALUES ($1::UUID) \
            ON CONFLICT (id) DO UPDATE \
            SET id = EXCLUDED.id";
        self.exec(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
