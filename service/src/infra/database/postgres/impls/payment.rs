//! [`Payment`]-related [`Database`] implementations.

use std::ops::RangeInclusive;

use common::{
    operations::{By, Insert, Select, Update},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{booking, payment, Payment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Payment>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let booking_id: booking::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, booking_id, \
                   amount, amount_currency, \
                   status, paid_at, method \
            FROM payments \
            WHERE booking_id = $1::VARCHAR";
        Ok(self
            .query_opt(SQL, &[&booking_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Payment {
                id: row.get("id"),
                booking_id: row.get("booking_id"),
                amount: Money {
                    amount: row.get("amount"),
                    currency: row.get("amount_currency"),
                },
                status: row.get("status"),
                paid_at: row.get("paid_at"),
                method: row.get("method"),
            }))
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            booking_id,
            amount,
            status,
            paid_at,
            method,
        } = payment;

        const SQL: &str = "\
            INSERT INTO payments (\
                id, booking_id, \
                amount, amount_currency, \
                status, paid_at, method \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, \
                $3::NUMERIC, $4::INT2, \
                $5::INT2, $6::TIMESTAMPTZ, $7::INT2 \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &booking_id,
                &amount.amount,
                &amount.currency,
                &status,
                &paid_at,
                &method,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            status,
            paid_at,
            method,
            ..
        } = payment;

        const SQL: &str = "\
            UPDATE payments \
            SET status = $2::INT2, \
                paid_at = $3::TIMESTAMPTZ, \
                method = $4::INT2 \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&id, &status, &paid_at, &method])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Select<
            By<
                Vec<read::income::Total>,
                RangeInclusive<payment::PaymentDateTime>,
            >,
        >,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::income::Total>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                Vec<read::income::Total>,
                RangeInclusive<payment::PaymentDateTime>,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let (start, end) = by.into_inner().into_inner();

        const SQL: &str = "\
            SELECT amount_currency, \
                   SUM(amount) AS amount, \
                   COUNT(*)::INT4 AS payments \
            FROM payments \
            WHERE status = $1::INT2 \
              AND paid_at BETWEEN $2::TIMESTAMPTZ AND $3::TIMESTAMPTZ \
            GROUP BY amount_currency \
            ORDER BY amount_currency";
        Ok(self
            .query(SQL, &[&payment::Status::Paid, &start, &end])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| read::income::Total {
                amount: Money {
                    amount: row.get("amount"),
                    currency: row.get("amount_currency"),
                },
                payments: row.get::<_, i32>("payments").into(),
            })
            .collect())
    }
}
