//! [`Booking`]-related [`Database`] implementations.

use std::num::NonZeroU16;

use common::{
    operations::{By, Insert, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, user, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read::{self, booking::Validated},
};

/// Columns of a [`Booking`] row.
const COLUMNS: &str = "\
    id, username, homestay_id, promotion, status, booked_at, \
    checkin_date, checkout_date, num_guests, \
    service_fee, service_fee_currency, tax_rate";

/// Builds a [`Booking`] out of the provided [`Row`] having [`COLUMNS`].
fn from_row(row: &Row) -> Booking {
    Booking {
        id: row.get("id"),
        username: row.get("username"),
        homestay_id: row.get("homestay_id"),
        promotion: row.get("promotion"),
        status: row.get("status"),
        booked_at: row.get("booked_at"),
        checkin_date: row.get("checkin_date"),
        checkout_date: row.get("checkout_date"),
        num_guests: u16::try_from(row.get::<_, i32>("num_guests"))
            .ok()
            .and_then(NonZeroU16::new)
            .expect("`num_guests` out of range"),
        service_fee: Money {
            amount: row.get("service_fee"),
            currency: row.get("service_fee_currency"),
        },
        tax_rate: row.get("tax_rate"),
    }
}

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

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE id = $1::VARCHAR",
        );
        self.query_opt(&sql, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(|row| row.as_ref().map(from_row))
    }
}

impl<C> Database<Select<By<Vec<Booking>, user::Username>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let username: user::Username = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE username = $1::VARCHAR \
             ORDER BY booked_at DESC",
        );
        Ok(self
            .query(&sql, &[&username])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Validated<Booking>>, read::booking::Stay>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Validated<Booking>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Validated<Booking>>, read::booking::Stay>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::Stay {
            homestay_id,
            checkin_date,
            checkout_date,
        } = by.into_inner();

        let sql = format!(
            "SELECT {COLUMNS} \
             FROM bookings \
             WHERE homestay_id = $1::UUID \
               AND status = $2::INT2 \
               AND checkin_date < $4::DATE \
               AND checkout_date > $3::DATE",
        );
        Ok(self
            .query(
                &sql,
                &[
                    &homestay_id,
                    &booking::Status::Validated,
                    &checkin_date,
                    &checkout_date,
                ],
            )
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| Validated(from_row(row)))
            .collect())
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            username,
            homestay_id,
            promotion,
            status,
            booked_at,
            checkin_date,
            checkout_date,
            num_guests,
            service_fee,
            tax_rate,
        } = booking;

        let num_guests = i32::from(num_guests.get());

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, username, homestay_id, promotion, status, booked_at, \
                checkin_date, checkout_date, num_guests, \
                service_fee, service_fee_currency, tax_rate \
            ) VALUES (\
                $1::VARCHAR, $2::VARCHAR, $3::UUID, $4::VARCHAR, \
                $5::INT2, $6::TIMESTAMPTZ, \
                $7::DATE, $8::DATE, $9::INT4, \
                $10::NUMERIC, $11::INT2, $12::NUMERIC \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &username,
                &homestay_id,
                &promotion,
                &status,
                &booked_at,
                &checkin_date,
                &checkout_date,
                &num_guests,
                &service_fee.amount,
                &service_fee.currency,
                &tax_rate,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
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
            status,
            checkin_date,
            checkout_date,
            ..
        } = booking;

        // Only the state of a `Booking` ever changes after its creation.
        const SQL: &str = "\
            UPDATE bookings \
            SET status = $2::INT2, \
                checkin_date = $3::DATE, \
                checkout_date = $4::DATE \
            WHERE id = $1::VARCHAR";
        self.exec(SQL, &[&id, &status, &checkin_date, &checkout_date])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
