//! [`Homestay`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{homestay, Homestay},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Homestay>, homestay::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Homestay>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Homestay>, homestay::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: homestay::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, description, address, \
                   num_beds, capacity, \
                   price, price_currency, \
                   status, created_at \
            FROM homestays \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Homestay {
                id: row.get("id"),
                description: row.get("description"),
                address: row.get("address"),
                num_beds: u16::try_from(row.get::<_, i32>("num_beds"))
                    .expect("`num_beds` overflow"),
                capacity: u16::try_from(row.get::<_, i32>("capacity"))
                    .expect("`capacity` overflow"),
                price: Money {
                    amount: row.get("price"),
                    currency: row.get("price_currency"),
                },
                status: row.get("status"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<Homestay>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(homestay): Insert<Homestay>,
    ) -> Result<Self::Ok, Self::Err> {
        let Homestay {
            id,
            description,
            address,
            num_beds,
            capacity,
            price,
            status,
            created_at,
        } = homestay;

        let num_beds = i32::from(num_beds);
        let capacity = i32::from(capacity);

        const SQL: &str = "\
            INSERT INTO homestays (\
                id, description, address, \
                num_beds, capacity, \
                price, price_currency, \
                status, created_at \
            ) VALUES (\
                $1::UUID, $2::VARCHAR, $3::VARCHAR, \
                $4::INT4, $5::INT4, \
                $6::NUMERIC, $7::INT2, \
                $8::INT2, $9::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[
                &id,
                &description,
                &address,
                &num_beds,
                &capacity,
                &price.amount,
                &price.currency,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Homestay>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(homestay): Update<Homestay>,
    ) -> Result<Self::Ok, Self::Err> {
        let Homestay {
            id,
            description,
            address,
            num_beds,
            capacity,
            price,
            status,
            created_at: _,
        } = homestay;

        let num_beds = i32::from(num_beds);
        let capacity = i32::from(capacity);

        const SQL: &str = "\
            UPDATE homestays \
            SET description = $2::VARCHAR, \
                address = $3::VARCHAR, \
                num_beds = $4::INT4, \
                capacity = $5::INT4, \
                price = $6::NUMERIC, \
                price_currency = $7::INT2, \
                status = $8::INT2 \
            WHERE id = $1::UUID";
        self.exec(
            SQL,
            &[
                &id,
                &description,
                &address,
                &num_beds,
                &capacity,
                &price.amount,
                &price.currency,
                &status,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Lock<By<Homestay, homestay::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Homestay, homestay::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: homestay::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM homestays \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
