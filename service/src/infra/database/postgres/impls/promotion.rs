//! [`Promotion`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{promotion, Promotion},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Promotion>, promotion::Code>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Promotion>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Promotion>, promotion::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let code: promotion::Code = by.into_inner();

        const SQL: &str = "\
            SELECT code, description, discount, \
                   starts_at, ends_at \
            FROM promotions \
            WHERE code = $1::VARCHAR";
        Ok(self
            .query_opt(SQL, &[&code])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Promotion {
                code: row.get("code"),
                description: row.get("description"),
                discount: row.get("discount"),
                starts_at: row.get("starts_at"),
                ends_at: row.get("ends_at"),
            }))
    }
}

impl<C> Database<Insert<Promotion>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(promotion): Insert<Promotion>,
    ) -> Result<Self::Ok, Self::Err> {
        let Promotion {
            code,
            description,
            discount,
            starts_at,
            ends_at,
        } = promotion;

        const SQL: &str = "\
            INSERT INTO promotions (\
                code, description, discount, \
                starts_at, ends_at \
            ) VALUES (\
                $1::VARCHAR, $2::VARCHAR, $3::NUMERIC, \
                $4::TIMESTAMPTZ, $5::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[&code, &description, &discount, &starts_at, &ends_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}
