//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<User>, user::Username>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let username: user::Username = by.into_inner();

        const SQL: &str = "\
            SELECT username, name, email, phone, \
                   is_booking, created_at \
            FROM users \
            WHERE username = $1::VARCHAR";
        Ok(self
            .query_opt(SQL, &[&username])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| User {
                username: row.get("username"),
                name: row.get("name"),
                email: row.get("email"),
                phone: row.get("phone"),
                is_booking: row.get("is_booking"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            username,
            name,
            email,
            phone,
            is_booking,
            created_at,
        } = user;

        const SQL: &str = "\
            INSERT INTO users (\
                username, name, email, phone, \
                is_booking, created_at \
            ) VALUES (\
                $1::VARCHAR, $2::VARCHAR, $3::VARCHAR, $4::VARCHAR, \
                $5::BOOLEAN, $6::TIMESTAMPTZ \
            )";
        self.exec(
            SQL,
            &[&username, &name, &email, &phone, &is_booking, &created_at],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<User>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let User {
            username,
            name,
            email,
            phone,
            is_booking,
            created_at: _,
        } = user;

        const SQL: &str = "\
            UPDATE users \
            SET name = $2::VARCHAR, \
                email = $3::VARCHAR, \
                phone = $4::VARCHAR, \
                is_booking = $5::BOOLEAN \
            WHERE username = $1::VARCHAR";
        self.exec(SQL, &[&username, &name, &email, &phone, &is_booking])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Lock<By<User, user::Username>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<User, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let username: user::Username = by.into_inner();

        const SQL: &str = "\
            SELECT username \
            FROM users \
            WHERE username = $1::VARCHAR \
            FOR UPDATE";
        self.query_opt(SQL, &[&username])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
