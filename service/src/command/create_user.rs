//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Rollback, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{Email, Name, Phone, Username};
use crate::{
    domain::{user, User},
    infra::database::{self, transaction, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Username`] of a new [`User`].
    pub username: user::Username,

    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Phone`] of a new [`User`].
    pub phone: user::Phone,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<User>, user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>
        + Database<Rollback, Ok = (), Err = Traced<database::Error>>
        + Clone,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            username,
            name,
            email,
            phone,
        } = cmd;

        let user = transaction::run(self.database(), |tx| async move {
            let existing = tx
                .execute(Select(By::<Option<User>, _>::new(username.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if existing.is_some() {
                return Err(tracerr::new!(E::UsernameOccupied(username)));
            }

            let user = User {
                username,
                name,
                email,
                phone,
                is_booking: false,
                created_at: DateTime::now().coerce(),
            };
            tx.execute(Insert(user.clone())).await.map_err(|e| {
                if e.as_ref().is_constraint_violation() {
                    tracerr::new!(E::UsernameOccupied(user.username.clone()))
                } else {
                    tracerr::map_from(e)
                }
            })?;

            Ok::<_, Traced<E>>(user)
        })
        .await?;

        log::info!("`User({})` created", user.username);

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Failed to roll back the changes after another failure.
    #[display("Rollback failed: {rollback}, after: {cause}")]
    RollbackFailed {
        /// Error the changes were rolled back because of.
        cause: Box<Self>,

        /// Error of the rollback itself.
        rollback: database::Error,
    },

    /// [`Username`] is already occupied.
    #[display("`{_0}` username is occupied")]
    UsernameOccupied(#[error(not(source))] user::Username),
}

impl transaction::Failure for ExecutionError {
    fn rollback_failed(cause: Self, rollback: database::Error) -> Self {
        Self::RollbackFailed {
            cause: Box::new(cause),
            rollback,
        }
    }
}

#[cfg(test)]
mod spec {
    use crate::command::{fixture, Command as _};

    use super::{CreateUser, ExecutionError};

    #[tokio::test]
    async fn rejects_occupied_username() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        assert!(!alice.is_booking);

        let err = svc
            .execute(CreateUser {
                username: alice.username.clone(),
                name: alice.name.clone(),
                email: alice.email.clone(),
                phone: alice.phone.clone(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UsernameOccupied(_)));
        assert_eq!(svc.database().snapshot().await.users.len(), 1);
    }
}
