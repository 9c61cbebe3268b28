//! [`Command`] for updating a [`homestay::Status`].

use common::operations::{
    By, Commit, Lock, Rollback, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{homestay, Homestay},
    infra::database::{self, transaction, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`homestay::Status`].
#[derive(Clone, Copy, Debug)]
pub struct UpdateHomestayStatus {
    /// ID of the [`Homestay`] to update.
    pub homestay_id: homestay::Id,

    /// New [`homestay::Status`].
    pub status: homestay::Status,
}

impl<Db> Command<UpdateHomestayStatus> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Homestay, homestay::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Homestay>, homestay::Id>>,
            Ok = Option<Homestay>,
            Err = Traced<database::Error>,
        > + Database<Update<Homestay>, Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>
        + Database<Rollback, Ok = (), Err = Traced<database::Error>>
        + Clone,
{
    type Ok = Homestay;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateHomestayStatus,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateHomestayStatus {
            homestay_id,
            status,
        } = cmd;

        let homestay = transaction::run(self.database(), |tx| async move {
            // Avoid racing with bookings of the same `Homestay`.
            tx.execute(Lock(By::<Homestay, _>::new(homestay_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            let mut homestay = tx
                .execute(Select(By::<Option<Homestay>, _>::new(homestay_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::HomestayNotExists(homestay_id))
                .map_err(tracerr::wrap!())?;

            homestay.status = status;
            tx.execute(Update(homestay.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            Ok::<_, Traced<E>>(homestay)
        })
        .await?;

        log::info!("`Homestay(id: {homestay_id})` is {status} now");

        Ok(homestay)
    }
}

/// Error of [`UpdateHomestayStatus`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Homestay`] with the provided ID does not exist.
    #[display("`Homestay(id: {_0})` does not exist")]
    HomestayNotExists(#[error(not(source))] homestay::Id),

    /// Failed to roll back the changes after another failure.
    #[display("Rollback failed: {rollback}, after: {cause}")]
    RollbackFailed {
        /// Error the changes were rolled back because of.
        cause: Box<Self>,

        /// Error of the rollback itself.
        rollback: database::Error,
    },
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
    use crate::{
        command::{fixture, Command as _},
        domain::homestay,
    };

    use super::{ExecutionError, UpdateHomestayStatus};

    #[tokio::test]
    async fn updates_status() {
        let svc = fixture::service();
        let h = fixture::homestay(&svc).await;
        assert!(h.is_available());

        let updated = svc
            .execute(UpdateHomestayStatus {
                homestay_id: h.id,
                status: homestay::Status::Unavailable,
            })
            .await
            .unwrap();

        assert!(!updated.is_available());
        assert_eq!(
            svc.database().snapshot().await.homestays[&h.id].status,
            homestay::Status::Unavailable,
        );
    }

    #[tokio::test]
    async fn rejects_unknown_homestay() {
        let svc = fixture::service();

        let err = svc
            .execute(UpdateHomestayStatus {
                homestay_id: homestay::Id::new(),
                status: homestay::Status::Booked,
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::HomestayNotExists(_)));
    }
}
