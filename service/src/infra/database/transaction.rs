//! Atomic execution of a unit of work inside a [`Database`] transaction.

use std::{fmt, future::Future};

use common::operations::{Commit, Rollback, Transact, Transacted};
use tracerr::Traced;
use tracing as log;

use crate::infra::{database, Database};

/// Error of a unit of work executed via [`run()`].
pub trait Failure: From<database::Error> + fmt::Display {
    /// Combines the `cause` of a unit of work failure with the `rollback`
    /// error happened while discarding its changes.
    fn rollback_failed(cause: Self, rollback: database::Error) -> Self;
}

/// Runs the provided unit of `work` inside a new [`Database`] transaction.
///
/// The transaction is [`Commit`]ted once the `work` succeeds, and is
/// [`Rollback`]ed once it fails, so none of the changes made by the failed
/// `work` are persisted. No retries are performed.
///
/// # Errors
///
/// - If the `work` fails, its error is returned as is.
/// - If the transaction cannot be started or committed.
/// - If the `work` fails and the transaction cannot be rolled back, the
///   returned error carries both errors (see [`Failure::rollback_failed()`]).
pub async fn run<Db, F, Fut, T, E>(db: &Db, work: F) -> Result<T, Traced<E>>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Commit, Ok = (), Err = Traced<database::Error>>
        + Database<Rollback, Ok = (), Err = Traced<database::Error>>
        + Clone,
    F: FnOnce(Transacted<Db>) -> Fut,
    Fut: Future<Output = Result<T, Traced<E>>>,
    E: Failure,
{
    let tx = db
        .execute(Transact)
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?;

    match work(tx.clone()).await {
        Ok(out) => {
            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            Ok(out)
        }
        Err(e) => {
            if let Err(rb) = tx.execute(Rollback).await {
                log::error!(
                    "failed to rollback transaction: {rb}, \
                     rolling back because of: {e}",
                );
                return Err(tracerr::new!(E::rollback_failed(
                    e.into_inner(),
                    rb.into_inner(),
                )));
            }
            Err(e)
        }
    }
}
