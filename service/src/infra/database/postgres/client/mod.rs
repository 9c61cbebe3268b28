//! Postgres database clients lazily acquiring their [`Connection`]s.
//!
//! [`Connection`]: super::Connection

pub mod non_tx;
pub mod tx;

use std::{future::Future, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard};
use tracerr::Traced;

use crate::infra::database;

pub use self::{non_tx::NonTx, tx::Tx};

/// Slot of a lazily established connection, shared between clones of a
/// client.
#[derive(Debug)]
pub(crate) struct Slot<C>(Arc<RwLock<Option<C>>>);

impl<C> Clone for Slot<C> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<C> Default for Slot<C> {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(None)))
    }
}

impl<C> Slot<C> {
    /// Returns the connection held in this [`Slot`], establishing it with the
    /// provided `init` if there is none yet.
    ///
    /// # Errors
    ///
    /// If the provided `init` fails.
    pub(crate) async fn get_or_init<F>(
        &self,
        init: impl FnOnce() -> F,
    ) -> Result<RwLockReadGuard<'_, C>, Traced<database::Error>>
    where
        F: Future<Output = Result<C, Traced<database::Error>>>,
    {
        let conn = self.0.read().await;
        let guard = if conn.is_none() {
            drop(conn);

            let mut conn = self.0.write().await;
            if conn.is_none() {
                *conn = Some(init().await.map_err(tracerr::wrap!())?);
            }

            conn.downgrade()
        } else {
            conn
        };

        Ok(RwLockReadGuard::map(guard, |c| {
            c.as_ref()
                .expect("connection cannot be dropped while guard is alive")
        }))
    }

    /// Takes the connection out of this [`Slot`], so the next
    /// [`Slot::get_or_init()`] establishes a new one.
    pub(crate) async fn take(&self) -> Option<C> {
        self.0.write().await.take()
    }
}
