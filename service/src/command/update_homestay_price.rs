//! [`Command`] for updating a price of a [`Homestay`].

use common::{
    operations::{
        By, Commit, Lock, Rollback, Select, Transact, Transacted, Update,
    },
    Money,
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

/// [`Command`] for updating a price of a [`Homestay`] night.
///
/// Existing bookings keep the payments calculated at their creation.
#[derive(Clone, Copy, Debug)]
pub struct UpdateHomestayPrice {
    /// ID of the [`Homestay`] to update.
    pub homestay_id: homestay::Id,

    /// New price of a single night.
    pub price: Money,
}

impl<Db> Command<UpdateHomestayPrice> for Service<Db>
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
        cmd: UpdateHomestayPrice,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateHomestayPrice { homestay_id, price } = cmd;

        if price.is_negative() {
            return Err(tracerr::new!(E::NegativePrice(price)));
        }

        let homestay = transaction::run(self.database(), |tx| async move {
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

            homestay.price = price;
            tx.execute(Update(homestay.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            Ok::<_, Traced<E>>(homestay)
        })
        .await?;

        log::info!("`Homestay(id: {homestay_id})` costs {price} a night now");

        Ok(homestay)
    }
}

/// Error of [`UpdateHomestayPrice`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Homestay`] with the provided ID does not exist.
    #[display("`Homestay(id: {_0})` does not exist")]
    HomestayNotExists(#[error(not(source))] homestay::Id),

    /// Price of a night is negative.
    #[display("`{_0}` price is negative")]
    NegativePrice(#[error(not(source))] Money),

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
    use std::str::FromStr as _;

    use common::Money;

    use crate::command::{fixture, Command as _};

    use super::{ExecutionError, UpdateHomestayPrice};

    #[tokio::test]
    async fn keeps_existing_payments() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;
        let booked = svc
            .execute(fixture::booking(&alice, h.id, "2030-06-10", 3, 2))
            .await
            .unwrap();

        let updated = svc
            .execute(UpdateHomestayPrice {
                homestay_id: h.id,
                price: Money::from_str("250USD").unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(updated.price, Money::from_str("250USD").unwrap());

        let state = svc.database().snapshot().await;
        assert_eq!(
            state.payment_of(&booked.booking.id).map(|p| p.amount),
            Some(booked.payment.amount),
        );
    }

    #[tokio::test]
    async fn rejects_negative_price() {
        let svc = fixture::service();
        let h = fixture::homestay(&svc).await;

        let err = svc
            .execute(UpdateHomestayPrice {
                homestay_id: h.id,
                price: Money::from_str("-1USD").unwrap(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::NegativePrice(_)));
    }
}
