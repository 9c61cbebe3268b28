//! [`Command`] for creating a new [`Promotion`].

use common::{
    operations::{By, Commit, Insert, Rollback, Select, Transact, Transacted},
    Percent,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{promotion, Promotion},
    infra::database::{self, transaction, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Promotion`].
#[derive(Clone, Debug)]
pub struct CreatePromotion {
    /// [`promotion::Code`] of a new [`Promotion`].
    pub code: promotion::Code,

    /// [`promotion::Description`] of a new [`Promotion`].
    pub description: promotion::Description,

    /// Discount granted by a new [`Promotion`], less than `100%`.
    pub discount: Percent,

    /// Start of a new [`Promotion`].
    pub starts_at: promotion::StartDateTime,

    /// End of a new [`Promotion`].
    pub ends_at: promotion::EndDateTime,
}

impl<Db> Command<CreatePromotion> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Promotion>, promotion::Code>>,
            Ok = Option<Promotion>,
            Err = Traced<database::Error>,
        > + Database<Insert<Promotion>, Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>
        + Database<Rollback, Ok = (), Err = Traced<database::Error>>
        + Clone,
{
    type Ok = Promotion;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePromotion,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePromotion {
            code,
            description,
            discount,
            starts_at,
            ends_at,
        } = cmd;

        if discount.value() >= Decimal::ONE_HUNDRED {
            return Err(tracerr::new!(E::DiscountTooLarge(discount)));
        }
        if ends_at.coerce() < starts_at {
            return Err(tracerr::new!(E::EndsBeforeStart));
        }

        let promotion = transaction::run(self.database(), |tx| async move {
            let existing = tx
                .execute(Select(By::<Option<Promotion>, _>::new(code.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if existing.is_some() {
                return Err(tracerr::new!(E::CodeOccupied(code)));
            }

            let promotion = Promotion {
                code,
                description,
                discount,
                starts_at,
                ends_at,
            };
            tx.execute(Insert(promotion.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            Ok::<_, Traced<E>>(promotion)
        })
        .await?;

        log::info!(
            "`Promotion({})` of {}% created",
            promotion.code,
            promotion.discount,
        );

        Ok(promotion)
    }
}

/// Error of [`CreatePromotion`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`promotion::Code`] is already occupied.
    #[display("`{_0}` promotion code is occupied")]
    CodeOccupied(#[error(not(source))] promotion::Code),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Discount is not less than `100%`.
    #[display("`{_0}%` discount is too large")]
    DiscountTooLarge(#[error(not(source))] Percent),

    /// [`Promotion`] ends before it starts.
    #[display("`Promotion` ends before it starts")]
    EndsBeforeStart,

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
    use std::{str::FromStr as _, time::Duration};

    use common::{DateTime, Percent};

    use crate::{
        command::{fixture, Command as _},
        domain::promotion,
    };

    use super::{CreatePromotion, ExecutionError};

    fn cmd(code: &str, discount: &str, days: u64) -> CreatePromotion {
        let now = DateTime::now();
        CreatePromotion {
            code: promotion::Code::new(code).unwrap(),
            description: promotion::Description::new("Sale").unwrap(),
            discount: Percent::from_str(discount).unwrap(),
            starts_at: now.coerce(),
            ends_at: (now + Duration::from_secs(days * 86_400)).coerce(),
        }
    }

    #[tokio::test]
    async fn creates_promotion() {
        let svc = fixture::service();

        let p = svc.execute(cmd("SPRING", "15", 7)).await.unwrap();

        assert_eq!(p.code.to_string(), "SPRING");
        assert!(svc
            .database()
            .snapshot()
            .await
            .promotions
            .contains_key(&p.code));
    }

    #[tokio::test]
    async fn rejects_invalid_promotions() {
        let svc = fixture::service();
        _ = fixture::promotion(&svc, "TAKEN", "5", 60).await;

        let err = svc.execute(cmd("TAKEN", "10", 1)).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::CodeOccupied(_)));

        let err = svc.execute(cmd("FREE", "100", 1)).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::DiscountTooLarge(_)));

        let mut backwards = cmd("BACK", "10", 1);
        backwards.starts_at =
            (DateTime::now() + Duration::from_secs(10 * 86_400)).coerce();
        let err = svc.execute(backwards).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::EndsBeforeStart));
    }
}
