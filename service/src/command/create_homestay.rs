//! [`Command`] for creating a new [`Homestay`].

use common::{
    operations::{Commit, Insert, Rollback, Transact, Transacted},
    DateTime, Money,
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

/// [`Command`] for listing a new [`Homestay`].
#[derive(Clone, Debug)]
pub struct CreateHomestay {
    /// [`homestay::Description`] of a new [`Homestay`].
    pub description: homestay::Description,

    /// [`homestay::Address`] of a new [`Homestay`].
    pub address: homestay::Address,

    /// Number of beds in a new [`Homestay`].
    pub num_beds: homestay::NumBeds,

    /// Number of guests a new [`Homestay`] accommodates without surcharge.
    pub capacity: homestay::Capacity,

    /// Price of a single night.
    pub price: Money,
}

impl<Db> Command<CreateHomestay> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Homestay>, Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>
        + Database<Rollback, Ok = (), Err = Traced<database::Error>>
        + Clone,
{
    type Ok = Homestay;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateHomestay,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateHomestay {
            description,
            address,
            num_beds,
            capacity,
            price,
        } = cmd;

        if capacity == 0 {
            return Err(tracerr::new!(E::ZeroCapacity));
        }
        if price.is_negative() {
            return Err(tracerr::new!(E::NegativePrice(price)));
        }

        let homestay = Homestay {
            id: homestay::Id::new(),
            description,
            address,
            num_beds,
            capacity,
            price,
            status: homestay::Status::Available,
            created_at: DateTime::now().coerce(),
        };

        let out = homestay.clone();
        transaction::run(self.database(), |tx| async move {
            tx.execute(Insert(homestay))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)
        })
        .await?;

        log::info!("`Homestay(id: {})` created", out.id);

        Ok(out)
    }
}

/// Error of [`CreateHomestay`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

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

    /// [`Homestay`] accommodates nobody.
    #[display("`Homestay` capacity must be positive")]
    ZeroCapacity,
}

impl transaction::Failure for ExecutionError {
    fn rollback_failed(cause: Self, rollback: database::Error) -> Self {
        Self::RollbackFailed {
            cause: Box::new(cause),
            rollback,
        }
    }
}
