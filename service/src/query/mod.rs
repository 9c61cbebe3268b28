//! [`Query`] definition.

pub mod booking;
pub mod bookings;
pub mod homestay;
pub mod payment;
pub mod promotion;
pub mod report;
pub mod user;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::command::{fixture, Command as _};

    use super::{bookings, payment, Query as _};

    #[tokio::test]
    async fn selects_bookings_with_payments() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;
        let out = svc
            .execute(fixture::booking(&alice, h.id, "2030-06-10", 2, 1))
            .await
            .unwrap();

        let found = svc
            .execute(bookings::ByUser::by(alice.username.clone()))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, out.booking.id);

        let paid = svc
            .execute(payment::ByBookingId::by(out.booking.id.clone()))
            .await
            .unwrap();
        assert_eq!(paid.map(|p| p.id), Some(out.payment.id));
    }
}
