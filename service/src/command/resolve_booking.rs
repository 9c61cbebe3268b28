//! [`Command`] for resolving a [`Validated`] [`Booking`] into its terminal
//! state.
//!
//! [`Validated`]: booking::Status::Validated

use common::{
    operations::{
        By, Commit, Lock, Rollback, Select, Transact, Transacted, Update,
    },
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        booking, homestay, payment, user, Booking, Homestay, Payment, User,
    },
    infra::database::{self, transaction, Database},
    Service,
};

use super::{Command, ErrorKind};

/// [`Command`] for resolving a [`Validated`] [`Booking`] either by
/// cancelling it or by checking its guests out.
///
/// [`Validated`]: booking::Status::Validated
#[derive(Clone, Debug)]
pub struct ResolveBooking {
    /// [`user::Username`] of the [`User`] who made the [`Booking`].
    pub username: user::Username,

    /// ID of the booked [`Homestay`].
    pub homestay_id: homestay::Id,

    /// ID of the [`Booking`] to resolve.
    pub booking_id: booking::Id,

    /// [`Resolution`] to apply.
    pub resolution: Resolution,
}

/// Way a [`Booking`] is resolved.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
    /// [`Booking`] is cancelled and its [`Payment`] is invalidated.
    Cancel,

    /// Guests check out and the [`Payment`] is paid with the provided
    /// [`payment::Method`].
    Checkout(payment::Method),
}

/// Result of [`ResolveBooking`] [`Command`] execution.
#[derive(Clone, Debug)]
pub struct Output {
    /// Resolved [`Booking`].
    pub booking: Booking,

    /// [`Payment`] of the resolved [`Booking`].
    pub payment: Payment,
}

impl<Db> Command<ResolveBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Homestay, homestay::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<User, user::Username>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Homestay>, homestay::Id>>,
            Ok = Option<Homestay>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Username>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Payment>, booking::Id>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Update<Payment>, Err = Traced<database::Error>>
        + Database<Update<User>, Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>
        + Database<Rollback, Ok = (), Err = Traced<database::Error>>
        + Clone,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResolveBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ResolveBooking {
            username,
            homestay_id,
            booking_id,
            resolution,
        } = cmd;

        let out = transaction::run(self.database(), |tx| async move {
            // Lock order is always `Homestay` first, then `User`.
            tx.execute(Lock(By::<Homestay, _>::new(homestay_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Lock(By::<User, _>::new(username.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            let homestay = tx
                .execute(Select(By::<Option<Homestay>, _>::new(homestay_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::HomestayNotExists(homestay_id))
                .map_err(tracerr::wrap!())?;
            if !homestay.is_available() {
                return Err(tracerr::new!(E::HomestayUnavailable(homestay_id)));
            }

            let mut user = tx
                .execute(Select(By::<Option<User>, _>::new(username.clone())))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(username.clone()))
                .map_err(tracerr::wrap!())?;
            if !user.is_booking {
                return Err(tracerr::new!(E::UserNotBooking(username)));
            }

            // Someone else's `Booking` is reported as a missing one.
            let mut booking = tx
                .execute(Select(By::<Option<Booking>, _>::new(
                    booking_id.clone(),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .filter(|b| b.is_owned_by(&username, homestay_id))
                .ok_or_else(|| E::BookingNotExists(booking_id.clone()))
                .map_err(tracerr::wrap!())?;
            if !booking.is_validated() {
                return Err(tracerr::new!(E::BookingNotCancellable(
                    booking_id
                )));
            }

            let mut payment = tx
                .execute(Select(By::<Option<Payment>, _>::new(
                    booking_id.clone(),
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::PaymentNotExists(booking_id.clone()))
                .map_err(tracerr::wrap!())?;
            if !payment.is_unpaid() {
                return Err(tracerr::new!(E::PaymentNotCancellable(payment.id)));
            }

            match resolution {
                Resolution::Cancel => {
                    booking.cancel();
                    payment.invalidate();
                }
                Resolution::Checkout(method) => {
                    booking.complete();
                    payment.pay(method, DateTime::now().coerce());
                }
            }
            user.is_booking = false;

            tx.execute(Update(booking.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Update(user))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;
            tx.execute(Update(payment.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            Ok::<_, Traced<E>>(Output { booking, payment })
        })
        .await
        .inspect_err(|e| {
            let e: &E = e.as_ref();
            if e.kind() != ErrorKind::Fatal {
                log::debug!("{resolution:?} of `Booking` rejected: {e}");
            }
        })?;

        log::info!(
            "`Booking(id: {})` resolved as {}, `Payment(id: {})` is {}",
            out.booking.id,
            out.booking.status,
            out.payment.id,
            out.payment.status,
        );

        Ok(out)
    }
}

/// Error of [`ResolveBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] is resolved already.
    #[display("`Booking(id: {_0})` cannot be cancelled or checked out")]
    BookingNotCancellable(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist, or belongs to
    /// another [`User`] or [`Homestay`].
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Homestay`] with the provided ID does not exist.
    #[display("`Homestay(id: {_0})` does not exist")]
    HomestayNotExists(#[error(not(source))] homestay::Id),

    /// [`Homestay`] is not available.
    #[display("`Homestay(id: {_0})` is not available")]
    HomestayUnavailable(#[error(not(source))] homestay::Id),

    /// [`Payment`] is not awaited anymore.
    #[display("`Payment(id: {_0})` cannot be cancelled or collected")]
    PaymentNotCancellable(#[error(not(source))] payment::Id),

    /// [`Booking`] has no [`Payment`].
    #[display("`Payment` of `Booking(id: {_0})` does not exist")]
    PaymentNotExists(#[error(not(source))] booking::Id),

    /// Failed to roll back the changes after another failure.
    #[display("Rollback failed: {rollback}, after: {cause}")]
    RollbackFailed {
        /// Error the changes were rolled back because of.
        cause: Box<Self>,

        /// Error of the rollback itself.
        rollback: database::Error,
    },

    /// [`User`] has no active [`Booking`].
    #[display("`User({_0})` has no active booking")]
    UserNotBooking(#[error(not(source))] user::Username),

    /// [`User`] with the provided [`user::Username`] does not exist.
    #[display("`User({_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Username),
}

impl ExecutionError {
    /// Returns the [`ErrorKind`] of this [`ExecutionError`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BookingNotExists(_)
            | Self::HomestayNotExists(_)
            | Self::PaymentNotExists(_)
            | Self::UserNotExists(_) => ErrorKind::NotFound,
            Self::BookingNotCancellable(_)
            | Self::HomestayUnavailable(_)
            | Self::PaymentNotCancellable(_)
            | Self::UserNotBooking(_) => ErrorKind::PreconditionFailed,
            Self::Db(_) | Self::RollbackFailed { .. } => ErrorKind::Fatal,
        }
    }
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
    use std::collections::HashMap;

    use rand::{rngs::StdRng, Rng as _, SeedableRng as _};

    use crate::{
        command::{fixture, Command as _, ErrorKind},
        domain::{booking, payment, Booking},
        infra::{
            database::memory::{Fault, State},
            Memory,
        },
        Service,
    };

    use super::{ExecutionError, Resolution, ResolveBooking};

    fn resolve(b: &Booking, resolution: Resolution) -> ResolveBooking {
        ResolveBooking {
            username: b.username.clone(),
            homestay_id: b.homestay_id,
            booking_id: b.id.clone(),
            resolution,
        }
    }

    async fn booked(svc: &Service<Memory>) -> Booking {
        let alice = fixture::user(svc, "alice").await;
        let h = fixture::homestay(svc).await;
        svc.execute(fixture::booking(&alice, h.id, "2030-06-10", 3, 2))
            .await
            .unwrap()
            .booking
    }

    #[tokio::test]
    async fn cancel_releases_everything() {
        let svc = fixture::service();
        let b = booked(&svc).await;

        let out = svc.execute(resolve(&b, Resolution::Cancel)).await.unwrap();

        assert_eq!(out.booking.status, booking::Status::Cancelled);
        assert!(out.booking.checkin_date.is_null());
        assert!(out.booking.checkout_date.is_null());
        assert_eq!(out.payment.status, payment::Status::Invalidated);
        assert!(out.payment.paid_at.is_none());

        let state = svc.database().snapshot().await;
        assert!(!state.users[&b.username].is_booking);
        assert_eq!(
            state.bookings[&b.id].status,
            booking::Status::Cancelled,
        );
    }

    #[tokio::test]
    async fn checkout_collects_payment() {
        let svc = fixture::service();
        let b = booked(&svc).await;

        let out = svc
            .execute(resolve(&b, Resolution::Checkout(payment::Method::Card)))
            .await
            .unwrap();

        assert_eq!(out.booking.status, booking::Status::Completed);
        assert_eq!(out.booking.checkin_date, b.checkin_date);
        assert_eq!(out.payment.status, payment::Status::Paid);
        assert_eq!(out.payment.method, Some(payment::Method::Card));
        assert!(out.payment.paid_at.is_some());
        assert!(!svc.database().snapshot().await.users[&b.username].is_booking);
    }

    #[tokio::test]
    async fn second_resolution_fails_without_writes() {
        let svc = fixture::service();
        let b = booked(&svc).await;
        svc.execute(resolve(&b, Resolution::Cancel)).await.unwrap();

        // Another active booking makes the `User` pass the first checks.
        let h = fixture::homestay(&svc).await;
        let alice = svc.database().snapshot().await.users[&b.username].clone();
        let other = svc
            .execute(fixture::booking(&alice, h.id, "2030-08-01", 1, 1))
            .await
            .unwrap()
            .booking;
        let before = svc.database().snapshot().await;

        for resolution in
            [Resolution::Cancel, Resolution::Checkout(payment::Method::Cash)]
        {
            let err = svc.execute(resolve(&b, resolution)).await.unwrap_err();
            assert!(matches!(
                err.as_ref(),
                ExecutionError::BookingNotCancellable(_),
            ));
            assert_eq!(err.as_ref().kind(), ErrorKind::PreconditionFailed);
        }

        let after = svc.database().snapshot().await;
        assert_eq!(
            before.bookings[&b.id].status,
            after.bookings[&b.id].status,
        );
        assert!(after.bookings[&other.id].is_validated());
        assert!(after.users[&b.username].is_booking);
    }

    #[tokio::test]
    async fn rejects_user_without_active_booking() {
        let svc = fixture::service();
        let b = booked(&svc).await;
        svc.execute(resolve(&b, Resolution::Cancel)).await.unwrap();

        let err = svc
            .execute(resolve(&b, Resolution::Cancel))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::UserNotBooking(_)));
    }

    #[tokio::test]
    async fn hides_bookings_of_others() {
        let svc = fixture::service();
        let b = booked(&svc).await;
        let bob = fixture::user(&svc, "bob").await;
        let h = fixture::homestay(&svc).await;
        svc.execute(fixture::booking(&bob, h.id, "2030-06-10", 1, 1))
            .await
            .unwrap();

        let mut cmd = resolve(&b, Resolution::Cancel);
        cmd.username = bob.username.clone();
        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::BookingNotExists(_)));
        assert_eq!(err.as_ref().kind(), ErrorKind::NotFound);

        let mut cmd = resolve(&b, Resolution::Cancel);
        cmd.homestay_id = h.id;
        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::BookingNotExists(_)));

        let state = svc.database().snapshot().await;
        assert!(state.bookings[&b.id].is_validated());
        assert!(state.users[&bob.username].is_booking);
    }

    #[tokio::test]
    async fn failed_commit_keeps_booking_active() {
        let svc = fixture::service();
        let b = booked(&svc).await;

        svc.database().inject(Fault::Commit);
        let err = svc
            .execute(resolve(&b, Resolution::Cancel))
            .await
            .unwrap_err();
        svc.database().heal(Fault::Commit);

        assert_eq!(err.as_ref().kind(), ErrorKind::Fatal);
        let state = svc.database().snapshot().await;
        assert!(state.bookings[&b.id].is_validated());
        assert!(state.users[&b.username].is_booking);
    }

    /// Checks the consistency of the stored records.
    fn assert_consistent(state: &State) {
        for user in state.users.values() {
            let active = state
                .bookings
                .values()
                .filter(|b| b.username == user.username && b.is_validated())
                .count();
            assert!(active <= 1, "`{}` has {active} bookings", user.username);
            assert_eq!(user.is_booking, active == 1, "`{}`", user.username);
        }

        let mut by_homestay = HashMap::<_, Vec<&Booking>>::new();
        for b in state.bookings.values().filter(|b| b.is_validated()) {
            let payment = state.payment_of(&b.id).unwrap();
            assert!(payment.is_unpaid(), "`{}` payment", b.id);
            by_homestay.entry(b.homestay_id).or_default().push(b);
        }
        for bookings in by_homestay.values() {
            for (i, a) in bookings.iter().enumerate() {
                for b in &bookings[i + 1..] {
                    assert!(
                        !a.overlaps(b.checkin_date, b.checkout_date),
                        "`{}` overlaps `{}`",
                        a.id,
                        b.id,
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn random_operations_keep_records_consistent() {
        let svc = fixture::service();
        let mut rng = StdRng::seed_from_u64(42);

        let mut users = vec![];
        for name in ["alice", "bob", "carol", "dave"] {
            users.push(fixture::user(&svc, name).await);
        }
        let mut homestays = vec![];
        for _ in 0..2 {
            homestays.push(fixture::homestay(&svc).await.id);
        }
        let mut created = vec![];

        for _ in 0..300 {
            if created.is_empty() || rng.gen_bool(0.5) {
                let user = &users[rng.gen_range(0..users.len())];
                let h = homestays[rng.gen_range(0..homestays.len())];
                let checkin = fixture::date("2030-01-01")
                    .checked_add_days(rng.gen_range(0..60))
                    .unwrap()
                    .to_iso8601();
                let nights = rng.gen_range(1..7);
                let guests = rng.gen_range(1..4);
                let cmd = fixture::booking(user, h, &checkin, nights, guests);
                if let Ok(out) = svc.execute(cmd).await {
                    created.push(out.booking);
                }
            } else {
                let b = &created[rng.gen_range(0..created.len())];
                let resolution = if rng.gen_bool(0.5) {
                    Resolution::Cancel
                } else {
                    Resolution::Checkout(payment::Method::Cash)
                };
                _ = svc.execute(resolve(b, resolution)).await;
            }

            assert_consistent(&svc.database().snapshot().await);
        }
    }
}
