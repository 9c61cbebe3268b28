//! [`Command`] for creating a new [`Booking`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Rollback, Select, Transact, Transacted,
        Update,
    },
    DateTime, Percent,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        booking::{self, CheckOutDate},
        homestay,
        pricing::{Breakdown, Quote},
        promotion, user, Booking, Homestay, Payment, Promotion, User,
    },
    infra::database::{self, transaction, Database},
    read::booking::{Stay, Validated},
    Service,
};

use super::{Command, ErrorKind};

/// [`Command`] for creating a new [`Booking`] of a [`Homestay`].
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// [`user::Username`] of the [`User`] making the [`Booking`].
    pub username: user::Username,

    /// ID of the [`Homestay`] to be booked.
    pub homestay_id: homestay::Id,

    /// [`promotion::Code`] of the [`Promotion`] to apply, if any.
    pub promotion: Option<promotion::Code>,

    /// Date of the first night.
    pub checkin_date: booking::CheckInDate,

    /// Number of nights to stay.
    pub num_nights: booking::NumNights,

    /// Number of guests to stay.
    pub num_guests: booking::NumGuests,
}

/// Result of [`CreateBooking`] [`Command`] execution.
#[derive(Clone, Debug)]
pub struct Output {
    /// Created [`Booking`].
    pub booking: Booking,

    /// Unpaid [`Payment`] due for the created [`Booking`].
    pub payment: Payment,

    /// Price [`Breakdown`] of the created [`Booking`].
    pub breakdown: Breakdown,
}

impl<Db> Command<CreateBooking> for Service<Db>
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
            Select<By<Option<Promotion>, promotion::Code>>,
            Ok = Option<Promotion>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Validated<Booking>>, Stay>>,
            Ok = Vec<Validated<Booking>>,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Update<User>, Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>
        + Database<Rollback, Ok = (), Err = Traced<database::Error>>
        + Clone,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            username,
            homestay_id,
            promotion,
            checkin_date,
            num_nights,
            num_guests,
        } = cmd;
        let tax_rate = self.config().tax_rate;

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
            if user.is_booking {
                return Err(tracerr::new!(E::UserAlreadyBooking(username)));
            }

            let now = DateTime::now();

            let discount = if let Some(code) = &promotion {
                let promo = tx
                    .execute(Select(By::<Option<Promotion>, _>::new(
                        code.clone(),
                    )))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or_else(|| E::PromotionNotFound(code.clone()))
                    .map_err(tracerr::wrap!())?;
                if promo.is_expired_at(now) {
                    return Err(tracerr::new!(E::PromotionExpired(
                        code.clone()
                    )));
                }
                promo.discount
            } else {
                Percent::ZERO
            };

            let checkout_date: CheckOutDate = checkin_date
                .checked_add_days(num_nights.get())
                .ok_or(E::StayOutOfRange)
                .map_err(tracerr::wrap!())?
                .coerce();

            let overlapping = tx
                .execute(Select(By::<Vec<Validated<Booking>>, _>::new(Stay {
                    homestay_id,
                    checkin_date,
                    checkout_date,
                })))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if !overlapping.is_empty() {
                return Err(tracerr::new!(E::DateRangeConflict(homestay_id)));
            }

            let quote = Quote::new(
                &homestay, num_guests, num_nights, tax_rate, discount,
            );
            let breakdown = quote
                .breakdown()
                .ok_or(E::PriceOverflow(homestay_id))
                .map_err(tracerr::wrap!())?;
            let booking = Booking {
                id: booking::Id::new(),
                username,
                homestay_id,
                promotion,
                status: booking::Status::Validated,
                booked_at: now.coerce(),
                checkin_date,
                checkout_date,
                num_guests,
                service_fee: breakdown.service_fee,
                tax_rate,
            };
            // The exclusion constraint catches a conflicting booking
            // committed after the overlap check above.
            tx.execute(Insert(booking.clone())).await.map_err(|e| {
                if e.as_ref().is_constraint_violation() {
                    tracerr::new!(E::DateRangeConflict(homestay_id))
                } else {
                    tracerr::map_from(e)
                }
            })?;

            let payment = Payment::unpaid(booking.id.clone(), breakdown.total);
            tx.execute(Insert(payment.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            user.is_booking = true;
            tx.execute(Update(user))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))
                .map(drop)?;

            Ok::<_, Traced<E>>(Output {
                booking,
                payment,
                breakdown,
            })
        })
        .await
        .inspect_err(|e| {
            let e: &E = e.as_ref();
            if e.kind() != ErrorKind::Fatal {
                log::debug!(
                    "booking of `Homestay(id: {homestay_id})` rejected: {e}",
                );
            }
        })?;

        log::info!(
            "`Booking(id: {})` of `Homestay(id: {})` created for `{}`: \
             {} nights from {}, total {}",
            out.booking.id,
            out.booking.homestay_id,
            out.booking.username,
            num_nights,
            out.booking.checkin_date,
            out.breakdown.total,
        );

        Ok(out)
    }
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// Requested nights overlap with another [`Booking`] of the [`Homestay`].
    #[display("`Homestay(id: {_0})` is already booked for the requested dates")]
    DateRangeConflict(#[error(not(source))] homestay::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Homestay`] with the provided ID does not exist.
    #[display("`Homestay(id: {_0})` does not exist")]
    HomestayNotExists(#[error(not(source))] homestay::Id),

    /// [`Homestay`] doesn't accept bookings.
    #[display("`Homestay(id: {_0})` is not available")]
    HomestayUnavailable(#[error(not(source))] homestay::Id),

    /// Price of the stay exceeds the representable amount.
    #[display("Price of staying in `Homestay(id: {_0})` overflows")]
    PriceOverflow(#[error(not(source))] homestay::Id),

    /// [`Promotion`] has already ended.
    #[display("`Promotion({_0})` is expired")]
    PromotionExpired(#[error(not(source))] promotion::Code),

    /// [`Promotion`] with the provided [`promotion::Code`] does not exist.
    #[display("`Promotion({_0})` does not exist")]
    PromotionNotFound(#[error(not(source))] promotion::Code),

    /// Failed to roll back the changes after another failure.
    #[display("Rollback failed: {rollback}, after: {cause}")]
    RollbackFailed {
        /// Error the changes were rolled back because of.
        cause: Box<Self>,

        /// Error of the rollback itself.
        rollback: database::Error,
    },

    /// Check-out date is out of the supported calendar.
    #[display("Stay ends beyond the supported calendar")]
    StayOutOfRange,

    /// [`User`] has an active [`Booking`] already.
    #[display("`User({_0})` has an active booking already")]
    UserAlreadyBooking(#[error(not(source))] user::Username),

    /// [`User`] with the provided [`user::Username`] does not exist.
    #[display("`User({_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Username),
}

impl ExecutionError {
    /// Returns the [`ErrorKind`] of this [`ExecutionError`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HomestayNotExists(_) | Self::UserNotExists(_) => {
                ErrorKind::NotFound
            }
            Self::HomestayUnavailable(_)
            | Self::PromotionExpired(_)
            | Self::PriceOverflow(_)
            | Self::PromotionNotFound(_)
            | Self::StayOutOfRange
            | Self::UserAlreadyBooking(_) => ErrorKind::PreconditionFailed,
            Self::DateRangeConflict(_) => ErrorKind::Conflict,
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
    use std::str::FromStr as _;

    use common::{money::Currency, Money};
    use rust_decimal::Decimal;

    use crate::{
        command::{fixture, Command as _, ErrorKind},
        domain::{booking, payment},
        infra::database::memory::Fault,
    };

    use super::ExecutionError;

    fn usd(s: &str) -> Money {
        Money {
            amount: Decimal::from_str(s).unwrap(),
            currency: Currency::Usd,
        }
    }

    #[tokio::test]
    async fn creates_booking_with_unpaid_payment() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;

        let out = svc
            .execute(fixture::booking(&alice, h.id, "2030-06-10", 3, 2))
            .await
            .unwrap();

        assert_eq!(out.booking.status, booking::Status::Validated);
        assert_eq!(
            out.booking.checkout_date.to_iso8601(),
            "2030-06-13".to_owned(),
        );
        assert_eq!(out.booking.service_fee, usd("90"));
        assert_eq!(out.breakdown.total, usd("429"));
        assert_eq!(out.payment.status, payment::Status::Unpaid);
        assert_eq!(out.payment.amount, usd("429"));

        let state = svc.database().snapshot().await;
        assert!(state.users[&alice.username].is_booking);
        assert!(state.bookings.contains_key(&out.booking.id));
        assert_eq!(
            state.payment_of(&out.booking.id).map(|p| p.id),
            Some(out.payment.id),
        );
    }

    #[tokio::test]
    async fn applies_promotion_after_tax() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;
        let code = fixture::promotion(&svc, "SUMMER", "10", 3600).await;

        let mut cmd = fixture::booking(&alice, h.id, "2030-06-10", 3, 2);
        cmd.promotion = Some(code.clone());
        let out = svc.execute(cmd).await.unwrap();

        assert_eq!(out.booking.promotion, Some(code));
        assert_eq!(out.breakdown.discount, usd("42.9"));
        assert_eq!(out.payment.amount, usd("386.1"));
    }

    #[tokio::test]
    async fn rejects_expired_promotion_without_writes() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;
        let code = fixture::promotion(&svc, "WINTER", "10", -3600).await;

        let mut cmd = fixture::booking(&alice, h.id, "2030-06-10", 3, 2);
        cmd.promotion = Some(code);
        let err = svc.execute(cmd).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PromotionExpired(_)));
        assert_eq!(err.as_ref().kind(), ErrorKind::PreconditionFailed);
        let state = svc.database().snapshot().await;
        assert!(state.bookings.is_empty());
        assert!(state.payments.is_empty());
        assert!(!state.users[&alice.username].is_booking);
    }

    #[tokio::test]
    async fn rejects_unknown_promotion() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;

        let mut cmd = fixture::booking(&alice, h.id, "2030-06-10", 3, 2);
        cmd.promotion = Some("NOPE".parse().unwrap());
        let err = svc.execute(cmd).await.unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PromotionNotFound(_)));
    }

    #[tokio::test]
    async fn rejects_missing_records() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;

        let err = svc
            .execute(fixture::booking(
                &alice,
                crate::domain::homestay::Id::new(),
                "2030-06-10",
                1,
                1,
            ))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::HomestayNotExists(_)));
        assert_eq!(err.as_ref().kind(), ErrorKind::NotFound);

        let mut cmd = fixture::booking(&alice, h.id, "2030-06-10", 1, 1);
        cmd.username = "bob".parse().unwrap();
        let err = svc.execute(cmd).await.unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::UserNotExists(_)));
    }

    #[tokio::test]
    async fn rejects_second_active_booking_of_user() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h1 = fixture::homestay(&svc).await;
        let h2 = fixture::homestay(&svc).await;

        svc.execute(fixture::booking(&alice, h1.id, "2030-06-10", 2, 1))
            .await
            .unwrap();
        let err = svc
            .execute(fixture::booking(&alice, h2.id, "2030-07-10", 2, 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::UserAlreadyBooking(_),
        ));
    }

    #[tokio::test]
    async fn rejects_unavailable_homestay() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;
        svc.execute(crate::command::UpdateHomestayStatus {
            homestay_id: h.id,
            status: crate::domain::homestay::Status::Unavailable,
        })
        .await
        .unwrap();

        let err = svc
            .execute(fixture::booking(&alice, h.id, "2030-06-10", 2, 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::HomestayUnavailable(_),
        ));
    }

    #[tokio::test]
    async fn rejects_stay_beyond_calendar() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;

        let err = svc
            .execute(fixture::booking(&alice, h.id, "9999-12-30", 5, 1))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::StayOutOfRange));
    }

    #[tokio::test]
    async fn rejects_price_overflowing_decimal() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;
        svc.execute(crate::command::UpdateHomestayPrice {
            homestay_id: h.id,
            price: Money::new(Decimal::MAX, Currency::Usd),
        })
        .await
        .unwrap();

        let err = svc
            .execute(fixture::booking(&alice, h.id, "2030-06-10", 2, 1))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::PriceOverflow(_)));
        assert_eq!(err.as_ref().kind(), ErrorKind::PreconditionFailed);
        let db = svc.database().snapshot().await;
        assert!(db.bookings.is_empty());
        assert!(db.payments.is_empty());
    }

    #[tokio::test]
    async fn rejects_overlapping_dates() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let bob = fixture::user(&svc, "bob").await;
        let carol = fixture::user(&svc, "carol").await;
        let h = fixture::homestay(&svc).await;

        svc.execute(fixture::booking(&alice, h.id, "2030-06-10", 3, 1))
            .await
            .unwrap();

        let err = svc
            .execute(fixture::booking(&bob, h.id, "2030-06-12", 3, 1))
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::DateRangeConflict(_)));
        assert_eq!(err.as_ref().kind(), ErrorKind::Conflict);

        // Check-in on the check-out day doesn't overlap.
        svc.execute(fixture::booking(&carol, h.id, "2030-06-13", 2, 1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_overlapping_bookings_exclude_each_other() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let bob = fixture::user(&svc, "bob").await;
        let h = fixture::homestay(&svc).await;

        let (a, b) = tokio::join!(
            svc.execute(fixture::booking(&alice, h.id, "2030-06-10", 3, 1)),
            svc.execute(fixture::booking(&bob, h.id, "2030-06-11", 3, 1)),
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        let err = a.err().or(b.err()).unwrap();
        assert!(matches!(err.as_ref(), ExecutionError::DateRangeConflict(_)));
        assert_eq!(svc.database().snapshot().await.bookings.len(), 1);
    }

    #[tokio::test]
    async fn translates_constraint_violation_into_conflict() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let bob = fixture::user(&svc, "bob").await;
        let h = fixture::homestay(&svc).await;

        svc.execute(fixture::booking(&alice, h.id, "2030-06-10", 3, 1))
            .await
            .unwrap();

        svc.database().inject(Fault::StaleOverlaps);
        let err = svc
            .execute(fixture::booking(&bob, h.id, "2030-06-11", 3, 1))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::DateRangeConflict(_)));
        let state = svc.database().snapshot().await;
        assert_eq!(state.bookings.len(), 1);
        assert!(!state.users[&bob.username].is_booking);
    }

    #[tokio::test]
    async fn failed_payment_leaves_no_booking() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;

        svc.database().inject(Fault::InsertPayment);
        let err = svc
            .execute(fixture::booking(&alice, h.id, "2030-06-10", 3, 1))
            .await
            .unwrap_err();

        assert!(matches!(err.as_ref(), ExecutionError::Db(_)));
        assert_eq!(err.as_ref().kind(), ErrorKind::Fatal);
        let state = svc.database().snapshot().await;
        assert!(state.bookings.is_empty());
        assert!(state.payments.is_empty());
        assert!(!state.users[&alice.username].is_booking);
    }

    #[tokio::test]
    async fn failed_rollback_carries_cause() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;

        svc.database().inject(Fault::InsertPayment);
        svc.database().inject(Fault::Rollback);
        let err = svc
            .execute(fixture::booking(&alice, h.id, "2030-06-10", 3, 1))
            .await
            .unwrap_err();

        let ExecutionError::RollbackFailed { cause, .. } = err.as_ref() else {
            panic!("expected `RollbackFailed`, got: {err}");
        };
        assert!(matches!(**cause, ExecutionError::Db(_)));
        assert_eq!(err.as_ref().kind(), ErrorKind::Fatal);
    }
}
