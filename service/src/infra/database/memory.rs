//! In-memory [`Database`] implementation.
//!
//! Transactions are serialized: a [`Tx`] holds the whole [`State`] locked
//! until it's committed or rolled back, mutating its own working copy in the
//! meantime. Constraints of the relational schema are checked on writes, so
//! this implementation observes the same guarantees as [`Postgres`] does.
//!
//! [`Postgres`]: super::Postgres

use std::{
    collections::HashMap,
    future::Future,
    ops::RangeInclusive,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use common::operations::{
    By, Commit, Insert, Lock, Rollback, Select, Transact, Update,
};
use derive_more::{Debug, Deref, Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::{
    domain::{
        booking, homestay, payment, promotion, user, Booking, Homestay,
        Payment, Promotion, User,
    },
    infra::{database, Database},
    read::{self, booking::Validated},
};

/// In-memory [`Database`] client.
#[derive(Clone, Debug, Default, Deref)]
pub struct Memory<T = NonTx>(T);

impl Memory {
    /// Creates a new empty [`Memory`] client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes all the further operations of the provided kind fail.
    pub fn inject(&self, fault: Fault) {
        self.0.faults.set(fault, true);
    }

    /// Stops failing the operations of the provided kind.
    pub fn heal(&self, fault: Fault) {
        self.0.faults.set(fault, false);
    }

    /// Returns a copy of the committed [`State`] of this [`Memory`] client.
    pub async fn snapshot(&self) -> State {
        self.0.state.lock().await.clone()
    }
}

/// Stored records.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`Homestay`]s.
    pub homestays: HashMap<homestay::Id, Homestay>,

    /// Stored [`User`]s.
    pub users: HashMap<user::Username, User>,

    /// Stored [`Promotion`]s.
    pub promotions: HashMap<promotion::Code, Promotion>,

    /// Stored [`Booking`]s.
    pub bookings: HashMap<booking::Id, Booking>,

    /// Stored [`Payment`]s.
    pub payments: HashMap<payment::Id, Payment>,
}

impl State {
    /// Returns the [`Payment`] of the [`Booking`] with the provided ID.
    #[must_use]
    pub fn payment_of(&self, booking_id: &booking::Id) -> Option<&Payment> {
        self.payments.values().find(|p| &p.booking_id == booking_id)
    }

    /// Checks the [`Booking`] against the constraints of the schema.
    fn check_booking(&self, b: &Booking) -> Result<(), Error> {
        if !self.users.contains_key(&b.username) {
            return Err(Error::ForeignKeyViolation("bookings_username_fkey"));
        }
        if !self.homestays.contains_key(&b.homestay_id) {
            return Err(Error::ForeignKeyViolation("bookings_homestay_id_fkey"));
        }
        if let Some(code) = &b.promotion {
            if !self.promotions.contains_key(code) {
                return Err(Error::ForeignKeyViolation(
                    "bookings_promotion_fkey",
                ));
            }
        }
        if b.is_validated()
            && self.bookings.values().any(|other| {
                other.id != b.id
                    && other.is_validated()
                    && other.homestay_id == b.homestay_id
                    && other.overlaps(b.checkin_date, b.checkout_date)
            })
        {
            return Err(Error::ExclusionViolation("bookings_homestay_id_excl"));
        }
        Ok(())
    }
}

/// Operation of a [`Memory`] client which may be forced to fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fault {
    /// [`Insert`]ing a [`Payment`] fails.
    InsertPayment,

    /// [`Commit`]ting a transaction fails.
    Commit,

    /// [`Rollback`]ing a transaction fails.
    Rollback,

    /// [`Select`]ing overlapping [`Validated`] [`Booking`]s returns nothing,
    /// as if a concurrent transaction has not committed yet.
    StaleOverlaps,
}

/// Set of injected [`Fault`]s.
#[derive(Debug, Default)]
struct Faults([AtomicBool; 4]);

impl Faults {
    /// Returns the flag of the provided [`Fault`].
    fn flag(&self, fault: Fault) -> &AtomicBool {
        &self.0[match fault {
            Fault::InsertPayment => 0,
            Fault::Commit => 1,
            Fault::Rollback => 2,
            Fault::StaleOverlaps => 3,
        }]
    }

    /// Injects or heals the provided [`Fault`].
    fn set(&self, fault: Fault, on: bool) {
        self.flag(fault).store(on, Ordering::SeqCst);
    }

    /// Checks whether the provided [`Fault`] is injected.
    fn has(&self, fault: Fault) -> bool {
        self.flag(fault).load(Ordering::SeqCst)
    }

    /// Fails if the provided [`Fault`] is injected.
    fn check(&self, fault: Fault) -> Result<(), Error> {
        if self.has(fault) {
            Err(Error::Injected(fault))
        } else {
            Ok(())
        }
    }
}

/// Non-transactional [`Memory`] client.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Committed [`State`].
    state: Arc<Mutex<State>>,

    /// Injected [`Fault`]s.
    faults: Arc<Faults>,
}

/// Transactional [`Memory`] client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Ongoing transaction, if not finished yet.
    inner: Arc<Mutex<Option<Ongoing>>>,

    /// Injected [`Fault`]s.
    faults: Arc<Faults>,
}

/// Ongoing transaction of a [`Tx`] client.
#[derive(Debug)]
struct Ongoing {
    /// Lock of the committed [`State`] held during the whole transaction.
    #[debug(skip)]
    committed: OwnedMutexGuard<State>,

    /// Working copy of the [`State`] to be committed.
    working: State,
}

impl Tx {
    /// Finishes this [`Tx`], returning its [`Ongoing`] transaction, if any.
    async fn finish(&self) -> Option<Ongoing> {
        self.inner.lock().await.take()
    }
}

/// Access to a [`State`] of a [`Memory`] client.
pub trait Access {
    /// Reads the [`State`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`State`] cannot be accessed.
    fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;

    /// Modifies the [`State`] with the provided function.
    ///
    /// # Errors
    ///
    /// If the [`State`] cannot be accessed, or the provided function fails.
    fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, Error>,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;

    /// Fails if the provided [`Fault`] is injected.
    ///
    /// # Errors
    ///
    /// If the provided [`Fault`] is injected.
    fn check(&self, fault: Fault) -> Result<(), Traced<database::Error>>;

    /// Checks whether the provided [`Fault`] is injected.
    fn has(&self, fault: Fault) -> bool;
}

impl Access for NonTx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        Ok(f(&*self.state.lock().await))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, Error>,
    ) -> Result<R, Traced<database::Error>> {
        f(&mut *self.state.lock().await)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }

    fn check(&self, fault: Fault) -> Result<(), Traced<database::Error>> {
        self.faults
            .check(fault)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }

    fn has(&self, fault: Fault) -> bool {
        self.faults.has(fault)
    }
}

impl Access for Tx {
    async fn read<R>(
        &self,
        f: impl FnOnce(&State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let inner = self.inner.lock().await;
        let ongoing = inner
            .as_ref()
            .ok_or(Error::TxFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        Ok(f(&ongoing.working))
    }

    async fn write<R>(
        &self,
        f: impl FnOnce(&mut State) -> Result<R, Error>,
    ) -> Result<R, Traced<database::Error>> {
        let mut inner = self.inner.lock().await;
        let ongoing = inner
            .as_mut()
            .ok_or(Error::TxFinished)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        f(&mut ongoing.working)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }

    fn check(&self, fault: Fault) -> Result<(), Traced<database::Error>> {
        self.faults
            .check(fault)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }

    fn has(&self, fault: Fault) -> bool {
        self.faults.has(fault)
    }
}

/// [`Memory`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Uniqueness constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),

    /// Exclusion constraint is violated.
    #[display("Exclusion constraint `{_0}` is violated")]
    ExclusionViolation(#[error(not(source))] &'static str),

    /// Foreign key constraint is violated.
    #[display("Foreign key constraint `{_0}` is violated")]
    ForeignKeyViolation(#[error(not(source))] &'static str),

    /// Transaction is already committed or rolled back.
    #[display("Transaction is already finished")]
    TxFinished,

    /// Injected [`Fault`] happened.
    #[display("Injected `{_0:?}` fault")]
    Injected(#[error(not(source))] Fault),
}

impl Error {
    /// Checks whether this [`Error`] is a violation of a uniqueness,
    /// exclusion or foreign key constraint.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        match self {
            Self::UniqueViolation(_)
            | Self::ExclusionViolation(_)
            | Self::ForeignKeyViolation(_) => true,
            Self::TxFinished | Self::Injected(_) => false,
        }
    }
}

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let committed = Arc::clone(&self.0.state).lock_owned().await;
        let working = committed.clone();
        Ok(Memory(Tx {
            inner: Arc::new(Mutex::new(Some(Ongoing { committed, working }))),
            faults: Arc::clone(&self.0.faults),
        }))
    }
}

impl Database<Transact> for Memory<Tx> {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let Some(Ongoing {
            mut committed,
            working,
        }) = self.0.finish().await
        else {
            return Ok(());
        };
        self.0.check(Fault::Commit).map_err(tracerr::wrap!())?;
        *committed = working;
        Ok(())
    }
}

impl Database<Rollback> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Rollback) -> Result<Self::Ok, Self::Err> {
        // Dropping the working copy discards every change.
        drop(self.0.finish().await);
        self.0.check(Fault::Rollback).map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Lock<By<Homestay, homestay::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Homestay, homestay::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Whole `State` is locked by a `Tx` already.
        Ok(())
    }
}

impl<C: Access> Database<Lock<By<User, user::Username>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<User, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Whole `State` is locked by a `Tx` already.
        Ok(())
    }
}

impl<C: Access> Database<Select<By<Option<Homestay>, homestay::Id>>>
    for Memory<C>
{
    type Ok = Option<Homestay>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Homestay>, homestay::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| s.homestays.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Homestay>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(homestay): Insert<Homestay>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if s.homestays.contains_key(&homestay.id) {
                    return Err(Error::UniqueViolation("homestays_pkey"));
                }
                _ = s.homestays.insert(homestay.id, homestay);
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Update<Homestay>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(homestay): Update<Homestay>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if let Some(h) = s.homestays.get_mut(&homestay.id) {
                    *h = homestay;
                }
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<User>, user::Username>>>
    for Memory<C>
{
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();
        self.0
            .read(|s| s.users.get(&username).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<User>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if s.users.contains_key(&user.username) {
                    return Err(Error::UniqueViolation("users_pkey"));
                }
                _ = s.users.insert(user.username.clone(), user);
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Update<User>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if let Some(u) = s.users.get_mut(&user.username) {
                    *u = user;
                }
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Promotion>, promotion::Code>>>
    for Memory<C>
{
    type Ok = Option<Promotion>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Promotion>, promotion::Code>>,
    ) -> Result<Self::Ok, Self::Err> {
        let code = by.into_inner();
        self.0
            .read(|s| s.promotions.get(&code).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Promotion>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(promotion): Insert<Promotion>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if s.promotions.contains_key(&promotion.code) {
                    return Err(Error::UniqueViolation("promotions_pkey"));
                }
                _ = s.promotions.insert(promotion.code.clone(), promotion);
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Booking>, booking::Id>>>
    for Memory<C>
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .read(|s| s.bookings.get(&id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Vec<Booking>, user::Username>>>
    for Memory<C>
{
    type Ok = Vec<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Booking>, user::Username>>,
    ) -> Result<Self::Ok, Self::Err> {
        let username = by.into_inner();
        self.0
            .read(|s| {
                let mut found = s
                    .bookings
                    .values()
                    .filter(|b| b.username == username)
                    .cloned()
                    .collect::<Vec<_>>();
                found.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
                found
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<Select<By<Vec<Validated<Booking>>, read::booking::Stay>>>
    for Memory<C>
{
    type Ok = Vec<Validated<Booking>>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Validated<Booking>>, read::booking::Stay>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::booking::Stay {
            homestay_id,
            checkin_date,
            checkout_date,
        } = by.into_inner();

        if self.0.has(Fault::StaleOverlaps) {
            return Ok(vec![]);
        }
        self.0
            .read(|s| {
                s.bookings
                    .values()
                    .filter(|b| {
                        b.is_validated()
                            && b.homestay_id == homestay_id
                            && b.overlaps(checkin_date, checkout_date)
                    })
                    .cloned()
                    .map(Validated)
                    .collect()
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Booking>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if s.bookings.contains_key(&booking.id) {
                    return Err(Error::UniqueViolation("bookings_pkey"));
                }
                s.check_booking(&booking)?;
                _ = s.bookings.insert(booking.id.clone(), booking);
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Update<Booking>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if !s.bookings.contains_key(&booking.id) {
                    return Ok(());
                }
                s.check_booking(&booking)?;
                _ = s.bookings.insert(booking.id.clone(), booking);
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Select<By<Option<Payment>, booking::Id>>>
    for Memory<C>
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking_id = by.into_inner();
        self.0
            .read(|s| s.payment_of(&booking_id).cloned())
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Insert<Payment>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .check(Fault::InsertPayment)
            .map_err(tracerr::wrap!())?;
        self.0
            .write(|s| {
                if s.payments.contains_key(&payment.id) {
                    return Err(Error::UniqueViolation("payments_pkey"));
                }
                if !s.bookings.contains_key(&payment.booking_id) {
                    return Err(Error::ForeignKeyViolation(
                        "payments_booking_id_fkey",
                    ));
                }
                if s.payment_of(&payment.booking_id).is_some() {
                    return Err(Error::UniqueViolation(
                        "payments_booking_id_key",
                    ));
                }
                _ = s.payments.insert(payment.id, payment);
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access> Database<Update<Payment>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(payment): Update<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .write(|s| {
                if let Some(p) = s.payments.get_mut(&payment.id) {
                    *p = payment;
                }
                Ok(())
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

impl<C: Access>
    Database<
        Select<
            By<
                Vec<read::income::Total>,
                RangeInclusive<payment::PaymentDateTime>,
            >,
        >,
    > for Memory<C>
{
    type Ok = Vec<read::income::Total>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<
                Vec<read::income::Total>,
                RangeInclusive<payment::PaymentDateTime>,
            >,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let range = by.into_inner();
        self.0
            .read(|s| {
                let mut totals = Vec::<read::income::Total>::new();
                let paid = s.payments.values().filter(|p| {
                    p.status == payment::Status::Paid
                        && p.paid_at.is_some_and(|at| range.contains(&at))
                });
                for p in paid {
                    let same = totals.iter_mut().find_map(|t| {
                        Some((t.amount.checked_add(p.amount)?, t))
                    });
                    if let Some((sum, t)) = same {
                        t.amount = sum;
                        t.payments = (i32::from(t.payments) + 1).into();
                    } else {
                        totals.push(read::income::Total {
                            amount: p.amount,
                            payments: 1.into(),
                        });
                    }
                }
                totals.sort_by_key(|t| t.amount.currency.u8());
                totals
            })
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use common::{
        money::Currency,
        operations::{By, Commit, Insert, Rollback, Select, Transact},
        DateTime, Money,
    };

    use crate::{
        domain::{homestay, Homestay},
        infra::Database,
    };

    use super::{Fault, Memory};

    fn homestay() -> Homestay {
        Homestay {
            id: homestay::Id::new(),
            description: homestay::Description::new("Cozy").unwrap(),
            address: homestay::Address::new("Hanoi").unwrap(),
            num_beds: 2,
            capacity: 2,
            price: Money::zero(Currency::Usd),
            status: homestay::Status::Available,
            created_at: DateTime::now().coerce(),
        }
    }

    #[tokio::test]
    async fn commit_publishes_changes() {
        let db = Memory::new();
        let h = homestay();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(h.clone())).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let found = db
            .execute(Select(By::<Option<Homestay>, _>::new(h.id)))
            .await
            .unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn rollback_discards_changes() {
        let db = Memory::new();
        let h = homestay();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(h.clone())).await.unwrap();
        tx.execute(Rollback).await.unwrap();

        assert!(db.snapshot().await.homestays.is_empty());
    }

    #[tokio::test]
    async fn dropped_tx_discards_changes() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(homestay())).await.unwrap();
        drop(tx);

        assert!(db.snapshot().await.homestays.is_empty());
    }

    #[tokio::test]
    async fn finished_tx_is_unusable() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Commit).await.unwrap();

        let err = tx.execute(Insert(homestay())).await.unwrap_err();
        assert!(!err.into_inner().is_constraint_violation());
    }

    #[tokio::test]
    async fn duplicate_insert_is_constraint_violation() {
        let db = Memory::new();
        let h = homestay();

        db.execute(Insert(h.clone())).await.unwrap();
        let err = db.execute(Insert(h)).await.unwrap_err();

        assert!(err.into_inner().is_constraint_violation());
    }

    #[tokio::test]
    async fn failed_rollback_still_discards_changes() {
        let db = Memory::new();
        db.inject(Fault::Rollback);

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(homestay())).await.unwrap();
        assert!(tx.execute(Rollback).await.is_err());

        db.heal(Fault::Rollback);
        assert!(db.snapshot().await.homestays.is_empty());
    }
}
