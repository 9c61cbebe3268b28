//! Vocabulary of storage operations.
//!
//! Each operation is a plain value executed by some [`Handler`], so a storage
//! backend declares what it supports via `Handler<Op>` implementations, and
//! callers declare what they need via trait bounds.

use std::marker::PhantomData;

use crate::Handler;

/// Stores a new record.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites an existing record.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Reads records without locking them.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Locks records until the end of the current [`Transact`]ion, so concurrent
/// [`Transact`]ions touching them are serialized.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Starts a new transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Handle of a started [`Transact`]ion.
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Persists every change made within a [`Transact`]ion.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Discards every change made within a [`Transact`]ion.
#[derive(Clone, Copy, Debug)]
pub struct Rollback;

/// Selector of `W` by `B`.
///
/// `W` is only a marker of the expected output, so `By<Option<T>, Id>` and
/// `By<Vec<T>, Id>` are different operations.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected value.
    _what: PhantomData<W>,

    /// Value to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Consumes this [`By`] returning the value it selects by.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}

#[cfg(test)]
mod spec {
    use super::By;

    #[test]
    fn keeps_selector_value() {
        let by = By::<Option<u8>, _>::new("key");

        assert_eq!(by.into_inner(), "key");
    }
}
