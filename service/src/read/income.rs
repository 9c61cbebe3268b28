//! Income read model definition.

use common::Money;
use derive_more::{Display, From, Into};

#[cfg(doc)]
use crate::domain::{payment, Payment};

/// Income collected in a single [`Currency`] via [`payment::Status::Paid`]
/// [`Payment`]s.
///
/// [`Currency`]: common::money::Currency
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Total {
    /// Sum of the collected [`Payment`]s.
    pub amount: Money,

    /// Number of the collected [`Payment`]s.
    pub payments: PaymentsCount,
}

/// Count of [`Payment`]s.
#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, Into, PartialEq)]
pub struct PaymentsCount(i32);
