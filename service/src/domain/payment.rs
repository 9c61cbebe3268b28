//! [`Payment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::booking;

/// Payment due for a [`Booking`].
///
/// [`Booking`]: crate::domain::Booking
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`Booking`] this [`Payment`] is due for.
    ///
    /// [`Booking`]: crate::domain::Booking
    pub booking_id: booking::Id,

    /// Amount of this [`Payment`].
    pub amount: Money,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`DateTime`] when this [`Payment`] was paid, if it was.
    pub paid_at: Option<PaymentDateTime>,

    /// [`Method`] this [`Payment`] was paid with, if it was.
    pub method: Option<Method>,
}

impl Payment {
    /// Creates a new unpaid [`Payment`] of the provided `amount`.
    #[must_use]
    pub fn unpaid(booking_id: booking::Id, amount: Money) -> Self {
        Self {
            id: Id::new(),
            booking_id,
            amount,
            status: Status::Unpaid,
            paid_at: None,
            method: None,
        }
    }

    /// Indicates whether this [`Payment`] is still awaited.
    #[must_use]
    pub fn is_unpaid(&self) -> bool {
        self.status == Status::Unpaid
    }

    /// Marks this [`Payment`] as paid with the provided [`Method`].
    pub fn pay(&mut self, method: Method, at: PaymentDateTime) {
        self.status = Status::Paid;
        self.paid_at = Some(at);
        self.method = Some(method);
    }

    /// Invalidates this [`Payment`], so it's never collected.
    pub fn invalidate(&mut self) {
        self.status = Status::Invalidated;
    }
}

/// ID of a [`Payment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "[`Payment`] is awaited."]
        Unpaid = 1,

        #[doc = "[`Payment`] is collected."]
        Paid = 2,

        #[doc = "[`Payment`] is not going to be collected."]
        Invalidated = 3,
    }
}

define_kind! {
    #[doc = "Method a [`Payment`] is paid with."]
    enum Method {
        #[doc = "Cash at the checkout."]
        Cash = 1,

        #[doc = "Bank card."]
        Card = 2,
    }
}

/// [`DateTime`] when a [`Payment`] was paid.
pub type PaymentDateTime = DateTimeOf<(Payment, unit::Settlement)>;
