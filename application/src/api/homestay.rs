//! [`Homestay`]-related definitions.

use common::{DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api::scalar, Context};

/// A homestay offered for booking.
#[derive(Clone, Debug, From, Into)]
pub struct Homestay(domain::Homestay);

/// A homestay offered for booking.
#[graphql_object(context = Context)]
impl Homestay {
    /// Unique identifier of this `Homestay`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Description of this `Homestay`.
    #[must_use]
    pub fn description(&self) -> Description {
        self.0.description.clone().into()
    }

    /// Address of this `Homestay`.
    #[must_use]
    pub fn address(&self) -> Address {
        self.0.address.clone().into()
    }

    /// Number of beds in this `Homestay`.
    #[must_use]
    pub fn num_beds(&self) -> i32 {
        self.0.num_beds.into()
    }

    /// Number of guests this `Homestay` accommodates without a surcharge.
    #[must_use]
    pub fn capacity(&self) -> i32 {
        self.0.capacity.into()
    }

    /// Price of a single night in this `Homestay`.
    #[must_use]
    pub fn price(&self) -> Money {
        self.0.price
    }

    /// Status of this `Homestay`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Indicator whether this `Homestay` can be booked.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.0.is_available()
    }

    /// `DateTime` when this `Homestay` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Homestay`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::homestay::Id)]
#[into(domain::homestay::Id)]
#[graphql(name = "HomestayId", transparent)]
pub struct Id(Uuid);

/// Description of a `Homestay`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "HomestayDescription",
    with = scalar::Via::<domain::homestay::Description>,
)]
pub struct Description(domain::homestay::Description);

/// Address of a `Homestay`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "HomestayAddress",
    with = scalar::Via::<domain::homestay::Address>,
)]
pub struct Address(domain::homestay::Address);

/// Status of a `Homestay`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "HomestayStatus")]
pub enum Status {
    /// Open for new bookings.
    Available,

    /// Occupied by guests.
    Booked,

    /// Closed by its host.
    Unavailable,
}

impl From<domain::homestay::Status> for Status {
    fn from(status: domain::homestay::Status) -> Self {
        use domain::homestay::Status as S;
        match status {
            S::Available => Self::Available,
            S::Booked => Self::Booked,
            S::Unavailable => Self::Unavailable,
        }
    }
}

impl From<Status> for domain::homestay::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Available => Self::Available,
            Status::Booked => Self::Booked,
            Status::Unavailable => Self::Unavailable,
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain;

    use super::Status;

    #[test]
    fn maps_every_status_both_ways() {
        for &status in domain::homestay::Status::ALL {
            let back = domain::homestay::Status::from(Status::from(status));
            assert_eq!(back, status);
        }
    }
}
