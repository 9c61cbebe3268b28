//! [`Homestay`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Homestay listed for short-term rent.
#[derive(Clone, Debug)]
pub struct Homestay {
    /// ID of this [`Homestay`].
    pub id: Id,

    /// [`Description`] of this [`Homestay`].
    pub description: Description,

    /// [`Address`] of this [`Homestay`].
    pub address: Address,

    /// Number of beds in this [`Homestay`].
    pub num_beds: NumBeds,

    /// Number of guests this [`Homestay`] accommodates without a surcharge.
    pub capacity: Capacity,

    /// Price of a single night in this [`Homestay`].
    pub price: Money,

    /// [`Status`] of this [`Homestay`].
    pub status: Status,

    /// [`DateTime`] when this [`Homestay`] was created.
    pub created_at: CreationDateTime,
}

impl Homestay {
    /// Indicates whether this [`Homestay`] accepts new bookings.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == Status::Available
    }
}

/// ID of a [`Homestay`].
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

/// Description of a [`Homestay`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `text` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Description`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        text.trim() == text && !text.is_empty() && text.len() <= 4096
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// Full address of a [`Homestay`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Address(String);

impl Address {
    /// Creates a new [`Address`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Address`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Address`].
    fn check(address: impl AsRef<str>) -> bool {
        let address = address.as_ref();
        address.trim() == address && !address.is_empty() && address.len() <= 512
    }
}

impl FromStr for Address {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Address`")
    }
}

/// Number of beds in a [`Homestay`].
pub type NumBeds = u16;

/// Number of guests a [`Homestay`] accommodates.
pub type Capacity = u16;

define_kind! {
    #[doc = "Status of a [`Homestay`]."]
    enum Status {
        #[doc = "[`Homestay`] accepts new bookings."]
        Available = 1,

        #[doc = "[`Homestay`] is occupied for now."]
        Booked = 2,

        #[doc = "[`Homestay`] is withdrawn from rent."]
        Unavailable = 3,
    }
}

/// [`DateTime`] when a [`Homestay`] was created.
pub type CreationDateTime = DateTimeOf<(Homestay, unit::Creation)>;
