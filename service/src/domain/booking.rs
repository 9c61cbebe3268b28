//! [`Booking`] definitions.

use std::{num::NonZeroU16, str::FromStr};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, Date, DateOf, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rand::Rng as _;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{homestay, promotion, user};

/// Reservation of a [`Homestay`] made by a [`User`] for a range of nights.
///
/// [`Homestay`]: crate::domain::Homestay
/// [`User`]: crate::domain::User
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// [`user::Username`] of the [`User`] who made this [`Booking`].
    ///
    /// [`User`]: crate::domain::User
    pub username: user::Username,

    /// ID of the booked [`Homestay`].
    ///
    /// [`Homestay`]: crate::domain::Homestay
    pub homestay_id: homestay::Id,

    /// [`promotion::Code`] applied to this [`Booking`], if any.
    pub promotion: Option<promotion::Code>,

    /// [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`DateTime`] when this [`Booking`] was made.
    pub booked_at: CreationDateTime,

    /// [`Date`] of the first night of this [`Booking`].
    pub checkin_date: CheckInDate,

    /// [`Date`] the guests leave at, exclusive.
    pub checkout_date: CheckOutDate,

    /// Number of guests of this [`Booking`].
    pub num_guests: NumGuests,

    /// Service fee charged for this [`Booking`].
    pub service_fee: Money,

    /// [`TaxRate`] fixed at the moment this [`Booking`] was made.
    pub tax_rate: TaxRate,
}

impl Booking {
    /// Indicates whether this [`Booking`] is still active.
    #[must_use]
    pub fn is_validated(&self) -> bool {
        self.status == Status::Validated
    }

    /// Indicates whether this [`Booking`] was made by the provided [`User`]
    /// for the provided [`Homestay`].
    ///
    /// [`Homestay`]: crate::domain::Homestay
    /// [`User`]: crate::domain::User
    #[must_use]
    pub fn is_owned_by(
        &self,
        username: &user::Username,
        homestay_id: homestay::Id,
    ) -> bool {
        &self.username == username && self.homestay_id == homestay_id
    }

    /// Indicates whether the nights of this [`Booking`] intersect the
    /// provided half-open `[checkin, checkout)` range.
    #[must_use]
    pub fn overlaps(
        &self,
        checkin: CheckInDate,
        checkout: CheckOutDate,
    ) -> bool {
        let (start, end): (Date, Date) = (checkin.coerce(), checkout.coerce());
        let (own_start, own_end): (Date, Date) =
            (self.checkin_date.coerce(), self.checkout_date.coerce());
        own_start < end && start < own_end
    }

    /// Cancels this [`Booking`], releasing its nights.
    pub fn cancel(&mut self) {
        self.status = Status::Cancelled;
        self.checkin_date = CheckInDate::NULL;
        self.checkout_date = CheckOutDate::NULL;
    }

    /// Completes this [`Booking`] once the guests have checked out.
    pub fn complete(&mut self) {
        self.status = Status::Completed;
    }
}

/// ID of a [`Booking`]: a random code shown to the [`User`].
///
/// [`User`]: crate::domain::User
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Id(String);

impl Id {
    /// Symbols an [`Id`] consists of.
    const ALPHABET: &'static [u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ123456789";

    /// Length of an [`Id`].
    const LEN: usize = 8;

    /// Generates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        Self(
            (0..Self::LEN)
                .map(|_| {
                    char::from(
                        Self::ALPHABET[rng.gen_range(0..Self::ALPHABET.len())],
                    )
                })
                .collect(),
        )
    }

    /// Parses an [`Id`] out of the provided `code`, if it's valid.
    #[must_use]
    pub fn parse(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        (code.len() == Self::LEN
            && code.bytes().all(|b| Self::ALPHABET.contains(&b)))
        .then_some(Self(code))
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Id {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or("invalid `booking::Id`")
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`]."]
    enum Status {
        #[doc = "[`Booking`] is active and holds its nights."]
        Validated = 1,

        #[doc = "[`Booking`] was cancelled by its guest."]
        Cancelled = 2,

        #[doc = "Guests checked out after the [`Booking`] nights."]
        Completed = 3,
    }
}

/// Number of guests of a [`Booking`].
pub type NumGuests = NonZeroU16;

/// Number of nights of a [`Booking`].
pub type NumNights = NonZeroU16;

/// Tax rate applied to a [`Booking`] price, as a fraction in `0..=1` range.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// Creates a new [`TaxRate`] if the provided `rate` is in `0..=1` range.
    #[must_use]
    pub fn new(rate: Decimal) -> Option<Self> {
        (Decimal::ZERO..=Decimal::ONE)
            .contains(&rate)
            .then_some(Self(rate))
    }

    /// Returns the inner [`Decimal`] value of this [`TaxRate`].
    #[must_use]
    pub fn value(self) -> Decimal {
        self.0
    }

    /// Returns this [`TaxRate`] as a [`Percent`].
    #[must_use]
    pub fn percent(self) -> Percent {
        #[expect(unsafe_code, reason = "`0..=1` rate fits `0..=100` percents")]
        unsafe {
            Percent::new_unchecked(self.0 * Decimal::ONE_HUNDRED)
        }
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self(Decimal::new(10, 2))
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = &'static str;

    fn try_from(rate: Decimal) -> Result<Self, Self::Error> {
        Self::new(rate).ok_or("tax rate must be in `0..=1` range")
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

/// [`DateTime`] when a [`Booking`] was made.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`Date`] of the first night of a [`Booking`].
pub type CheckInDate = DateOf<(Booking, unit::Arrival)>;

/// [`Date`] the guests of a [`Booking`] leave at.
pub type CheckOutDate = DateOf<(Booking, unit::Departure)>;

#[cfg(test)]
mod spec {
    use std::num::NonZeroU16;

    use common::{money::Currency, Date, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::domain::{homestay, user};

    use super::{Booking, CheckInDate, CheckOutDate, Id, Status, TaxRate};

    fn date(s: &str) -> Date {
        Date::from_iso8601(s).unwrap()
    }

    fn booking(checkin: &str, checkout: &str) -> Booking {
        Booking {
            id: Id::new(),
            username: user::Username::new("alice").unwrap(),
            homestay_id: homestay::Id::new(),
            promotion: None,
            status: Status::Validated,
            booked_at: DateTime::now().coerce(),
            checkin_date: date(checkin).coerce(),
            checkout_date: date(checkout).coerce(),
            num_guests: NonZeroU16::new(2).unwrap(),
            service_fee: Money::zero(Currency::Usd),
            tax_rate: TaxRate::default(),
        }
    }

    fn range(checkin: &str, checkout: &str) -> (CheckInDate, CheckOutDate) {
        (date(checkin).coerce(), date(checkout).coerce())
    }

    #[test]
    fn generates_valid_ids() {
        for _ in 0..100 {
            let id = Id::new();

            assert_eq!(id.to_string().len(), 8);
            assert_eq!(Id::parse(id.to_string()), Some(id));
        }
        assert!(Id::parse("ABCD0123").is_none());
        assert!(Id::parse("abcdefgh").is_none());
        assert!(Id::parse("ABCDEFG").is_none());
    }

    #[test]
    fn overlaps_half_open_ranges() {
        let b = booking("2024-06-10", "2024-06-13");

        let (i, o) = range("2024-06-11", "2024-06-12");
        assert!(b.overlaps(i, o), "inside");
        let (i, o) = range("2024-06-08", "2024-06-11");
        assert!(b.overlaps(i, o), "tail into head");
        let (i, o) = range("2024-06-12", "2024-06-20");
        assert!(b.overlaps(i, o), "head into tail");
        let (i, o) = range("2024-06-01", "2024-06-30");
        assert!(b.overlaps(i, o), "covering");
        let (i, o) = range("2024-06-10", "2024-06-11");
        assert!(b.overlaps(i, o), "same checkin");

        let (i, o) = range("2024-06-13", "2024-06-15");
        assert!(!b.overlaps(i, o), "checkin on checkout day");
        let (i, o) = range("2024-06-07", "2024-06-10");
        assert!(!b.overlaps(i, o), "checkout on checkin day");
    }

    #[test]
    fn cancel_resets_dates() {
        let mut b = booking("2024-06-10", "2024-06-13");
        b.cancel();

        assert_eq!(b.status, Status::Cancelled);
        assert!(b.checkin_date.is_null());
        assert!(b.checkout_date.is_null());
        assert!(!b.is_validated());
    }

    #[test]
    fn tax_rate_bounds() {
        assert_eq!(TaxRate::default().value(), Decimal::new(1, 1));
        assert!(TaxRate::new(Decimal::ONE).is_some());
        assert!(TaxRate::new(Decimal::new(-1, 2)).is_none());
        assert!(TaxRate::new(Decimal::new(101, 2)).is_none());
        assert_eq!(TaxRate::default().percent().value(), Decimal::TEN);
    }
}
