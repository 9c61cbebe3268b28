//! [`Promotion`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Percent};
use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};

/// Time-limited discount applicable to a booking.
#[derive(Clone, Debug)]
pub struct Promotion {
    /// [`Code`] of this [`Promotion`], identifying it.
    pub code: Code,

    /// [`Description`] of this [`Promotion`].
    pub description: Description,

    /// Discount granted by this [`Promotion`].
    pub discount: Percent,

    /// [`DateTime`] when this [`Promotion`] starts.
    pub starts_at: StartDateTime,

    /// [`DateTime`] when this [`Promotion`] ends.
    pub ends_at: EndDateTime,
}

impl Promotion {
    /// Indicates whether this [`Promotion`] is expired at the provided
    /// [`DateTime`].
    #[must_use]
    pub fn is_expired_at<Of: ?Sized>(&self, now: DateTimeOf<Of>) -> bool {
        let now: EndDateTime = now.coerce();
        now > self.ends_at
    }
}

/// Code (title) of a [`Promotion`] entered by a [`User`].
///
/// [`User`]: crate::domain::User
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Code(String);

impl Code {
    /// Creates a new [`Code`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `code` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Creates a new [`Code`] if the given `code` is valid.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Option<Self> {
        let code = code.into();
        Self::check(&code).then_some(Self(code))
    }

    /// Checks whether the given `code` is a valid [`Code`].
    fn check(code: impl AsRef<str>) -> bool {
        let code = code.as_ref();
        code.trim() == code && !code.is_empty() && code.len() <= 128
    }
}

impl FromStr for Code {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Code`")
    }
}

/// Description of a [`Promotion`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        (text.trim() == text && text.len() <= 4096).then_some(Self(text))
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Description`")
    }
}

/// [`DateTime`] when a [`Promotion`] starts.
pub type StartDateTime = DateTimeOf<(Promotion, unit::Beginning)>;

/// [`DateTime`] when a [`Promotion`] ends.
pub type EndDateTime = DateTimeOf<(Promotion, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use std::{str::FromStr as _, time::Duration};

    use common::{DateTime, Percent};

    use super::{Code, Description, Promotion};

    fn promotion(ends_at: DateTime) -> Promotion {
        Promotion {
            code: Code::new("SUMMER").unwrap(),
            description: Description::new("").unwrap(),
            discount: Percent::from_str("10").unwrap(),
            starts_at: DateTime::UNIX_EPOCH.coerce(),
            ends_at: ends_at.coerce(),
        }
    }

    #[test]
    fn expires_strictly_after_end() {
        let end = DateTime::now();
        let promo = promotion(end);

        assert!(!promo.is_expired_at(end - Duration::from_secs(60)));
        assert!(!promo.is_expired_at(end));
        assert!(promo.is_expired_at(end + Duration::from_secs(1)));
    }
}
