//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{cmp::Ordering, fmt, marker::PhantomData};

use derive_more::Debug;
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{format_description::BorrowedFormatItem, macros::format_description};

use crate::DateTimeOf;

/// Untyped calendar date.
pub type Date = DateOf;

/// Format of a [`Date`] in its textual representation.
const FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]");

/// Calendar date without any time or offset.
#[derive(Debug)]
pub struct DateOf<Of: ?Sized = ()> {
    /// Inner representation of the date.
    inner: time::Date,

    /// Type parameter describing the kind of date.
    #[debug(skip)]
    _of: PhantomData<Of>,
}

impl<Of: ?Sized> DateOf<Of> {
    /// A [`Date`] representing an absence of a meaningful date:
    /// `0001-01-01`.
    pub const NULL: Self = Self {
        inner: match time::Date::from_calendar_date(1, time::Month::January, 1)
        {
            Ok(d) => d,
            Err(_) => panic!("`0001-01-01` is a valid date"),
        },
        _of: PhantomData,
    };

    /// Creates a new [`Date`] from the provided calendar components.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_calendar(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self::from)
    }

    /// Creates a new [`Date`] from the provided `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid `YYYY-MM-DD` date.
    pub fn from_iso8601(input: &str) -> Result<Self, time::error::Parse> {
        time::Date::parse(input, FORMAT).map(Self::from)
    }

    /// Returns this [`Date`] as a `YYYY-MM-DD` string.
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn to_iso8601(&self) -> String {
        self.inner.format(FORMAT).unwrap_or_else(|e| {
            panic!("cannot format `Date` as ISO 8601: {e}")
        })
    }

    /// Indicates whether this [`Date`] is the [`Date::NULL`] one.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.inner == Self::NULL.inner
    }

    /// Returns the year of this [`Date`].
    #[must_use]
    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    /// Returns the [`Date`] coming the provided number of `days` later.
    ///
    /// [`None`] is returned if the resulting date is out of range.
    #[must_use]
    pub fn checked_add_days(self, days: u16) -> Option<Self> {
        self.inner
            .checked_add(time::Duration::days(i64::from(days)))
            .map(Self::from)
    }

    /// Returns the number of days from this [`Date`] to the `other` one.
    #[must_use]
    pub fn days_until<OtherOf: ?Sized>(&self, other: &DateOf<OtherOf>) -> i64 {
        (other.inner - self.inner).whole_days()
    }

    /// Returns the midnight (UTC) of this [`Date`].
    #[expect(clippy::missing_panics_doc, reason = "infallible")]
    #[must_use]
    pub fn midnight(self) -> DateTimeOf<Of> {
        self.inner
            .midnight()
            .assume_utc()
            .try_into()
            .expect("infallible")
    }

    /// Coerces one kind of [`Date`] into another.
    #[must_use]
    pub fn coerce<NewOf: ?Sized>(self) -> DateOf<NewOf> {
        DateOf {
            inner: self.inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> Copy for DateOf<Of> {}
impl<Of: ?Sized> Clone for DateOf<Of> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Of: ?Sized> Eq for DateOf<Of> {}
impl<Of: ?Sized> PartialEq for DateOf<Of> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<Of: ?Sized> Ord for DateOf<Of> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<Of: ?Sized> PartialOrd for DateOf<Of> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Of: ?Sized> fmt::Display for DateOf<Of> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl<Of: ?Sized> From<time::Date> for DateOf<Of> {
    fn from(inner: time::Date) -> Self {
        Self {
            inner,
            _of: PhantomData,
        }
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for time::Date {
    fn from(d: DateOf<Of>) -> Self {
        d.inner
    }
}

impl<Of: ?Sized> From<DateTimeOf<Of>> for DateOf<Of> {
    fn from(dt: DateTimeOf<Of>) -> Self {
        time::OffsetDateTime::from(dt).date().into()
    }
}

impl<Of: ?Sized> From<DateOf<Of>> for DateTimeOf<Of> {
    fn from(d: DateOf<Of>) -> Self {
        d.midnight()
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> FromSql<'_> for DateOf<Of> {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self::from)
    }
}

#[cfg(feature = "postgres")]
impl<Of: ?Sized> ToSql for DateOf<Of> {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.inner.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in a `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = crate::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_iso8601())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_iso8601(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use super::Date;

    #[test]
    fn parses_and_formats() {
        let date = Date::from_iso8601("2024-02-28").unwrap();

        assert_eq!(date, Date::from_calendar(2024, 2, 28).unwrap());
        assert_eq!(date.to_iso8601(), "2024-02-28");
        assert!(Date::from_iso8601("2024-02-30").is_err());
        assert!(Date::from_iso8601("28.02.2024").is_err());
    }

    #[test]
    fn null_sentinel() {
        assert_eq!(Date::NULL.to_iso8601(), "0001-01-01");
        assert!(Date::NULL.is_null());
        assert!(!Date::from_calendar(2024, 1, 1).unwrap().is_null());
    }

    #[test]
    fn adds_days_across_months() {
        let date = Date::from_calendar(2024, 2, 28).unwrap();

        assert_eq!(
            date.checked_add_days(2),
            Date::from_calendar(2024, 3, 1),
        );
        assert_eq!(date.checked_add_days(0), Some(date));
        assert_eq!(date.days_until(&date.checked_add_days(30).unwrap()), 30);
    }

    #[test]
    fn overflow_is_none() {
        let date = Date::from_calendar(9999, 12, 31).unwrap();

        assert_eq!(date.checked_add_days(1), None);
    }

    #[test]
    fn midnight_keeps_date() {
        let date = Date::from_calendar(2024, 5, 17).unwrap();

        assert_eq!(Date::from(date.midnight()), date);
    }
}
