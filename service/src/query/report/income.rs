//! [`Income`] definition.

use std::{ops::RangeInclusive, time::Duration};

use common::{
    operations::{By, Select},
    Date, DateTime,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Payment;
use crate::{
    domain::payment,
    infra::{database, Database},
    read, Query, Service,
};

/// [`Query`] to sum up the income collected via paid [`Payment`]s in a
/// given period, per currency.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Income {
    /// Start of the period, inclusive.
    pub start: DateTime,

    /// End of the period, inclusive.
    pub end: DateTime,
}

impl Income {
    /// Creates an [`Income`] report for the provided calendar month.
    ///
    /// [`None`] is returned if the month doesn't exist.
    #[must_use]
    pub fn monthly(year: i32, month: u8) -> Option<Self> {
        let start = Date::from_calendar(year, month, 1)?;
        let next = if month == 12 {
            Date::from_calendar(year.checked_add(1)?, 1, 1)?
        } else {
            Date::from_calendar(year, month + 1, 1)?
        };
        Some(Self::between(start, next))
    }

    /// Creates an [`Income`] report for the provided calendar year.
    ///
    /// [`None`] is returned if the year is out of the supported range.
    #[must_use]
    pub fn yearly(year: i32) -> Option<Self> {
        let start = Date::from_calendar(year, 1, 1)?;
        let next = Date::from_calendar(year.checked_add(1)?, 1, 1)?;
        Some(Self::between(start, next))
    }

    /// Creates an [`Income`] report covering the days from `start` up to
    /// the `next` one, exclusive.
    fn between(start: Date, next: Date) -> Self {
        Self {
            start: start.midnight(),
            end: next.midnight() - Duration::from_micros(1),
        }
    }
}

impl<Db> Query<Income> for Service<Db>
where
    Db: Database<
        Select<
            By<
                Vec<read::income::Total>,
                RangeInclusive<payment::PaymentDateTime>,
            >,
        >,
        Ok = Vec<read::income::Total>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<read::income::Total>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Income { start, end }: Income,
    ) -> Result<Self::Ok, Self::Err> {
        if start > end {
            return Ok(vec![]);
        }

        self.database()
            .execute(Select(By::<Vec<read::income::Total>, _>::new(
                RangeInclusive::new(start.coerce(), end.coerce()),
            )))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use common::{Date, DateTime, Money};

    use crate::{
        command::{fixture, CancelBooking, CheckoutBooking, Command as _},
        domain::payment,
        read::income::PaymentsCount,
        Query as _,
    };

    use super::Income;

    #[test]
    fn covers_whole_month() {
        let dec = Income::monthly(2024, 12).unwrap();
        assert_eq!(
            Date::from(dec.start).to_iso8601(),
            "2024-12-01".to_owned(),
        );
        assert_eq!(Date::from(dec.end).to_iso8601(), "2024-12-31".to_owned());

        let feb = Income::monthly(2024, 2).unwrap();
        assert_eq!(Date::from(feb.end).to_iso8601(), "2024-02-29".to_owned());

        assert!(Income::monthly(2024, 13).is_none());
    }

    #[tokio::test]
    async fn sums_paid_payments_only() {
        let svc = fixture::service();
        let h = fixture::homestay(&svc).await;

        let mut bookings = vec![];
        for (name, checkin) in [("alice", "2030-06-10"), ("bob", "2030-07-10")]
        {
            let u = fixture::user(&svc, name).await;
            let out = svc
                .execute(fixture::booking(&u, h.id, checkin, 3, 2))
                .await
                .unwrap();
            bookings.push(out.booking);
        }
        let carol = fixture::user(&svc, "carol").await;
        svc.execute(fixture::booking(&carol, h.id, "2030-08-10", 1, 1))
            .await
            .unwrap();

        svc.execute(CheckoutBooking {
            username: bookings[0].username.clone(),
            homestay_id: h.id,
            booking_id: bookings[0].id.clone(),
            method: payment::Method::Cash,
        })
        .await
        .unwrap();
        svc.execute(CancelBooking {
            username: bookings[1].username.clone(),
            homestay_id: h.id,
            booking_id: bookings[1].id.clone(),
        })
        .await
        .unwrap();

        let year = Date::from(DateTime::now()).year();
        let totals = svc.execute(Income::yearly(year).unwrap()).await.unwrap();

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].amount, Money::from_str("429USD").unwrap());
        assert_eq!(totals[0].payments, PaymentsCount::from(1));

        let past = svc
            .execute(Income::yearly(year - 1).unwrap())
            .await
            .unwrap();
        assert!(past.is_empty());
    }
}
