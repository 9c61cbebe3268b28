//! [`Command`] definition.

pub mod cancel_booking;
pub mod checkout_booking;
pub mod create_booking;
pub mod create_homestay;
pub mod create_promotion;
pub mod create_user;
pub mod resolve_booking;
pub mod update_homestay_price;
pub mod update_homestay_status;

use derive_more::Display;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    cancel_booking::CancelBooking, checkout_booking::CheckoutBooking,
    create_booking::CreateBooking, create_homestay::CreateHomestay,
    create_promotion::CreatePromotion, create_user::CreateUser,
    resolve_booking::ResolveBooking,
    update_homestay_price::UpdateHomestayPrice,
    update_homestay_status::UpdateHomestayStatus,
};

/// Classification of a [`Command`] execution error.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorKind {
    /// Referenced record does not exist.
    NotFound,

    /// State of the referenced records doesn't allow the [`Command`].
    PreconditionFailed,

    /// [`Command`] conflicts with a concurrent one.
    Conflict,

    /// Infrastructure failure.
    Fatal,
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Helpers for setting up [`Command`]s tests.

    use std::{num::NonZeroU16, str::FromStr as _, time::Duration};

    use common::{money::Currency, Date, DateTime, Money, Percent};
    use rust_decimal::Decimal;

    use crate::{
        domain::{homestay, promotion, user, Homestay, User},
        infra::Memory,
        Config, Service,
    };

    use super::{
        Command as _, CreateBooking, CreateHomestay, CreatePromotion,
        CreateUser,
    };

    /// Creates a new [`Service`] over an empty [`Memory`] database.
    pub(crate) fn service() -> Service<Memory> {
        Service::new(Config::default(), Memory::new())
    }

    /// Parses the provided ISO 8601 date.
    pub(crate) fn date(s: &str) -> Date {
        Date::from_iso8601(s).unwrap()
    }

    /// Creates a new [`User`] with the provided username.
    pub(crate) async fn user(svc: &Service<Memory>, username: &str) -> User {
        svc.execute(CreateUser {
            username: user::Username::new(username).unwrap(),
            name: user::Name::new("Test User").unwrap(),
            email: user::Email::new(format!("{username}@example.com"))
                .unwrap(),
            phone: user::Phone::new("+84123456789").unwrap(),
        })
        .await
        .unwrap()
    }

    /// Creates a new available [`Homestay`] for 2 guests at 100 USD a night.
    pub(crate) async fn homestay(svc: &Service<Memory>) -> Homestay {
        svc.execute(CreateHomestay {
            description: homestay::Description::new("Near the lake").unwrap(),
            address: homestay::Address::new("1 Hoan Kiem, Hanoi").unwrap(),
            num_beds: 1,
            capacity: 2,
            price: Money {
                amount: Decimal::ONE_HUNDRED,
                currency: Currency::Usd,
            },
        })
        .await
        .unwrap()
    }

    /// Creates a new promotion with the provided discount, ending after the
    /// provided offset from now (negative offset means already ended).
    pub(crate) async fn promotion(
        svc: &Service<Memory>,
        code: &str,
        discount: &str,
        ends_in_secs: i64,
    ) -> promotion::Code {
        let now = DateTime::now();
        let offset = Duration::from_secs(ends_in_secs.unsigned_abs());
        let ends_at = if ends_in_secs < 0 {
            now - offset
        } else {
            now + offset
        };
        svc.execute(CreatePromotion {
            code: promotion::Code::new(code).unwrap(),
            description: promotion::Description::new("").unwrap(),
            discount: Percent::from_str(discount).unwrap(),
            starts_at: (now - Duration::from_secs(86_400)).coerce(),
            ends_at: ends_at.coerce(),
        })
        .await
        .unwrap()
        .code
    }

    /// Builds a [`CreateBooking`] for the provided stay.
    pub(crate) fn booking(
        username: &User,
        homestay_id: homestay::Id,
        checkin: &str,
        nights: u16,
        guests: u16,
    ) -> CreateBooking {
        CreateBooking {
            username: username.username.clone(),
            homestay_id,
            promotion: None,
            checkin_date: date(checkin).coerce(),
            num_nights: NonZeroU16::new(nights).unwrap(),
            num_guests: NonZeroU16::new(guests).unwrap(),
        }
    }
}
