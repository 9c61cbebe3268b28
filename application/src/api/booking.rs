//! [`Booking`]-related definitions.

use std::future;

use common::{Date, DateTime, Money, Percent};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLObject, GraphQLScalar};
use service::{command, domain, query, Query as _};

use crate::{api, api::scalar, AsError, Context, Error};

/// A reservation of a homestay for a range of nights.
#[derive(Clone, Debug, From, Into)]
pub struct Booking(domain::Booking);

/// A reservation of a homestay for a range of nights.
#[graphql_object(context = Context)]
impl Booking {
    /// Unique identifier of this `Booking`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.clone().into()
    }

    /// Status of this `Booking`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Booking` was made.
    #[must_use]
    pub fn booked_at(&self) -> DateTime {
        self.0.booked_at.coerce()
    }

    /// `Date` of the first night of this `Booking`.
    #[must_use]
    pub fn checkin_date(&self) -> Date {
        self.0.checkin_date.coerce()
    }

    /// `Date` the guests leave at.
    #[must_use]
    pub fn checkout_date(&self) -> Date {
        self.0.checkout_date.coerce()
    }

    /// Number of nights of this `Booking`.
    #[must_use]
    pub fn num_nights(&self) -> i32 {
        // Checkout is at most 65535 days after checkin.
        i32::try_from(self.0.checkin_date.days_until(&self.0.checkout_date))
            .unwrap_or(i32::MAX)
    }

    /// Number of guests of this `Booking`.
    #[must_use]
    pub fn num_guests(&self) -> i32 {
        self.0.num_guests.get().into()
    }

    /// Service fee charged for this `Booking`.
    #[must_use]
    pub fn service_fee(&self) -> Money {
        self.0.service_fee
    }

    /// Tax rate fixed at the moment this `Booking` was made.
    #[must_use]
    pub fn tax_rate(&self) -> Percent {
        self.0.tax_rate.percent()
    }

    /// `User` who made this `Booking`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` was removed meanwhile.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.user",
            otel.name = api::Query::SPAN_NAME,
            username = %self.0.username,
        ),
    )]
    pub async fn user(&self, ctx: &Context) -> Result<api::User, Error> {
        ctx.service()
            .execute(query::user::ByUsername::by(self.0.username.clone()))
            .map_err(AsError::into_error)
            .and_then(|u| {
                future::ready(
                    u.map(Into::into)
                        .ok_or_else(|| api::UserError::NotExists.into()),
                )
            })
            .map_err(ctx.error())
            .await
    }

    /// Booked `Homestay`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `HOMESTAY_NOT_EXISTS` - the `Homestay` was removed meanwhile.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.homestay",
            homestay_id = %self.0.homestay_id,
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn homestay(
        &self,
        ctx: &Context,
    ) -> Result<api::Homestay, Error> {
        ctx.service()
            .execute(query::homestay::ById::by(self.0.homestay_id))
            .map_err(AsError::into_error)
            .and_then(|h| {
                future::ready(
                    h.map(Into::into)
                        .ok_or_else(|| api::HomestayError::NotExists.into()),
                )
            })
            .map_err(ctx.error())
            .await
    }

    /// `Promotion` applied to this `Booking`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Booking.promotion",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn promotion(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Promotion>, Error> {
        let Some(code) = self.0.promotion.clone() else {
            return Ok(None);
        };
        ctx.service()
            .execute(query::promotion::ByCode::by(code))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|p| p.map(Into::into))
    }

    /// `Payment` due for this `Booking`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PAYMENT_NOT_EXISTS` - the `Payment` was removed meanwhile.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %self.0.id,
            gql.name = "Booking.payment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment(&self, ctx: &Context) -> Result<api::Payment, Error> {
        ctx.service()
            .execute(query::payment::ByBookingId::by(self.0.id.clone()))
            .map_err(AsError::into_error)
            .and_then(|p| {
                future::ready(
                    p.map(Into::into)
                        .ok_or_else(|| api::PaymentError::NotExists.into()),
                )
            })
            .map_err(ctx.error())
            .await
    }
}

/// Unique identifier of a `Booking`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "BookingId", with = scalar::Via::<domain::booking::Id>)]
pub struct Id(domain::booking::Id);

/// Status of a `Booking`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BookingStatus")]
pub enum Status {
    /// Active, holding its nights.
    Validated,

    /// Cancelled by its guest.
    Cancelled,

    /// Guests checked out.
    Completed,
}

impl From<domain::booking::Status> for Status {
    fn from(status: domain::booking::Status) -> Self {
        use domain::booking::Status as S;
        match status {
            S::Validated => Self::Validated,
            S::Cancelled => Self::Cancelled,
            S::Completed => Self::Completed,
        }
    }
}

/// Itemized price of a `Booking`.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(name = "PriceBreakdown")]
pub struct Breakdown {
    /// Price of all the nights.
    pub homestay_fee: Money,

    /// Service fee for all the guests and nights.
    pub service_fee: Money,

    /// Surcharge for the guests above the `Homestay` capacity.
    pub capacity_surcharge: Money,

    /// Sum before taxes.
    pub pre_tax: Money,

    /// Taxes.
    pub tax: Money,

    /// Sum after taxes.
    pub after_tax: Money,

    /// Discount subtracted after taxes.
    pub discount: Money,

    /// Final amount to pay.
    pub total: Money,
}

impl From<domain::pricing::Breakdown> for Breakdown {
    fn from(b: domain::pricing::Breakdown) -> Self {
        let domain::pricing::Breakdown {
            homestay_fee,
            service_fee,
            capacity_surcharge,
            pre_tax,
            tax,
            after_tax,
            discount,
            total,
        } = b;
        Self {
            homestay_fee,
            service_fee,
            capacity_surcharge,
            pre_tax,
            tax,
            after_tax,
            discount,
            total,
        }
    }
}

/// Result of creating a `Booking`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "CreateBookingResult", context = Context)]
pub struct CreateResult {
    /// Created `Booking`.
    pub booking: Booking,

    /// `Payment` due for the created `Booking`.
    pub payment: api::Payment,

    /// Itemized price of the created `Booking`.
    pub breakdown: Breakdown,
}

impl From<command::create_booking::Output> for CreateResult {
    fn from(out: command::create_booking::Output) -> Self {
        Self {
            booking: out.booking.into(),
            payment: out.payment.into(),
            breakdown: out.breakdown.into(),
        }
    }
}

/// Result of cancelling or checking out a `Booking`.
#[derive(Clone, Debug, GraphQLObject)]
#[graphql(name = "ResolveBookingResult", context = Context)]
pub struct ResolveResult {
    /// Resolved `Booking`.
    pub booking: Booking,

    /// Invalidated or collected `Payment` of the resolved `Booking`.
    pub payment: api::Payment,
}

impl From<command::resolve_booking::Output> for ResolveResult {
    fn from(out: command::resolve_booking::Output) -> Self {
        Self {
            booking: out.booking.into(),
            payment: out.payment.into(),
        }
    }
}
