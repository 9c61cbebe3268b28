//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, Query as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Homestay` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `HOMESTAY_NOT_EXISTS` - the `Homestay` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "homestay",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn homestay(
        id: api::homestay::Id,
        ctx: &Context,
    ) -> Result<api::Homestay, Error> {
        ctx.service()
            .execute(query::homestay::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::HomestayError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `User` with the specified `Username`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USER_NOT_EXISTS` - the `User` with the specified `Username` does not
    ///                       exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "user",
            otel.name = Self::SPAN_NAME,
            username = %username,
        ),
    )]
    pub async fn user(
        username: api::user::Username,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(query::user::ByUsername::by(username.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Promotion` with the specified code.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROMOTION_NOT_EXISTS` - the `Promotion` with the specified code
    ///                            does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            code = %code,
            gql.name = "promotion",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn promotion(
        code: api::promotion::Code,
        ctx: &Context,
    ) -> Result<api::Promotion, Error> {
        ctx.service()
            .execute(query::promotion::ByCode::by(code.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::PromotionError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Booking` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "booking",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn booking(
        id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        ctx.service()
            .execute(query::booking::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::BookingError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Booking`s made by the `User` with the specified
    /// `Username`, the most recent first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "bookings",
            otel.name = Self::SPAN_NAME,
            username = %username,
        ),
    )]
    pub async fn bookings(
        username: api::user::Username,
        ctx: &Context,
    ) -> Result<Vec<api::Booking>, Error> {
        ctx.service()
            .execute(query::bookings::ByUser::by(username.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }

    /// Returns the `Payment` due for the `Booking` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PAYMENT_NOT_EXISTS` - the `Booking` with the specified ID has no
    ///                          `Payment`.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %booking_id,
            gql.name = "payment",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn payment(
        booking_id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Payment, Error> {
        ctx.service()
            .execute(query::payment::ByBookingId::by(booking_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::PaymentError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the income collected in the specified calendar `month` of the
    /// `year`, or in the whole `year` if no `month` is specified.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_PERIOD` - the specified period doesn't exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "incomeReport",
            month = ?month,
            otel.name = Self::SPAN_NAME,
            year = %year,
        ),
    )]
    pub async fn income_report(
        year: i32,
        month: Option<i32>,
        ctx: &Context,
    ) -> Result<api::report::Income, Error> {
        let period = match month {
            Some(m) => u8::try_from(m)
                .ok()
                .and_then(|m| query::report::Income::monthly(year, m)),
            None => query::report::Income::yearly(year),
        }
        .ok_or_else(|| api::InputError::Period.into())
        .map_err(ctx.error())?;

        ctx.service()
            .execute(period)
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|totals| api::report::Income::new(period, totals))
    }
}
