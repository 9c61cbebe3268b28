//! [`Payment`]-related definitions.

use std::future;

use common::{DateTime, Money};
use derive_more::{Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query as _};
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// A payment due for a booking.
#[derive(Clone, Debug, From, Into)]
pub struct Payment(domain::Payment);

/// A payment due for a booking.
#[graphql_object(context = Context)]
impl Payment {
    /// Unique identifier of this `Payment`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Amount to be paid.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.0.amount
    }

    /// Status of this `Payment`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Payment` was collected, if it was.
    #[must_use]
    pub fn paid_at(&self) -> Option<DateTime> {
        self.0.paid_at.map(|at| at.coerce())
    }

    /// Method this `Payment` was collected with, if it was.
    #[must_use]
    pub fn method(&self) -> Option<Method> {
        self.0.method.map(Into::into)
    }

    /// `Booking` this `Payment` is due for.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `BOOKING_NOT_EXISTS` - the `Booking` was removed meanwhile.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %self.0.booking_id,
            gql.name = "Payment.booking",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn booking(&self, ctx: &Context) -> Result<api::Booking, Error> {
        ctx.service()
            .execute(query::booking::ById::by(self.0.booking_id.clone()))
            .map_err(AsError::into_error)
            .and_then(|b| {
                future::ready(
                    b.map(Into::into)
                        .ok_or_else(|| api::BookingError::NotExists.into()),
                )
            })
            .map_err(ctx.error())
            .await
    }
}

/// Unique identifier of a `Payment`.
#[derive(Clone, Copy, Debug, Display, Into, From, GraphQLScalar)]
#[from(domain::payment::Id)]
#[into(domain::payment::Id)]
#[graphql(name = "PaymentId", transparent)]
pub struct Id(Uuid);

/// Status of a `Payment`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentStatus")]
pub enum Status {
    /// Awaiting the checkout.
    Unpaid,

    /// Collected on checkout.
    Paid,

    /// Voided by the booking cancellation.
    Invalidated,
}

impl From<domain::payment::Status> for Status {
    fn from(status: domain::payment::Status) -> Self {
        use domain::payment::Status as S;
        match status {
            S::Unpaid => Self::Unpaid,
            S::Paid => Self::Paid,
            S::Invalidated => Self::Invalidated,
        }
    }
}

/// Method of collecting a `Payment`.
#[derive(Clone, Copy, Debug, Default, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentMethod")]
pub enum Method {
    /// Cash.
    #[default]
    Cash,

    /// Bank card.
    Card,
}

impl From<domain::payment::Method> for Method {
    fn from(method: domain::payment::Method) -> Self {
        use domain::payment::Method as M;
        match method {
            M::Cash => Self::Cash,
            M::Card => Self::Card,
        }
    }
}

impl From<Method> for domain::payment::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Cash => Self::Cash,
            Method::Card => Self::Card,
        }
    }
}

#[cfg(test)]
mod spec {
    use service::domain;

    use super::{Method, Status};

    #[test]
    fn maps_every_method_both_ways() {
        for &method in domain::payment::Method::ALL {
            let back = domain::payment::Method::from(Method::from(method));
            assert_eq!(back, method);
        }
    }

    #[test]
    fn maps_every_status() {
        let mapped = domain::payment::Status::ALL
            .iter()
            .map(|s| Status::from(*s))
            .collect::<Vec<_>>();

        assert_eq!(
            mapped,
            [Status::Unpaid, Status::Paid, Status::Invalidated],
        );
    }

    #[test]
    fn collects_cash_by_default() {
        assert_eq!(Method::default(), Method::Cash);
    }
}
