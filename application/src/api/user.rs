//! [`User`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};

use crate::{api, api::scalar, AsError, Context, Error};

/// A user booking homestays.
#[derive(Clone, Debug, From, Into)]
pub struct User(domain::User);

/// A user booking homestays.
#[graphql_object(context = Context)]
impl User {
    /// Unique username of this `User`.
    #[must_use]
    pub fn username(&self) -> Username {
        self.0.username.clone().into()
    }

    /// Name of this `User`.
    #[must_use]
    pub fn name(&self) -> Name {
        self.0.name.clone().into()
    }

    /// Email of this `User`.
    #[must_use]
    pub fn email(&self) -> Email {
        self.0.email.clone().into()
    }

    /// Phone of this `User`.
    #[must_use]
    pub fn phone(&self) -> Phone {
        self.0.phone.clone().into()
    }

    /// Indicator whether this `User` has an active `Booking`.
    #[must_use]
    pub fn is_booking(&self) -> bool {
        self.0.is_booking
    }

    /// `DateTime` when this `User` was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }

    /// All the `Booking`s made by this `User`, the most recent first.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "User.bookings",
            otel.name = api::Query::SPAN_NAME,
            username = %self.0.username,
        ),
    )]
    pub async fn bookings(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::Booking>, Error> {
        ctx.service()
            .execute(query::bookings::ByUser::by(self.0.username.clone()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|list| list.into_iter().map(Into::into).collect())
    }
}

/// Username of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "Username", with = scalar::Via::<domain::user::Username>)]
pub struct Username(domain::user::Username);

/// Name of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "UserName", with = scalar::Via::<domain::user::Name>)]
pub struct Name(domain::user::Name);

/// Email of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "UserEmail", with = scalar::Via::<domain::user::Email>)]
pub struct Email(domain::user::Email);

/// Phone of a `User`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(name = "UserPhone", with = scalar::Via::<domain::user::Phone>)]
pub struct Phone(domain::user::Phone);
