//! [`Promotion`]-related definitions.

use common::{DateTime, Percent};
use derive_more::{AsRef, Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;

use crate::{api::scalar, Context};

/// A time-limited discount applicable to bookings.
#[derive(Clone, Debug, From, Into)]
pub struct Promotion(domain::Promotion);

/// A time-limited discount applicable to bookings.
#[graphql_object(context = Context)]
impl Promotion {
    /// Unique code of this `Promotion`.
    #[must_use]
    pub fn code(&self) -> Code {
        self.0.code.clone().into()
    }

    /// Description of this `Promotion`.
    #[must_use]
    pub fn description(&self) -> Description {
        self.0.description.clone().into()
    }

    /// Discount granted by this `Promotion`, applied after taxes.
    #[must_use]
    pub fn discount(&self) -> Percent {
        self.0.discount
    }

    /// `DateTime` when this `Promotion` starts.
    #[must_use]
    pub fn starts_at(&self) -> DateTime {
        self.0.starts_at.coerce()
    }

    /// `DateTime` when this `Promotion` ends.
    #[must_use]
    pub fn ends_at(&self) -> DateTime {
        self.0.ends_at.coerce()
    }

    /// Indicator whether this `Promotion` is expired already.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.0.is_expired_at(DateTime::now())
    }
}

/// Code of a `Promotion`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PromotionCode",
    with = scalar::Via::<domain::promotion::Code>,
)]
pub struct Code(domain::promotion::Code);

/// Description of a `Promotion`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "PromotionDescription",
    with = scalar::Via::<domain::promotion::Description>,
)]
pub struct Description(domain::promotion::Description);
