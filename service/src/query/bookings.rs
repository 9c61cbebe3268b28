//! [`Query`] collection related to multiple [`Booking`]s.

use common::operations::By;

use crate::domain::{user, Booking};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries all the [`Booking`]s made by a [`User`], the latest first.
pub type ByUser = DatabaseQuery<By<Vec<Booking>, user::Username>>;
