//! [`Query`] collection related to a single [`Homestay`].

use common::operations::By;

use crate::domain::{homestay, Homestay};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Homestay`] by its [`homestay::Id`].
pub type ById = DatabaseQuery<By<Option<Homestay>, homestay::Id>>;
