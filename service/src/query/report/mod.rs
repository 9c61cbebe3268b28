//! Report [`Query`] collection.
//!
//! [`Query`]: crate::Query

pub mod income;

pub use self::income::Income;
