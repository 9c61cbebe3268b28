//! Report definitions.

pub mod income;

pub use self::income::Income;
