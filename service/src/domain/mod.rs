//! Domain definitions.

pub mod booking;
pub mod homestay;
pub mod payment;
pub mod pricing;
pub mod promotion;
pub mod user;

pub use self::{
    booking::Booking, homestay::Homestay, payment::Payment,
    promotion::Promotion, user::User,
};
