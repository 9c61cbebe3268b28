//! [`Booking`] read model definition.

use crate::domain::{
    booking::{CheckInDate, CheckOutDate},
    homestay,
};
#[cfg(doc)]
use crate::domain::{Booking, Homestay};

/// Wrapper around [`Booking`] indicating that it [`is_validated()`].
///
/// [`is_validated()`]: Booking::is_validated
#[derive(Clone, Copy, Debug)]
pub struct Validated<T>(pub T);

/// Nights of a [`Homestay`] to look up [`Validated`] [`Booking`]s
/// overlapping with.
#[derive(Clone, Copy, Debug)]
pub struct Stay {
    /// ID of the [`Homestay`].
    pub homestay_id: homestay::Id,

    /// First night of the stay.
    pub checkin_date: CheckInDate,

    /// Day the stay ends at, exclusive.
    pub checkout_date: CheckOutDate,
}
