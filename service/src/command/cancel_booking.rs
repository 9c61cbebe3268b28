//! [`Command`] for cancelling a [`Booking`].

use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Booking, Homestay, Payment, User};
use crate::{
    domain::{booking, homestay, user},
    Service,
};

use super::{
    resolve_booking::{ExecutionError, Output, Resolution},
    Command, ResolveBooking,
};

/// [`Command`] for cancelling a [`Booking`], which releases its nights and
/// invalidates its [`Payment`].
#[derive(Clone, Debug)]
pub struct CancelBooking {
    /// [`user::Username`] of the [`User`] who made the [`Booking`].
    pub username: user::Username,

    /// ID of the booked [`Homestay`].
    pub homestay_id: homestay::Id,

    /// ID of the [`Booking`] to cancel.
    pub booking_id: booking::Id,
}

impl<Db> Command<CancelBooking> for Service<Db>
where
    Self: Command<ResolveBooking, Ok = Output, Err = Traced<ExecutionError>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CancelBooking) -> Result<Self::Ok, Self::Err> {
        let CancelBooking {
            username,
            homestay_id,
            booking_id,
        } = cmd;

        self.execute(ResolveBooking {
            username,
            homestay_id,
            booking_id,
            resolution: Resolution::Cancel,
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
