//! [`Command`] for checking out a [`Booking`].

use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Booking, Homestay, Payment, User};
use crate::{
    domain::{booking, homestay, payment, user},
    Service,
};

use super::{
    resolve_booking::{ExecutionError, Output, Resolution},
    Command, ResolveBooking,
};

/// [`Command`] for checking the guests of a [`Booking`] out, which
/// completes it and collects its [`Payment`].
#[derive(Clone, Debug)]
pub struct CheckoutBooking {
    /// [`user::Username`] of the [`User`] who made the [`Booking`].
    pub username: user::Username,

    /// ID of the booked [`Homestay`].
    pub homestay_id: homestay::Id,

    /// ID of the [`Booking`] to check out.
    pub booking_id: booking::Id,

    /// [`payment::Method`] the [`Payment`] is collected with.
    pub method: payment::Method,
}

impl<Db> Command<CheckoutBooking> for Service<Db>
where
    Self: Command<ResolveBooking, Ok = Output, Err = Traced<ExecutionError>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CheckoutBooking,
    ) -> Result<Self::Ok, Self::Err> {
        let CheckoutBooking {
            username,
            homestay_id,
            booking_id,
            method,
        } = cmd;

        self.execute(ResolveBooking {
            username,
            homestay_id,
            booking_id,
            resolution: Resolution::Checkout(method),
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{fixture, CancelBooking, Command as _, ErrorKind},
        domain::{booking, payment},
    };

    use super::{CheckoutBooking, ExecutionError};

    #[tokio::test]
    async fn checkout_after_cancel_fails() {
        let svc = fixture::service();
        let alice = fixture::user(&svc, "alice").await;
        let h = fixture::homestay(&svc).await;
        let b = svc
            .execute(fixture::booking(&alice, h.id, "2030-06-10", 2, 1))
            .await
            .unwrap()
            .booking;

        let cancelled = svc
            .execute(CancelBooking {
                username: alice.username.clone(),
                homestay_id: h.id,
                booking_id: b.id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(cancelled.booking.status, booking::Status::Cancelled);

        let err = svc
            .execute(CheckoutBooking {
                username: alice.username.clone(),
                homestay_id: h.id,
                booking_id: b.id.clone(),
                method: payment::Method::Cash,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::BookingNotCancellable(id) if *id == b.id,
        ));
        assert_eq!(err.as_ref().kind(), ErrorKind::PreconditionFailed);

        let state = svc.database().snapshot().await;
        assert_eq!(
            state.payment_of(&b.id).map(|p| p.status),
            Some(payment::Status::Invalidated),
        );
    }
}
