//! GraphQL API definitions.

pub mod booking;
pub mod homestay;
mod mutation;
pub mod payment;
pub mod promotion;
mod query;
pub mod report;
pub mod scalar;
pub mod user;

use juniper::EmptySubscription;

use crate::{define_error, Context};

pub use self::{
    booking::Booking, homestay::Homestay, mutation::Mutation,
    payment::Payment, promotion::Promotion, query::Query, user::User,
};

/// GraphQL schema.
pub type Schema =
    juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

/// Creates a new [`Schema`].
#[must_use]
pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}

define_error! {
    enum HomestayError {
        #[code = "HOMESTAY_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Homestay` with the specified ID does not exist"]
        NotExists,

        #[code = "HOMESTAY_UNAVAILABLE"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`Homestay` is not available for booking"]
        Unavailable,

        #[code = "HOMESTAY_ZERO_CAPACITY"]
        #[status = BAD_REQUEST]
        #[message = "`Homestay` capacity must be positive"]
        ZeroCapacity,

        #[code = "HOMESTAY_NEGATIVE_PRICE"]
        #[status = BAD_REQUEST]
        #[message = "`Homestay` price must not be negative"]
        NegativePrice,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified username does not exist"]
        NotExists,

        #[code = "USERNAME_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`Username` is occupied by another `User`"]
        UsernameOccupied,

        #[code = "USER_ALREADY_BOOKING"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`User` has an active `Booking` already"]
        AlreadyBooking,

        #[code = "USER_NOT_BOOKING"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`User` has no active `Booking`"]
        NotBooking,
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the specified ID does not exist"]
        NotExists,

        #[code = "BOOKING_NOT_CANCELLABLE"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`Booking` is cancelled or completed already"]
        NotCancellable,

        #[code = "PRICE_OVERFLOW"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "Price of the stay exceeds the representable amount"]
        PriceOverflow,

        #[code = "DATE_RANGE_CONFLICT"]
        #[status = CONFLICT]
        #[message = "`Homestay` is already booked for the requested dates"]
        DateRangeConflict,

        #[code = "STAY_OUT_OF_RANGE"]
        #[status = BAD_REQUEST]
        #[message = "Stay ends beyond the supported calendar"]
        StayOutOfRange,
    }
}

define_error! {
    enum PaymentError {
        #[code = "PAYMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Payment` of the specified `Booking` does not exist"]
        NotExists,

        #[code = "PAYMENT_NOT_CANCELLABLE"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`Payment` is collected or invalidated already"]
        NotCancellable,
    }
}

define_error! {
    enum PromotionError {
        #[code = "PROMOTION_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Promotion` with the specified code does not exist"]
        NotExists,

        #[code = "PROMOTION_EXPIRED"]
        #[status = UNPROCESSABLE_ENTITY]
        #[message = "`Promotion` is expired"]
        Expired,

        #[code = "PROMOTION_CODE_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "`PromotionCode` is occupied by another `Promotion`"]
        CodeOccupied,

        #[code = "PROMOTION_DISCOUNT_TOO_LARGE"]
        #[status = BAD_REQUEST]
        #[message = "`Promotion` discount must be less than 100%"]
        DiscountTooLarge,

        #[code = "PROMOTION_ENDS_BEFORE_START"]
        #[status = BAD_REQUEST]
        #[message = "`Promotion` must not end before it starts"]
        EndsBeforeStart,
    }
}

define_error! {
    enum InputError {
        #[code = "INVALID_NUM_BEDS"]
        #[status = BAD_REQUEST]
        #[message = "Number of beds must be in `0..=65535` range"]
        NumBeds,

        #[code = "INVALID_CAPACITY"]
        #[status = BAD_REQUEST]
        #[message = "Capacity must be in `1..=65535` range"]
        Capacity,

        #[code = "INVALID_NUM_NIGHTS"]
        #[status = BAD_REQUEST]
        #[message = "Number of nights must be in `1..=65535` range"]
        NumNights,

        #[code = "INVALID_NUM_GUESTS"]
        #[status = BAD_REQUEST]
        #[message = "Number of guests must be in `1..=65535` range"]
        NumGuests,

        #[code = "INVALID_PERIOD"]
        #[status = BAD_REQUEST]
        #[message = "Report period does not exist in the calendar"]
        Period,
    }
}

/// Converts the provided GraphQL integer into a positive [`u16`].
///
/// # Errors
///
/// With the provided `err` if the integer doesn't fit.
fn positive(
    num: i32,
    err: InputError,
) -> Result<std::num::NonZeroU16, crate::Error> {
    u16::try_from(num)
        .ok()
        .and_then(std::num::NonZeroU16::new)
        .ok_or_else(|| err.into())
}

#[cfg(test)]
mod spec {
    use super::{positive, InputError};

    #[test]
    fn schema_is_valid() {
        let sdl = super::schema().as_sdl();

        for ty in [
            "type Booking",
            "type Homestay",
            "type Payment",
            "type Promotion",
            "type User",
            "type IncomeReport",
            "enum BookingStatus",
            "scalar BookingId",
        ] {
            assert!(sdl.contains(ty), "missing `{ty}` in schema");
        }
    }

    #[test]
    fn accepts_positive_numbers_only() {
        assert_eq!(positive(3, InputError::NumNights).unwrap().get(), 3);

        for num in [0, -1, 65_536] {
            let err = positive(num, InputError::NumGuests).unwrap_err();
            assert_eq!(err.code, "INVALID_NUM_GUESTS");
        }
    }
}
