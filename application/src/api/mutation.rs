//! GraphQL [`Mutation`]s definitions.

use common::{Date, DateTime, Money, Percent};
use juniper::graphql_object;
use service::{command, Command as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `User` with the provided username and contact info.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `USERNAME_OCCUPIED` - provided `Username` is occupied by another
    ///                         `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
            phone = %phone,
            username = %username,
        ),
    )]
    pub async fn create_user(
        username: api::user::Username,
        name: api::user::Name,
        email: api::user::Email,
        phone: api::user::Phone,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        ctx.service()
            .execute(command::CreateUser {
                username: username.into(),
                name: name.into(),
                email: email.into(),
                phone: phone.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new available `Homestay` with the provided details.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_NUM_BEDS` - `numBeds` is out of range;
    /// - `INVALID_CAPACITY` - `capacity` is out of range;
    /// - `HOMESTAY_NEGATIVE_PRICE` - `price` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            address = %address,
            capacity = %capacity,
            gql.name = "createHomestay",
            num_beds = %num_beds,
            otel.name = Self::SPAN_NAME,
            price = %price,
        ),
    )]
    pub async fn create_homestay(
        description: api::homestay::Description,
        address: api::homestay::Address,
        num_beds: i32,
        capacity: i32,
        price: Money,
        ctx: &Context,
    ) -> Result<api::Homestay, Error> {
        let num_beds = u16::try_from(num_beds)
            .map_err(|_| api::InputError::NumBeds.into())
            .map_err(ctx.error())?;
        let capacity = api::positive(capacity, api::InputError::Capacity)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateHomestay {
                description: description.into(),
                address: address.into(),
                num_beds,
                capacity: capacity.get(),
                price,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the `HomestayStatus` of the specified `Homestay`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `HOMESTAY_NOT_EXISTS` - the `Homestay` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateHomestayStatus",
            id = %id,
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn update_homestay_status(
        id: api::homestay::Id,
        status: api::homestay::Status,
        ctx: &Context,
    ) -> Result<api::Homestay, Error> {
        ctx.service()
            .execute(command::UpdateHomestayStatus {
                homestay_id: id.into(),
                status: status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Updates the nightly price of the specified `Homestay`.
    ///
    /// Existing `Booking`s keep the price they were made with.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `HOMESTAY_NOT_EXISTS` - the `Homestay` with the specified ID does
    ///                           not exist;
    /// - `HOMESTAY_NEGATIVE_PRICE` - `price` is negative.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "updateHomestayPrice",
            id = %id,
            otel.name = Self::SPAN_NAME,
            price = %price,
        ),
    )]
    pub async fn update_homestay_price(
        id: api::homestay::Id,
        price: Money,
        ctx: &Context,
    ) -> Result<api::Homestay, Error> {
        ctx.service()
            .execute(command::UpdateHomestayPrice {
                homestay_id: id.into(),
                price,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `Promotion` valid in the provided period.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `PROMOTION_CODE_OCCUPIED` - provided `PromotionCode` is occupied by
    ///                               another `Promotion`;
    /// - `PROMOTION_DISCOUNT_TOO_LARGE` - `discount` is not less than 100%;
    /// - `PROMOTION_ENDS_BEFORE_START` - `endsAt` precedes `startsAt`.
    #[tracing::instrument(
        skip_all,
        fields(
            code = %code,
            discount = %discount,
            ends_at = %ends_at,
            gql.name = "createPromotion",
            otel.name = Self::SPAN_NAME,
            starts_at = %starts_at,
        ),
    )]
    pub async fn create_promotion(
        code: api::promotion::Code,
        description: api::promotion::Description,
        discount: Percent,
        starts_at: DateTime,
        ends_at: DateTime,
        ctx: &Context,
    ) -> Result<api::Promotion, Error> {
        ctx.service()
            .execute(command::CreatePromotion {
                code: code.into(),
                description: description.into(),
                discount,
                starts_at: starts_at.coerce(),
                ends_at: ends_at.coerce(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Books the specified `Homestay` for the `User` with the specified
    /// `Username`, creating an unpaid `Payment` for the whole stay.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_NUM_NIGHTS` - `numNights` is out of range;
    /// - `INVALID_NUM_GUESTS` - `numGuests` is out of range;
    /// - `HOMESTAY_NOT_EXISTS` - the `Homestay` does not exist;
    /// - `HOMESTAY_UNAVAILABLE` - the `Homestay` is not available;
    /// - `USER_NOT_EXISTS` - the `User` does not exist;
    /// - `USER_ALREADY_BOOKING` - the `User` has an active `Booking`;
    /// - `PROMOTION_NOT_EXISTS` - the `Promotion` does not exist;
    /// - `PROMOTION_EXPIRED` - the `Promotion` is expired;
    /// - `STAY_OUT_OF_RANGE` - the stay ends beyond the supported calendar;
    /// - `DATE_RANGE_CONFLICT` - the `Homestay` is booked for some of the
    ///                           requested nights.
    #[tracing::instrument(
        skip_all,
        fields(
            checkin_date = %checkin_date,
            gql.name = "createBooking",
            homestay_id = %homestay_id,
            num_guests = %num_guests,
            num_nights = %num_nights,
            otel.name = Self::SPAN_NAME,
            promotion = ?promotion.as_ref().map(ToString::to_string),
            username = %username,
        ),
    )]
    pub async fn create_booking(
        username: api::user::Username,
        homestay_id: api::homestay::Id,
        checkin_date: Date,
        num_nights: i32,
        num_guests: i32,
        promotion: Option<api::promotion::Code>,
        ctx: &Context,
    ) -> Result<api::booking::CreateResult, Error> {
        let num_nights = api::positive(num_nights, api::InputError::NumNights)
            .map_err(ctx.error())?;
        let num_guests = api::positive(num_guests, api::InputError::NumGuests)
            .map_err(ctx.error())?;

        ctx.service()
            .execute(command::CreateBooking {
                username: username.into(),
                homestay_id: homestay_id.into(),
                promotion: promotion.map(Into::into),
                checkin_date: checkin_date.coerce(),
                num_nights,
                num_guests,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Cancels the specified `Booking`, releasing its nights and invalidating
    /// its `Payment`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `HOMESTAY_NOT_EXISTS` - the `Homestay` does not exist;
    /// - `HOMESTAY_UNAVAILABLE` - the `Homestay` is not available;
    /// - `USER_NOT_EXISTS` - the `User` does not exist;
    /// - `USER_NOT_BOOKING` - the `User` has no active `Booking`;
    /// - `BOOKING_NOT_EXISTS` - the `Booking` does not exist or is not made
    ///                          by the `User` for the `Homestay`;
    /// - `BOOKING_NOT_CANCELLABLE` - the `Booking` is resolved already;
    /// - `PAYMENT_NOT_EXISTS` - the `Booking` has no `Payment`;
    /// - `PAYMENT_NOT_CANCELLABLE` - the `Payment` is resolved already.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %booking_id,
            gql.name = "cancelBooking",
            homestay_id = %homestay_id,
            otel.name = Self::SPAN_NAME,
            username = %username,
        ),
    )]
    pub async fn cancel_booking(
        username: api::user::Username,
        homestay_id: api::homestay::Id,
        booking_id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::booking::ResolveResult, Error> {
        ctx.service()
            .execute(command::CancelBooking {
                username: username.into(),
                homestay_id: homestay_id.into(),
                booking_id: booking_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Checks out of the specified `Booking`, completing it and collecting
    /// its `Payment` with the provided `PaymentMethod`.
    ///
    /// # Errors
    ///
    /// Possible error codes are the same as of `cancelBooking`.
    #[tracing::instrument(
        skip_all,
        fields(
            booking_id = %booking_id,
            gql.name = "checkoutBooking",
            homestay_id = %homestay_id,
            method = ?method,
            otel.name = Self::SPAN_NAME,
            username = %username,
        ),
    )]
    pub async fn checkout_booking(
        username: api::user::Username,
        homestay_id: api::homestay::Id,
        booking_id: api::booking::Id,
        #[graphql(default)] method: api::payment::Method,
        ctx: &Context,
    ) -> Result<api::booking::ResolveResult, Error> {
        ctx.service()
            .execute(command::CheckoutBooking {
                username: username.into(),
                homestay_id: homestay_id.into(),
                booking_id: booking_id.into(),
                method: method.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::RollbackFailed { .. } => None,
            Self::UsernameOccupied(_) => {
                Some(api::UserError::UsernameOccupied.into())
            }
        }
    }
}

impl AsError for command::create_homestay::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NegativePrice(_) => {
                Some(api::HomestayError::NegativePrice.into())
            }
            Self::RollbackFailed { .. } => None,
            Self::ZeroCapacity => Some(api::HomestayError::ZeroCapacity.into()),
        }
    }
}

impl AsError for command::update_homestay_status::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::HomestayNotExists(_) => {
                Some(api::HomestayError::NotExists.into())
            }
            Self::RollbackFailed { .. } => None,
        }
    }
}

impl AsError for command::update_homestay_price::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::HomestayNotExists(_) => {
                Some(api::HomestayError::NotExists.into())
            }
            Self::NegativePrice(_) => {
                Some(api::HomestayError::NegativePrice.into())
            }
            Self::RollbackFailed { .. } => None,
        }
    }
}

impl AsError for command::create_promotion::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::PromotionError as E;

        match self {
            Self::CodeOccupied(_) => Some(E::CodeOccupied.into()),
            Self::Db(e) => e.try_as_error(),
            Self::DiscountTooLarge(_) => Some(E::DiscountTooLarge.into()),
            Self::EndsBeforeStart => Some(E::EndsBeforeStart.into()),
            Self::RollbackFailed { .. } => None,
        }
    }
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::{BookingError, HomestayError, PromotionError, UserError};

        match self {
            Self::DateRangeConflict(_) => {
                Some(BookingError::DateRangeConflict.into())
            }
            Self::Db(e) => e.try_as_error(),
            Self::HomestayNotExists(_) => Some(HomestayError::NotExists.into()),
            Self::HomestayUnavailable(_) => {
                Some(HomestayError::Unavailable.into())
            }
            Self::PriceOverflow(_) => Some(BookingError::PriceOverflow.into()),
            Self::PromotionExpired(_) => Some(PromotionError::Expired.into()),
            Self::PromotionNotFound(_) => {
                Some(PromotionError::NotExists.into())
            }
            Self::RollbackFailed { .. } => None,
            Self::StayOutOfRange => Some(BookingError::StayOutOfRange.into()),
            Self::UserAlreadyBooking(_) => {
                Some(UserError::AlreadyBooking.into())
            }
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

impl AsError for command::resolve_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        use api::{BookingError, HomestayError, PaymentError, UserError};

        match self {
            Self::BookingNotCancellable(_) => {
                Some(BookingError::NotCancellable.into())
            }
            Self::BookingNotExists(_) => Some(BookingError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
            Self::HomestayNotExists(_) => Some(HomestayError::NotExists.into()),
            Self::HomestayUnavailable(_) => {
                Some(HomestayError::Unavailable.into())
            }
            Self::PaymentNotCancellable(_) => {
                Some(PaymentError::NotCancellable.into())
            }
            Self::PaymentNotExists(_) => Some(PaymentError::NotExists.into()),
            Self::RollbackFailed { .. } => None,
            Self::UserNotBooking(_) => Some(UserError::NotBooking.into()),
            Self::UserNotExists(_) => Some(UserError::NotExists.into()),
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{
        command::{self, ErrorKind},
        domain::{booking, homestay, promotion, user},
    };

    use crate::AsError as _;

    #[test]
    fn maps_booking_conflict() {
        let err = command::create_booking::ExecutionError::DateRangeConflict(
            homestay::Id::new(),
        );

        assert_eq!(err.kind(), ErrorKind::Conflict);
        let err = err.as_error();
        assert_eq!(err.code, "DATE_RANGE_CONFLICT");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[test]
    fn maps_not_found_to_404() {
        let username = user::Username::new("alice").unwrap();
        let errs = [
            command::create_booking::ExecutionError::UserNotExists(
                username.clone(),
            )
            .as_error(),
            command::create_booking::ExecutionError::PromotionNotFound(
                promotion::Code::new("SUMMER").unwrap(),
            )
            .as_error(),
            command::resolve_booking::ExecutionError::BookingNotExists(
                booking::Id::new(),
            )
            .as_error(),
            command::resolve_booking::ExecutionError::UserNotExists(username)
                .as_error(),
        ];

        for err in errs {
            assert_eq!(err.status_code, http::StatusCode::NOT_FOUND, "{err}");
        }
    }

    #[test]
    fn maps_preconditions_to_422() {
        let errs = [
            command::resolve_booking::ExecutionError::BookingNotCancellable(
                booking::Id::new(),
            ),
            command::resolve_booking::ExecutionError::UserNotBooking(
                user::Username::new("bob").unwrap(),
            ),
            command::resolve_booking::ExecutionError::HomestayUnavailable(
                homestay::Id::new(),
            ),
        ];

        for err in errs {
            assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
            assert_eq!(
                err.as_error().status_code,
                http::StatusCode::UNPROCESSABLE_ENTITY,
            );
        }
    }

    #[test]
    fn maps_occupied_username() {
        let err = command::create_user::ExecutionError::UsernameOccupied(
            user::Username::new("carol").unwrap(),
        );

        assert_eq!(err.as_error().code, "USERNAME_OCCUPIED");
    }
}
