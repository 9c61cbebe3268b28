//! [`Booking`] pricing.
//!
//! [`Booking`]: crate::domain::Booking

use common::{Money, Percent};
use rust_decimal::Decimal;

use crate::domain::{
    booking::{NumGuests, NumNights, TaxRate},
    homestay::{self, Homestay},
};

/// Service fee charged per guest per night.
pub const SERVICE_FEE_PER_GUEST_NIGHT: Decimal =
    Decimal::from_parts(15, 0, 0, false, 0);

/// Surcharge charged per guest above a [`Homestay`] capacity.
pub const SURCHARGE_PER_EXTRA_GUEST: Decimal =
    Decimal::from_parts(10, 0, 0, false, 0);

/// Parameters of a stay to be priced.
#[derive(Clone, Copy, Debug)]
pub struct Quote {
    /// Price of a single night.
    pub price: Money,

    /// Number of guests accommodated without a surcharge.
    pub capacity: homestay::Capacity,

    /// Number of guests staying.
    pub num_guests: NumGuests,

    /// Number of nights of the stay.
    pub num_nights: NumNights,

    /// [`TaxRate`] to apply.
    pub tax_rate: TaxRate,

    /// Discount to apply after taxes.
    pub discount: Percent,
}

impl Quote {
    /// Creates a new [`Quote`] for staying in the provided [`Homestay`].
    #[must_use]
    pub fn new(
        homestay: &Homestay,
        num_guests: NumGuests,
        num_nights: NumNights,
        tax_rate: TaxRate,
        discount: Percent,
    ) -> Self {
        Self {
            price: homestay.price,
            capacity: homestay.capacity,
            num_guests,
            num_nights,
            tax_rate,
            discount,
        }
    }

    /// Returns the service fee of this [`Quote`].
    ///
    /// [`None`] if the fee overflows.
    #[must_use]
    pub fn service_fee(&self) -> Option<Money> {
        let amount = SERVICE_FEE_PER_GUEST_NIGHT
            .checked_mul(Decimal::from(self.num_guests.get()))?
            .checked_mul(Decimal::from(self.num_nights.get()))?;
        Some(Money::new(amount, self.price.currency))
    }

    /// Calculates the full price [`Breakdown`] of this [`Quote`].
    ///
    /// Taxes are always applied before the discount. [`None`] if any of the
    /// amounts overflows.
    #[must_use]
    pub fn breakdown(&self) -> Option<Breakdown> {
        let money = |amount| Money::new(amount, self.price.currency);

        let homestay_fee = self
            .price
            .checked_mul(Decimal::from(self.num_nights.get()))?
            .amount;
        let service_fee = self.service_fee()?.amount;
        let extra_guests =
            self.num_guests.get().saturating_sub(self.capacity);
        let capacity_surcharge = SURCHARGE_PER_EXTRA_GUEST
            .checked_mul(Decimal::from(extra_guests))?;

        let pre_tax = homestay_fee
            .checked_add(service_fee)?
            .checked_add(capacity_surcharge)?;
        let tax = self.tax_rate.value().checked_mul(pre_tax)?;
        let after_tax = pre_tax.checked_add(tax)?;
        let discount = self.discount.rate().checked_mul(after_tax)?;

        Some(Breakdown {
            homestay_fee: money(homestay_fee),
            service_fee: money(service_fee),
            capacity_surcharge: money(capacity_surcharge),
            pre_tax: money(pre_tax),
            tax: money(tax),
            after_tax: money(after_tax),
            discount: money(discount),
            total: money(after_tax.checked_sub(discount)?),
        })
    }
}

/// Itemized price of a [`Quote`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Breakdown {
    /// Price of all the nights.
    pub homestay_fee: Money,

    /// Service fee for all the guests and nights.
    pub service_fee: Money,

    /// Surcharge for the guests above the capacity.
    pub capacity_surcharge: Money,

    /// Sum before taxes.
    pub pre_tax: Money,

    /// Taxes.
    pub tax: Money,

    /// Sum after taxes.
    pub after_tax: Money,

    /// Discount subtracted from the sum after taxes.
    pub discount: Money,

    /// Final amount to pay.
    pub total: Money,
}

#[cfg(test)]
mod spec {
    use std::{num::NonZeroU16, str::FromStr as _};

    use common::{money::Currency, Money, Percent};
    use rust_decimal::Decimal;

    use crate::domain::booking::TaxRate;

    use super::Quote;

    fn usd(s: &str) -> Money {
        Money {
            amount: Decimal::from_str(s).unwrap(),
            currency: Currency::Usd,
        }
    }

    fn quote(guests: u16, nights: u16, capacity: u16, discount: &str) -> Quote {
        Quote {
            price: usd("100"),
            capacity,
            num_guests: NonZeroU16::new(guests).unwrap(),
            num_nights: NonZeroU16::new(nights).unwrap(),
            tax_rate: TaxRate::default(),
            discount: Percent::from_str(discount).unwrap(),
        }
    }

    #[test]
    fn prices_without_surcharge_and_discount() {
        let b = quote(2, 3, 2, "0").breakdown().unwrap();

        assert_eq!(b.homestay_fee, usd("300"));
        assert_eq!(b.service_fee, usd("90"));
        assert_eq!(b.capacity_surcharge, usd("0"));
        assert_eq!(b.pre_tax, usd("390"));
        assert_eq!(b.tax, usd("39"));
        assert_eq!(b.after_tax, usd("429"));
        assert_eq!(b.discount, usd("0"));
        assert_eq!(b.total, usd("429"));
    }

    #[test]
    fn surcharges_guests_above_capacity() {
        let b = quote(4, 3, 2, "0").breakdown().unwrap();

        assert_eq!(b.service_fee, usd("180"));
        assert_eq!(b.capacity_surcharge, usd("20"));
        assert_eq!(b.pre_tax, usd("500"));
        assert_eq!(b.total, usd("550"));
    }

    #[test]
    fn discounts_after_tax() {
        let b = quote(2, 3, 2, "10").breakdown().unwrap();

        assert_eq!(b.after_tax, usd("429"));
        assert_eq!(b.discount, usd("42.9"));
        assert_eq!(b.total, usd("386.1"));
    }

    #[test]
    fn is_deterministic() {
        let q = quote(3, 7, 2, "12.5");

        assert_eq!(q.breakdown(), q.breakdown());
        assert_eq!(q.service_fee(), q.breakdown().map(|b| b.service_fee));
    }

    #[test]
    fn keeps_homestay_currency() {
        let mut q = quote(1, 1, 1, "0");
        q.price.currency = Currency::Vnd;

        assert_eq!(q.breakdown().unwrap().total.currency, Currency::Vnd);
    }

    #[test]
    fn overflows_into_none() {
        let mut q = quote(2, 3, 2, "0");
        q.price.amount = Decimal::MAX;

        assert_eq!(q.breakdown(), None);
        assert!(q.service_fee().is_some());
    }
}
