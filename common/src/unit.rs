//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing a beginning of some period.
#[derive(Clone, Copy, Debug)]
pub struct Beginning;

/// Marker type describing an expiration of some period.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing an arrival of a guest.
#[derive(Clone, Copy, Debug)]
pub struct Arrival;

/// Marker type describing a departure of a guest.
#[derive(Clone, Copy, Debug)]
pub struct Departure;

/// Marker type describing a settlement of a debt.
#[derive(Clone, Copy, Debug)]
pub struct Settlement;
