//! Monotonic time source
//!
//! Components that compare instants (token expiry) read the time through
//! [`Clock`] so tests can substitute a clock they advance by hand.

mod clock;

pub use clock::{Clock, SharedClock, SystemClock};
