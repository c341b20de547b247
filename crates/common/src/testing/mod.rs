//! Test doubles for the runtime utilities
//!
//! Available to other crates through the `test-utils` feature.

mod clock;

pub use clock::MockClock;
