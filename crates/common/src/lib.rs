//! Runtime utilities shared across Vocalis crates.
//!
//! - [`time`]: the [`Clock`](time::Clock) abstraction used for token expiry
//! - [`testing`]: a manually advanced clock (feature `test-utils`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod time;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use time::{Clock, SharedClock, SystemClock};
