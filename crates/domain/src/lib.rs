//! # Vocalis Domain
//!
//! Pure data types for the Vocalis voice-biometrics client.
//!
//! This crate contains:
//! - The error taxonomy and `Result` alias
//! - Tokens, job statuses and polling budgets
//! - Typed request/response bodies for each remote collection
//! - Client configuration and payload validation
//!
//! ## Architecture
//! - No dependencies on other Vocalis crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod validation;

pub use config::*;
pub use errors::*;
pub use types::*;
pub use validation::Validate;
