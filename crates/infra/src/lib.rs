//! # Vocalis Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The reqwest-based [`HttpClient`] with opt-in connect retry
//! - [`RestRemote`], the HTTP implementation of `RemoteOperations`
//! - Configuration loading from environment variables and files
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `vocalis-core`
//! - Contains all "impure" code (network, files, environment)

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::RestRemote;
pub use client::VocalisClient;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::{init_tracing, LogFormat};
