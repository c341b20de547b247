//! Bounded-timeout convergence on remote job status

pub mod poller;

pub use poller::{JobPoller, PollOutcome, StatusReport};
