//! HTTP adapters for the remote service

pub mod client;

pub use client::RestRemote;
