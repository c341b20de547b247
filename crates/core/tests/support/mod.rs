//! Shared test helpers for `vocalis-core` integration tests.
//!
//! `ScriptedRemote` replays canned responses per operation and resource
//! kind, records every call, and issues numbered tokens.

#![allow(dead_code)]

pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use vocalis_common::testing::MockClock;
use vocalis_core::TokenCache;

pub use remote::{Call, Op, ScriptedRemote};

/// Admin token cache over `remote`, driven by `clock`
pub fn admin_cache(remote: &Arc<ScriptedRemote>, clock: &MockClock) -> Arc<TokenCache> {
    Arc::new(
        TokenCache::admin(remote.clone(), Duration::from_secs(3500))
            .with_clock(Arc::new(clock.clone())),
    )
}

pub fn vocabulary() -> Vec<String> {
    ["boston", "chicago", "pyramid"].iter().map(|w| w.to_string()).collect()
}
