//! Bearer credential issued by the remote service

use std::fmt;
use std::time::{Duration, Instant};

/// A bearer credential with the instant it was issued and its lifetime.
///
/// Tokens are immutable; renewal replaces the whole value.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    issued_at: Instant,
    ttl: Duration,
}

impl Token {
    /// Create a token issued at `issued_at` that stays valid for `ttl`
    pub fn new(value: impl Into<String>, issued_at: Instant, ttl: Duration) -> Self {
        Self { value: value.into(), issued_at, ttl }
    }

    /// Opaque credential value sent as `Authorization: Bearer <value>`
    pub fn value(&self) -> &str {
        &self.value
    }

    /// When the token was stored
    pub fn issued_at(&self) -> Instant {
        self.issued_at
    }

    /// Lifetime from `issued_at`
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// `now - issued_at < ttl`
    pub fn is_valid_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.issued_at) < self.ttl
    }

    /// Time left before the token expires, zero once stale
    pub fn remaining_at(&self, now: Instant) -> Duration {
        self.ttl.saturating_sub(now.saturating_duration_since(self.issued_at))
    }
}

// Never print the credential itself.
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &format_args!("<redacted {} chars>", self.value.len()))
            .field("issued_at", &self.issued_at)
            .field("ttl", &self.ttl)
            .finish()
    }
}
