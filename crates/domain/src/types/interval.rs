//! Spoken-phrase intervals inside an audio recording

use serde::{Deserialize, Serialize};

/// An unlabeled span of speech detected by endpoint analysis, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: u64,
    pub stop: u64,
}

impl TimeSpan {
    /// Span from `start` to `stop` in milliseconds
    pub fn new(start: u64, stop: u64) -> Self {
        Self { start, stop }
    }

    /// Attach the phrase the speaker is expected to have said
    pub fn labeled(self, phrase: impl Into<String>) -> Interval {
        Interval { phrase: phrase.into(), start: self.start, stop: self.stop }
    }
}

/// A labeled span submitted back to an enrollment or verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub phrase: String,
    pub start: u64,
    pub stop: u64,
}

impl Interval {
    /// Labeled span from `start` to `stop` in milliseconds
    pub fn new(phrase: impl Into<String>, start: u64, stop: u64) -> Self {
        Self { phrase: phrase.into(), start, stop }
    }

    /// The span without its label
    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start, self.stop)
    }

    /// Length in milliseconds; zero if inverted
    pub fn duration_ms(&self) -> u64 {
        self.stop.saturating_sub(self.start)
    }
}
