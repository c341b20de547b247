//! Client-wide defaults

/// Token lifetime assumed when the config does not set one
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 3500;

/// Wall-clock ceiling for convergence polling
pub const DEFAULT_POLL_MAX_DURATION_MS: u64 = 15_000;
/// Pause between status fetches
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Per-request HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// One attempt: nothing is re-sent unless configured
pub const DEFAULT_MAX_TRANSPORT_ATTEMPTS: u32 = 1;

/// Page size when none is given
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

// Header names
/// Header carrying the developer id on every call
pub const DEVELOPER_ID_HEADER: &str = "Developer-Id";

// Audio reference keys in submission payloads
/// Audio key of an enrollment submission
pub const ENROLLMENT_AUDIO_FIELD: &str = "enrollment.wav";
/// Audio key of a verification submission
pub const VERIFICATION_AUDIO_FIELD: &str = "verification.wav";
