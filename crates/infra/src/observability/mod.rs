//! Tracing subscriber setup
//!
//! Libraries in this workspace only emit `tracing` events. Binaries and
//! test harnesses call [`init_tracing`] once to print them.
//!
//! ## Environment Variables
//! - `VOCALIS_LOG`: filter directives, e.g. `vocalis_core=debug,info`
//! - `VOCALIS_LOG_FORMAT`: `json` for one JSON object per line, anything
//!   else for the human-readable format

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use vocalis_domain::{Result, VocalisError};

/// Filter directives environment variable
pub const LOG_FILTER_ENV: &str = "VOCALIS_LOG";
/// Output format environment variable
pub const LOG_FORMAT_ENV: &str = "VOCALIS_LOG_FORMAT";

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Format selected by `VOCALIS_LOG_FORMAT`
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) if value.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install the global subscriber, format taken from the environment.
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init_tracing(default_directive: &str) -> Result<bool> {
    init_tracing_with(default_directive, LogFormat::from_env())
}

/// Install the global subscriber with an explicit output format.
///
/// # Errors
/// Returns `VocalisError::Config` if `default_directive` is not a valid
/// filter and `VOCALIS_LOG` is unset.
pub fn init_tracing_with(default_directive: &str, format: LogFormat) -> Result<bool> {
    let filter = build_filter(default_directive)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().with_target(true)).try_init(),
    };

    Ok(installed.is_ok())
}

fn build_filter(default_directive: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_FILTER_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(default_directive).map_err(|e| {
            VocalisError::Config(format!("invalid log directive '{default_directive}': {e}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn format_defaults_to_pretty() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        std::env::remove_var(LOG_FORMAT_ENV);
        assert_eq!(LogFormat::from_env(), LogFormat::Pretty);

        std::env::set_var(LOG_FORMAT_ENV, "JSON");
        assert_eq!(LogFormat::from_env(), LogFormat::Json);
        std::env::remove_var(LOG_FORMAT_ENV);
    }

    #[test]
    fn invalid_default_directive_is_config_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        std::env::remove_var(LOG_FILTER_ENV);

        let err = build_filter("vocalis_core=loud").unwrap_err();
        assert!(matches!(err, VocalisError::Config(_)));
    }

    #[test]
    fn second_init_is_a_no_op() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        std::env::remove_var(LOG_FILTER_ENV);

        init_tracing_with("warn", LogFormat::Pretty).unwrap();
        let second = init_tracing_with("warn", LogFormat::Json).unwrap();
        assert!(!second);
    }
}
