//! Macro for implementing string conversions on remote job status enums
//!
//! The service reports job status as free-form strings. Each status enum
//! carries an `Other(String)` variant so unrecognised values survive decoding
//! and can still be reported in a timeout.
//!
//! # Example
//!
//! ```rust
//! use vocalis_domain::impl_job_status_conversions;
//!
//! #[derive(Debug, Clone, PartialEq, Eq)]
//! pub enum TaskStatus {
//!     Started,
//!     Completed,
//!     Other(String),
//! }
//!
//! impl_job_status_conversions!(TaskStatus {
//!     Started => "started",
//!     Completed => "completed" | "complete",
//! });
//!
//! assert_eq!(TaskStatus::from("COMPLETE"), TaskStatus::Completed);
//! assert_eq!(TaskStatus::from("queued"), TaskStatus::Other("queued".to_string()));
//! assert_eq!(TaskStatus::Started.to_string(), "started");
//! ```

/// Implements `Display`, `From<&str>`, `From<String>` and `Into<String>` for a
/// status enum with a trailing `Other(String)` variant.
///
/// - The first string of each arm is the canonical form used by `Display`.
/// - Extra `| "alias"` strings are accepted when parsing.
/// - Parsing is case-insensitive and ignores surrounding whitespace.
#[macro_export]
macro_rules! impl_job_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                    Self::Other(raw) => f.write_str(raw),
                }
            }
        }

        impl From<&str> for $enum_name {
            fn from(value: &str) -> Self {
                let trimmed = value.trim();
                match trimmed.to_ascii_lowercase().as_str() {
                    $($str $(| $alias)* => Self::$variant,)+
                    _ => Self::Other(trimmed.to_string()),
                }
            }
        }

        impl From<String> for $enum_name {
            fn from(value: String) -> Self {
                Self::from(value.as_str())
            }
        }

        impl From<$enum_name> for String {
            fn from(value: $enum_name) -> Self {
                value.to_string()
            }
        }
    };
}
