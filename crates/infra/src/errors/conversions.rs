//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use vocalis_domain::VocalisError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InfraError(pub VocalisError);

impl From<InfraError> for VocalisError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<VocalisError> for InfraError {
    fn from(value: VocalisError) -> Self {
        InfraError(value)
    }
}

trait IntoVocalisError {
    fn into_vocalis(self) -> VocalisError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → VocalisError */
/* -------------------------------------------------------------------------- */

impl IntoVocalisError for HttpError {
    fn into_vocalis(self) -> VocalisError {
        // Every reqwest failure means no usable response was received.
        let url = self.url().map(|u| u.to_string()).unwrap_or_default();
        let reason = if self.is_timeout() {
            "request timed out"
        } else if self.is_connect() {
            "connection failed"
        } else if self.is_body() || self.is_decode() {
            "response body could not be read"
        } else if self.is_builder() {
            "request could not be built"
        } else {
            "http request failed"
        };

        if url.is_empty() {
            VocalisError::Transport(format!("{reason}: {self}"))
        } else {
            VocalisError::Transport(format!("{reason} ({url}): {self}"))
        }
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_vocalis())
    }
}

/* -------------------------------------------------------------------------- */
/* serde errors → VocalisError */
/* -------------------------------------------------------------------------- */

impl IntoVocalisError for serde_json::Error {
    fn into_vocalis(self) -> VocalisError {
        VocalisError::Config(format!("invalid JSON: {self}"))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(value.into_vocalis())
    }
}

impl IntoVocalisError for toml::de::Error {
    fn into_vocalis(self) -> VocalisError {
        VocalisError::Config(format!("invalid TOML: {self}"))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_vocalis())
    }
}
