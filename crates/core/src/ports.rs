//! Port interface to the remote service
//!
//! The core never speaks HTTP. Every call goes through [`RemoteOperations`],
//! which reports the raw status and body; the core decides what the status
//! means for the operation at hand.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use vocalis_domain::{ConsumerCredentials, PageRequest, ResourceKind, Result, VocalisError};

/// Status and raw body of a call that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: String,
}

impl RemoteResponse {
    /// Response with a raw body
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// Build a response from a JSON document
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// Fail with `Remote { status, body }` unless the status is `expected`
    pub fn expect_status(self, expected: u16) -> Result<Self> {
        if self.status == expected {
            Ok(self)
        } else {
            Err(VocalisError::Remote { status: self.status, body: self.body })
        }
    }

    /// Decode the body into a typed structure.
    ///
    /// A body that is not JSON at all is a transport fault. A JSON document
    /// of the wrong shape (missing or mistyped fields) is reported as a
    /// remote error carrying the status and the raw body.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            if err.is_data() {
                VocalisError::Remote { status: self.status, body: self.body.clone() }
            } else {
                VocalisError::Transport(format!(
                    "unparseable response body (status {}): {}",
                    self.status, err
                ))
            }
        })
    }
}

/// Credentials attached to an authenticated call
#[derive(Clone, PartialEq, Eq)]
pub struct RequestAuth {
    pub bearer: String,
    /// Replaces the configured `Developer-Id` header when set
    pub developer_id: Option<String>,
}

impl RequestAuth {
    /// Bearer credentials without a `Developer-Id` override
    pub fn bearer(token: impl Into<String>) -> Self {
        Self { bearer: token.into(), developer_id: None }
    }
}

impl fmt::Debug for RequestAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAuth")
            .field("bearer", &"<redacted>")
            .field("developer_id", &self.developer_id)
            .finish()
    }
}

/// A token renewal call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenRequest {
    /// Admin token from the configured client id and secret
    ClientCredentials,
    /// Per-consumer token, requested with admin credentials
    Consumer { credentials: ConsumerCredentials, admin: RequestAuth },
}

/// Primitive calls against the remote service.
///
/// Implementations return `Ok` for every response that reached the server,
/// whatever its status. `Err` is reserved for calls that produced no response
/// and is always [`VocalisError::Transport`].
#[async_trait]
pub trait RemoteOperations: Send + Sync {
    /// `POST /{collection}`
    async fn create(
        &self,
        kind: ResourceKind,
        payload: &Value,
        auth: &RequestAuth,
    ) -> Result<RemoteResponse>;

    /// `GET /{collection}/{id}`
    async fn fetch(&self, kind: ResourceKind, id: &str, auth: &RequestAuth)
        -> Result<RemoteResponse>;

    /// `POST /{collection}/{id}`
    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        payload: &Value,
        auth: &RequestAuth,
    ) -> Result<RemoteResponse>;

    /// `DELETE /{collection}/{id}`
    async fn delete(
        &self,
        kind: ResourceKind,
        id: &str,
        auth: &RequestAuth,
    ) -> Result<RemoteResponse>;

    /// `GET /{collection}?limit=..&offset=..`
    async fn list(
        &self,
        kind: ResourceKind,
        page: PageRequest,
        auth: &RequestAuth,
    ) -> Result<RemoteResponse>;

    /// Issue a new bearer token
    async fn renew_token(&self, request: &TokenRequest) -> Result<RemoteResponse>;
}
