//! REST adapter for the remote voice-biometric service
//!
//! Maps each [`RemoteOperations`] call onto one HTTP request:
//!
//! | Operation     | Request                                             |
//! |---------------|-----------------------------------------------------|
//! | `create`      | `POST {base}/{collection}`                          |
//! | `fetch`       | `GET {base}/{collection}/{id}`                      |
//! | `update`      | `POST {base}/{collection}/{id}`                     |
//! | `delete`      | `DELETE {base}/{collection}/{id}`                   |
//! | `list`        | `GET {base}/{collection}?limit=..&offset=..`        |
//! | `renew_token` | `POST {base}/oauth/token` or `POST {base}/consumers/token` |
//!
//! Responses are handed back with their status and raw body; interpreting
//! them is up to the caller.

use std::fmt;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;
use vocalis_core::{RemoteOperations, RemoteResponse, RequestAuth, TokenRequest};
use vocalis_domain::constants::DEVELOPER_ID_HEADER;
use vocalis_domain::{ApiConfig, PageRequest, ResourceKind, Result, VocalisError};

use crate::errors::InfraError;
use crate::http::HttpClient;

const JSON: &str = "application/json";

/// [`RemoteOperations`] over HTTP
#[derive(Clone)]
pub struct RestRemote {
    http: HttpClient,
    base_url: Url,
    developer_id: String,
    client_id: String,
    client_secret: String,
}

impl fmt::Debug for RestRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestRemote")
            .field("base_url", &self.base_url.as_str())
            .field("developer_id", &self.developer_id)
            .field("client_id", &self.client_id)
            .field("max_attempts", &self.http.max_attempts())
            .finish_non_exhaustive()
    }
}

impl RestRemote {
    /// Build the adapter and its HTTP client from `config`
    ///
    /// # Errors
    ///
    /// Returns `VocalisError::Config` if the base URL does not parse.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .max_attempts(config.max_transport_attempts as usize)
            .user_agent(concat!("vocalis/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Self::with_http_client(config, http)
    }

    /// Use an already configured [`HttpClient`]
    pub fn with_http_client(config: &ApiConfig, http: HttpClient) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| VocalisError::Config(format!("invalid base url '{}': {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(VocalisError::Config(format!("base url '{}' cannot hold paths", config.base_url)));
        }

        Ok(Self {
            http,
            base_url,
            developer_id: config.developer_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        })
    }

    /// Root every endpoint is joined onto
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{segments...}`, each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| VocalisError::Config("base url cannot hold paths".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, method: Method, url: Url, auth: &RequestAuth) -> RequestBuilder {
        let developer_id = auth.developer_id.as_deref().unwrap_or(&self.developer_id);
        self.http
            .request(method, url)
            .header(CONTENT_TYPE, JSON)
            .header(AUTHORIZATION, format!("Bearer {}", auth.bearer))
            .header(DEVELOPER_ID_HEADER, developer_id)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<RemoteResponse> {
        let response = self.http.send(request).await?;
        into_remote_response(response).await
    }
}

async fn into_remote_response(response: Response) -> Result<RemoteResponse> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| VocalisError::from(InfraError::from(e)))?;
    debug!(status, body_len = body.len(), "remote responded");
    Ok(RemoteResponse::new(status, body))
}

#[async_trait]
impl RemoteOperations for RestRemote {
    #[instrument(skip(self, payload, auth), fields(kind = %kind))]
    async fn create(
        &self,
        kind: ResourceKind,
        payload: &Value,
        auth: &RequestAuth,
    ) -> Result<RemoteResponse> {
        let url = self.endpoint(&[kind.collection()])?;
        self.execute(self.authorized(Method::POST, url, auth).json(payload)).await
    }

    #[instrument(skip(self, auth), fields(kind = %kind))]
    async fn fetch(&self, kind: ResourceKind, id: &str, auth: &RequestAuth) -> Result<RemoteResponse> {
        let url = self.endpoint(&[kind.collection(), id])?;
        self.execute(self.authorized(Method::GET, url, auth)).await
    }

    #[instrument(skip(self, payload, auth), fields(kind = %kind))]
    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        payload: &Value,
        auth: &RequestAuth,
    ) -> Result<RemoteResponse> {
        let url = self.endpoint(&[kind.collection(), id])?;
        self.execute(self.authorized(Method::POST, url, auth).json(payload)).await
    }

    #[instrument(skip(self, auth), fields(kind = %kind))]
    async fn delete(&self, kind: ResourceKind, id: &str, auth: &RequestAuth) -> Result<RemoteResponse> {
        let url = self.endpoint(&[kind.collection(), id])?;
        self.execute(self.authorized(Method::DELETE, url, auth)).await
    }

    #[instrument(skip(self, auth), fields(kind = %kind, limit = page.limit, offset = page.offset))]
    async fn list(
        &self,
        kind: ResourceKind,
        page: PageRequest,
        auth: &RequestAuth,
    ) -> Result<RemoteResponse> {
        let url = self.endpoint(&[kind.collection()])?;
        let request = self
            .authorized(Method::GET, url, auth)
            .query(&[("limit", page.limit), ("offset", page.offset)]);
        self.execute(request).await
    }

    #[instrument(skip_all)]
    async fn renew_token(&self, request: &TokenRequest) -> Result<RemoteResponse> {
        let builder = match request {
            TokenRequest::ClientCredentials => {
                let url = self.endpoint(&["oauth", "token"])?;
                self.http
                    .request(Method::POST, url)
                    .query(&[("grant_type", "client_credentials")])
                    .form(&[
                        ("client_id", self.client_id.as_str()),
                        ("client_secret", self.client_secret.as_str()),
                    ])
            }
            TokenRequest::Consumer { credentials, admin } => {
                let url = self.endpoint(&[ResourceKind::Consumer.collection(), "token"])?;
                self.authorized(Method::POST, url, admin).json(credentials)
            }
        };
        self.execute(builder).await
    }
}
