use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::{debug, warn};
use vocalis_domain::constants::{DEFAULT_MAX_TRANSPORT_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECS};
use vocalis_domain::VocalisError;

use crate::errors::InfraError;

/// HTTP client with a request timeout and opt-in connect retry.
///
/// Only requests that never reached the server are sent again. Any response,
/// whatever its status, is returned to the caller as is.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    base_backoff: Duration,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, VocalisError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Total attempts per request, including connect retries
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Execute the provided request builder.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, VocalisError> {
        let attempts = self.max_attempts.max(1);

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| {
                VocalisError::Transport(
                    "request body cannot be cloned; buffer the body to enable retries".into(),
                )
            })?;

            let request = cloned_builder.build().map_err(|err| VocalisError::from(InfraError::from(err)))?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = attempt + 1, %method, path = url.path(), "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    debug!(
                        attempt = attempt + 1,
                        %method,
                        path = url.path(),
                        status = response.status().as_u16(),
                        "received HTTP response"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    if attempt + 1 < attempts && should_retry_error(&err) {
                        warn!(attempt = attempt + 1, %method, path = url.path(), error = %err, "connect failed, retrying");
                        self.sleep_with_backoff(attempt + 1).await;
                        continue;
                    }

                    debug!(attempt = attempt + 1, %method, path = url.path(), error = %err, "HTTP request failed");
                    return Err(InfraError::from(err).into());
                }
            }
        }

        Err(VocalisError::Transport("http client exhausted attempts without producing a result".into()))
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8) as u32;
        let multiplier = 1u32 << shift;
        self.base_backoff.saturating_mul(multiplier)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    base_backoff: Duration,
    user_agent: Option<String>,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_TRANSPORT_ATTEMPTS as usize,
            base_backoff: Duration::from_millis(200),
            user_agent: None,
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + connect retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Delay before the first connect retry; doubles after each
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.base_backoff = backoff;
        self
    }

    /// `User-Agent` sent on every request
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Headers sent on every request
    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Build the underlying reqwest client
    pub fn build(self) -> Result<HttpClient, VocalisError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| VocalisError::from(InfraError::from(err)))?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            base_backoff: self.base_backoff,
        })
    }
}

/// A connect failure is the only error where the server never saw the request.
fn should_retry_error(err: &reqwest::Error) -> bool {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if err.is_connect() {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::{Method, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_with_attempts(attempts: usize) -> HttpClient {
        HttpClient::builder()
            .base_backoff(Duration::from_millis(5))
            .max_attempts(attempts)
            .build()
            .expect("http client")
    }

    fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn returns_successful_response_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_attempts(3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn server_errors_are_returned_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_attempts(3);
        let response =
            client.send(client.request(Method::POST, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn client_errors_are_returned_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_attempts(3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn default_client_makes_a_single_attempt() {
        let client = HttpClient::new().expect("http client");
        assert_eq!(client.max_attempts(), 1);

        let result = client.send(client.request(Method::GET, refused_url())).await;
        match result {
            Err(VocalisError::Transport(msg)) => assert!(msg.contains("connection failed")),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn connect_failures_are_retried_when_enabled() {
        let client = client_with_attempts(3);
        let started = std::time::Instant::now();

        let result = client.send(client.request(Method::GET, refused_url())).await;

        assert!(matches!(result, Err(VocalisError::Transport(_))));
        // two backoffs: 5ms + 10ms
        assert!(started.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    fn backoff_doubles_per_retry() {
        let client = client_with_attempts(4);
        assert_eq!(client.backoff_delay(1), Duration::from_millis(5));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(10));
        assert_eq!(client.backoff_delay(3), Duration::from_millis(20));
    }
}
