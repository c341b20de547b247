//! Bearer token cache with single-flight renewal
//!
//! One [`TokenCache`] exists per credential scope (the admin client, or one
//! consumer) and is shared by every component that authenticates in that
//! scope. The cached token is replaced, never mutated, on renewal.
//!
//! Concurrency:
//! - Fast path: a read lock on the cached token.
//! - Slow path: callers serialize on a renewal gate. The first one through
//!   renews; the rest see the renewal generation has moved and take that
//!   renewal's outcome, token or error, without calling the remote again.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info, instrument, warn};
use vocalis_common::{SharedClock, SystemClock};
use vocalis_domain::{ConsumerCredentials, Result, Token, VocalisError};

use crate::ports::{RemoteOperations, RequestAuth, TokenRequest};

/// Whose credentials a cache renews
#[derive(Clone)]
pub enum CredentialScope {
    /// Client-credentials grant with the configured client id and secret
    Admin,
    /// Per-consumer token, obtained with a token from the admin cache
    Consumer { credentials: ConsumerCredentials, admin: Arc<TokenCache> },
}

impl CredentialScope {
    fn name(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Consumer { .. } => "consumer",
        }
    }
}

type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<RequestAuth>> + Send + 'a>>;

#[derive(Deserialize)]
struct AccessTokenBody {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct ConsumerTokenBody {
    token: Option<String>,
}

/// Cached bearer token for one credential scope
pub struct TokenCache {
    remote: Arc<dyn RemoteOperations>,
    scope: CredentialScope,
    ttl: Duration,
    clock: SharedClock,
    developer_id: Option<String>,
    current: RwLock<Option<Token>>,
    /// Bumped once per completed renewal attempt, while the gate is held
    generation: AtomicU64,
    /// Failure of the latest renewal attempt, if it failed
    renewal_gate: Mutex<Option<VocalisError>>,
}

impl TokenCache {
    /// Cache for the admin scope
    pub fn admin(remote: Arc<dyn RemoteOperations>, ttl: Duration) -> Self {
        Self::new(remote, CredentialScope::Admin, ttl)
    }

    /// Cache for one consumer; renewals authenticate through `admin`
    pub fn consumer(
        remote: Arc<dyn RemoteOperations>,
        admin: Arc<TokenCache>,
        credentials: ConsumerCredentials,
        ttl: Duration,
    ) -> Self {
        Self::new(remote, CredentialScope::Consumer { credentials, admin }, ttl)
    }

    /// Cache for `scope`; tokens are considered fresh for `ttl` after issue
    pub fn new(remote: Arc<dyn RemoteOperations>, scope: CredentialScope, ttl: Duration) -> Self {
        Self {
            remote,
            scope,
            ttl,
            clock: SystemClock::shared(),
            developer_id: None,
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            renewal_gate: Mutex::new(None),
        }
    }

    /// Replace the time source
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Send this `Developer-Id` instead of the configured one
    #[must_use]
    pub fn with_developer_id(mut self, developer_id: impl Into<String>) -> Self {
        self.developer_id = Some(developer_id.into());
        self
    }

    /// Whose credentials this cache renews
    pub fn scope(&self) -> &CredentialScope {
        &self.scope
    }

    /// Lifetime of a renewed token
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// `now - issued_at < ttl`
    pub fn is_valid(&self, token: &Token) -> bool {
        token.is_valid_at(self.clock.now())
    }

    /// The cached token, renewing first if it is missing or stale.
    ///
    /// Overlapping calls that all find the cache stale trigger exactly one
    /// renewal and all receive its outcome. A failure is shared only with the
    /// callers that were waiting on it; the next call after it renews again.
    ///
    /// # Errors
    /// Propagates the renewal failure (`Auth` or `Transport`); nothing is
    /// retried here.
    pub async fn get_token(&self) -> Result<Token> {
        let seen = self.generation.load(Ordering::Acquire);
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let mut gate = self.renewal_gate.lock().await;

        if self.generation.load(Ordering::Acquire) != seen {
            if let Some(err) = gate.as_ref() {
                debug!(scope = self.scope.name(), "sharing failed renewal of concurrent caller");
                return Err(err.clone());
            }
        }
        if let Some(token) = self.cached().await {
            debug!(scope = self.scope.name(), "token renewed by concurrent caller");
            return Ok(token);
        }

        self.renew_and_record(&mut gate).await
    }

    /// Unconditionally fetch and store a new token
    pub async fn renew(&self) -> Result<Token> {
        let mut gate = self.renewal_gate.lock().await;
        self.renew_and_record(&mut gate).await
    }

    /// Drop the cached token so the next call renews
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }

    /// Credentials for one authenticated call in this scope
    pub async fn request_auth(&self) -> Result<RequestAuth> {
        let token = self.get_token().await?;
        Ok(RequestAuth {
            bearer: token.value().to_string(),
            developer_id: self.developer_id.clone(),
        })
    }

    async fn cached(&self) -> Option<Token> {
        let current = self.current.read().await;
        current.as_ref().filter(|token| self.is_valid(token)).cloned()
    }

    async fn renew_and_record(
        &self,
        gate: &mut MutexGuard<'_, Option<VocalisError>>,
    ) -> Result<Token> {
        let outcome = self.renew_locked().await;
        **gate = outcome.as_ref().err().cloned();
        self.generation.fetch_add(1, Ordering::Release);
        outcome
    }

    // Caller must hold `renewal_gate`.
    #[instrument(skip(self), fields(scope = self.scope.name()))]
    async fn renew_locked(&self) -> Result<Token> {
        let value = match &self.scope {
            CredentialScope::Admin => {
                let response = self.remote.renew_token(&TokenRequest::ClientCredentials).await?;
                let body: AccessTokenBody = renewal_body(response.status, &response.body)?;
                body.access_token
            }
            CredentialScope::Consumer { credentials, admin } => {
                let admin_auth = admin_request_auth(admin).await?;
                let request =
                    TokenRequest::Consumer { credentials: credentials.clone(), admin: admin_auth };
                let response = self.remote.renew_token(&request).await?;
                let body: ConsumerTokenBody = renewal_body(response.status, &response.body)?;
                body.token
            }
        };

        let value = value.filter(|v| !v.is_empty()).ok_or_else(|| {
            warn!("token renewal response carried no credential");
            VocalisError::Auth("token renewal response is missing the token field".into())
        })?;

        let token = Token::new(value, self.clock.now(), self.ttl);
        *self.current.write().await = Some(token.clone());

        info!(ttl_secs = self.ttl.as_secs(), token_len = token.value().len(), "token renewed");
        Ok(token)
    }
}

/// Admin renewal re-enters `renew_locked` on another cache, so the future is
/// boxed outside of it.
fn admin_request_auth(admin: &TokenCache) -> AuthFuture<'_> {
    Box::pin(admin.request_auth())
}

fn renewal_body<T: serde::de::DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    if status != 200 {
        warn!(status, "token renewal rejected");
        return Err(VocalisError::Auth(format!(
            "token renewal failed with status {status}: {body}"
        )));
    }
    serde_json::from_str(body)
        .map_err(|e| VocalisError::Auth(format!("token renewal returned an unusable body: {e}")))
}
