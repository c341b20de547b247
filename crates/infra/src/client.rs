//! Ready-to-use client wiring
//!
//! [`VocalisClient`] owns the HTTP adapter and the admin token cache and
//! hands out orchestrators for the admin scope or for one consumer.

use std::sync::Arc;

use tracing::info;
use vocalis_core::{ResourceService, TokenCache, WorkflowOrchestrator};
use vocalis_domain::{ClientConfig, ConsumerCredentials, Result, Validate};

use crate::api::RestRemote;
use crate::config;

/// Configured entry point: HTTP adapter plus the admin token cache
pub struct VocalisClient {
    config: ClientConfig,
    remote: Arc<RestRemote>,
    admin_tokens: Arc<TokenCache>,
}

impl VocalisClient {
    /// Validate `config` and build the HTTP adapter
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let remote = Arc::new(RestRemote::from_config(&config.api)?);
        let admin_tokens = Arc::new(TokenCache::admin(remote.clone(), config.token_ttl()));

        info!(base_url = %remote.base_url(), "vocalis client ready");
        Ok(Self { config, remote, admin_tokens })
    }

    /// Client from the environment or the first config file found
    pub fn from_env_or_file() -> Result<Self> {
        Self::new(config::load()?)
    }

    /// Validated configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Shared HTTP adapter
    pub fn remote(&self) -> Arc<RestRemote> {
        self.remote.clone()
    }

    /// Shared admin-scope token cache
    pub fn admin_tokens(&self) -> Arc<TokenCache> {
        self.admin_tokens.clone()
    }

    /// Admin-scope CRUD over every collection
    pub fn resources(&self) -> ResourceService {
        ResourceService::new(self.remote.clone(), self.admin_tokens.clone())
    }

    /// Workflows authorized with the admin token
    pub fn orchestrator(&self) -> WorkflowOrchestrator {
        WorkflowOrchestrator::new(self.remote.clone(), self.admin_tokens.clone(), self.config.poll_budget())
    }

    /// Workflows authorized with a token issued to one consumer.
    ///
    /// `developer_id` replaces the configured `Developer-Id` header for this
    /// scope. App-model reads still use the admin token.
    pub fn consumer_orchestrator(
        &self,
        credentials: ConsumerCredentials,
        developer_id: Option<String>,
    ) -> Result<WorkflowOrchestrator> {
        credentials.validate()?;
        let mut tokens = TokenCache::consumer(
            self.remote.clone(),
            self.admin_tokens.clone(),
            credentials,
            self.config.token_ttl(),
        );
        if let Some(developer_id) = developer_id {
            tokens = tokens.with_developer_id(developer_id);
        }

        Ok(WorkflowOrchestrator::new(self.remote.clone(), Arc::new(tokens), self.config.poll_budget())
            .with_admin_tokens(self.admin_tokens.clone()))
    }
}
