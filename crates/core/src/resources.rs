//! CRUD access to the remote collections
//!
//! Every call validates its payload first, authenticates through the
//! service's [`TokenCache`], and maps the status uniformly: the expected
//! status decodes the body, anything else is `Remote { status, body }`.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};
use vocalis_domain::{
    AppModel, Consumer, Enrollment, Page, PageRequest, ResourceKind, ResourceLocator, Result,
    Validate, Verification, VocalisError,
};

use crate::auth::TokenCache;
use crate::ports::{RemoteOperations, RemoteResponse};

pub(crate) const STATUS_OK: u16 = 200;
pub(crate) const STATUS_CREATED: u16 = 201;
pub(crate) const STATUS_ACCEPTED: u16 = 202;

/// Serialize a validated payload
pub(crate) fn to_payload<P: Validate + Serialize>(payload: &P) -> Result<Value> {
    payload.validate()?;
    serde_json::to_value(payload)
        .map_err(|e| VocalisError::Validation(format!("payload cannot be encoded: {e}")))
}

/// Resource id from a create/update response with the expected status
pub(crate) fn locator_id(response: RemoteResponse, expected: u16) -> Result<String> {
    let response = response.expect_status(expected)?;
    let locator: ResourceLocator = response.decode()?;
    locator
        .id()
        .map(str::to_string)
        .ok_or_else(|| VocalisError::Remote { status: response.status, body: response.body.clone() })
}

/// Remote collections reachable with one credential scope
#[derive(Clone)]
pub struct ResourceService {
    remote: Arc<dyn RemoteOperations>,
    tokens: Arc<TokenCache>,
}

impl ResourceService {
    /// CRUD authenticated through `tokens`
    pub fn new(remote: Arc<dyn RemoteOperations>, tokens: Arc<TokenCache>) -> Self {
        Self { remote, tokens }
    }

    /// The `app-models` collection
    pub fn app_models(&self) -> Collection<'_, AppModel> {
        Collection::new(self, ResourceKind::AppModel)
    }

    /// The `consumers` collection
    pub fn consumers(&self) -> Collection<'_, Consumer> {
        Collection::new(self, ResourceKind::Consumer)
    }

    /// The `enrollments` collection
    pub fn enrollments(&self) -> Collection<'_, Enrollment> {
        Collection::new(self, ResourceKind::Enrollment)
    }

    /// The `verifications` collection
    pub fn verifications(&self) -> Collection<'_, Verification> {
        Collection::new(self, ResourceKind::Verification)
    }
}

/// Typed handle on one collection
pub struct Collection<'a, T> {
    service: &'a ResourceService,
    kind: ResourceKind,
    _body: PhantomData<fn() -> T>,
}

impl<'a, T: DeserializeOwned> Collection<'a, T> {
    fn new(service: &'a ResourceService, kind: ResourceKind) -> Self {
        Self { service, kind, _body: PhantomData }
    }

    /// Kind of resource this collection serves
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Create a resource and return its id (expects 201)
    #[instrument(skip(self, payload), fields(kind = %self.kind))]
    pub async fn create<P: Validate + Serialize + Sync>(&self, payload: &P) -> Result<String> {
        let body = to_payload(payload)?;
        let auth = self.service.tokens.request_auth().await?;
        let response = self.service.remote.create(self.kind, &body, &auth).await?;
        let id = locator_id(response, STATUS_CREATED)?;
        debug!(%id, "created");
        Ok(id)
    }

    /// Update a resource and return its id (expects 202)
    #[instrument(skip(self, payload), fields(kind = %self.kind))]
    pub async fn update<P: Validate + Serialize + Sync>(&self, id: &str, payload: &P) -> Result<String> {
        let body = to_payload(payload)?;
        let auth = self.service.tokens.request_auth().await?;
        let response = self.service.remote.update(self.kind, id, &body, &auth).await?;
        locator_id(response, STATUS_ACCEPTED)
    }

    /// Fetch one resource (expects 200)
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn get(&self, id: &str) -> Result<T> {
        let auth = self.service.tokens.request_auth().await?;
        let response = self.service.remote.fetch(self.kind, id, &auth).await?;
        response.expect_status(STATUS_OK)?.decode()
    }

    /// One page of the collection (expects 200)
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn list(&self, page: PageRequest) -> Result<Page<T>> {
        let auth = self.service.tokens.request_auth().await?;
        let response = self.service.remote.list(self.kind, page, &auth).await?;
        response.expect_status(STATUS_OK)?.decode()
    }

    /// Delete a resource (expects 200)
    #[instrument(skip(self), fields(kind = %self.kind))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let auth = self.service.tokens.request_auth().await?;
        self.service.remote.delete(self.kind, id, &auth).await?.expect_status(STATUS_OK)?;
        debug!(%id, "deleted");
        Ok(())
    }
}
