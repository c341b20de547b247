use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use vocalis_core::{RemoteOperations, RemoteResponse, RequestAuth, TokenRequest};
use vocalis_domain::{PageRequest, ResourceKind, Result, VocalisError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Create,
    Fetch,
    Update,
    Delete,
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(ResourceKind, Value),
    Fetch(ResourceKind, String),
    Update(ResourceKind, String, Value),
    Delete(ResourceKind, String),
    List(ResourceKind, PageRequest),
    RenewToken(TokenRequest),
}

impl Call {
    pub fn op(&self) -> Option<(Op, ResourceKind)> {
        match self {
            Self::Create(kind, _) => Some((Op::Create, *kind)),
            Self::Fetch(kind, _) => Some((Op::Fetch, *kind)),
            Self::Update(kind, _, _) => Some((Op::Update, *kind)),
            Self::Delete(kind, _) => Some((Op::Delete, *kind)),
            Self::List(kind, _) => Some((Op::List, *kind)),
            Self::RenewToken(_) => None,
        }
    }
}

/// In-memory `RemoteOperations` with scripted responses.
///
/// Responses queued for an operation are returned in order; the last one
/// repeats once the queue is down to it. An unscripted call is a transport
/// error.
#[derive(Default)]
pub struct ScriptedRemote {
    calls: Mutex<Vec<Call>>,
    scripts: Mutex<HashMap<(Op, ResourceKind), VecDeque<Result<RemoteResponse>>>>,
    renewals: AtomicUsize,
    token_delay: Option<Duration>,
    token_status: Option<u16>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every token renewal for `delay`
    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = Some(delay);
        self
    }

    /// Answer token renewals with `status`
    pub fn with_token_status(mut self, status: u16) -> Self {
        self.token_status = Some(status);
        self
    }

    pub fn respond(&self, op: Op, kind: ResourceKind, status: u16, body: Value) -> &Self {
        self.push(op, kind, Ok(RemoteResponse::json(status, &body)))
    }

    pub fn respond_raw(&self, op: Op, kind: ResourceKind, status: u16, body: &str) -> &Self {
        self.push(op, kind, Ok(RemoteResponse::new(status, body)))
    }

    pub fn fail(&self, op: Op, kind: ResourceKind, error: VocalisError) -> &Self {
        self.push(op, kind, Err(error))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op, kind: ResourceKind) -> usize {
        self.calls().iter().filter(|call| call.op() == Some((op, kind))).count()
    }

    pub fn renewals(&self) -> usize {
        self.renewals.load(Ordering::SeqCst)
    }

    fn push(&self, op: Op, kind: ResourceKind, response: Result<RemoteResponse>) -> &Self {
        self.scripts.lock().unwrap().entry((op, kind)).or_default().push_back(response);
        self
    }

    fn answer(&self, call: Call) -> Result<RemoteResponse> {
        let key = call.op().expect("resource call");
        self.calls.lock().unwrap().push(call);

        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.entry(key).or_default();
        match queue.len() {
            0 => Err(VocalisError::Transport(format!("no scripted response for {key:?}"))),
            1 => queue.front().cloned().expect("non-empty"),
            _ => queue.pop_front().expect("non-empty"),
        }
    }
}

#[async_trait]
impl RemoteOperations for ScriptedRemote {
    async fn create(
        &self,
        kind: ResourceKind,
        payload: &Value,
        _auth: &RequestAuth,
    ) -> Result<RemoteResponse> {
        self.answer(Call::Create(kind, payload.clone()))
    }

    async fn fetch(&self, kind: ResourceKind, id: &str, _auth: &RequestAuth) -> Result<RemoteResponse> {
        self.answer(Call::Fetch(kind, id.to_string()))
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        payload: &Value,
        _auth: &RequestAuth,
    ) -> Result<RemoteResponse> {
        self.answer(Call::Update(kind, id.to_string(), payload.clone()))
    }

    async fn delete(&self, kind: ResourceKind, id: &str, _auth: &RequestAuth) -> Result<RemoteResponse> {
        self.answer(Call::Delete(kind, id.to_string()))
    }

    async fn list(
        &self,
        kind: ResourceKind,
        page: PageRequest,
        _auth: &RequestAuth,
    ) -> Result<RemoteResponse> {
        self.answer(Call::List(kind, page))
    }

    async fn renew_token(&self, request: &TokenRequest) -> Result<RemoteResponse> {
        self.calls.lock().unwrap().push(Call::RenewToken(request.clone()));
        let n = self.renewals.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(delay) = self.token_delay {
            tokio::time::sleep(delay).await;
        }

        let body = match request {
            TokenRequest::ClientCredentials => {
                serde_json::json!({"access_token": format!("admin-{n}"), "expires_in": 3600})
            }
            TokenRequest::Consumer { .. } => serde_json::json!({"token": format!("consumer-{n}")}),
        };
        Ok(RemoteResponse::json(self.token_status.unwrap_or(200), &body))
    }
}
