//! Fake case backend for deterministic testing.
//!
//! Serves canned snapshots and canned mutation replies without any network.
//! Every mutation is recorded so tests can assert how many remote calls an
//! action produced. Individual action classes can be held in flight until
//! the test releases them.

use crate::backend::{CaseBackend, MutationCall, MutationReply, TransportError};
use async_trait::async_trait;
use care_shared::{ActionClass, CaseId, CaseSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;

/// Canned reply for one action class
#[derive(Debug, Clone, PartialEq)]
pub enum FakeReply {
    Ok,
    /// Business failure flag, with optional server text
    Fail(Option<String>),
    Transport(TransportError),
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

pub struct FakeCaseBackend {
    cases: Mutex<HashMap<CaseId, CaseSnapshot>>,
    replies: HashMap<ActionClass, FakeReply>,
    default_reply: FakeReply,
    fetch_error: Option<TransportError>,
    holds: Mutex<HashMap<ActionClass, Arc<Semaphore>>>,
    calls: Arc<Mutex<Vec<MutationCall>>>,
    fetches: Arc<Mutex<usize>>,
}

impl FakeCaseBackend {
    /// Backend serving one case, answering every mutation with success.
    pub fn with_case(snapshot: CaseSnapshot) -> Self {
        FakeCaseBackendBuilder::new().case(snapshot).build()
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<MutationCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, kind: ActionClass) -> usize {
        lock(&self.calls).iter().filter(|c| c.kind == kind).count()
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn fetch_count(&self) -> usize {
        *lock(&self.fetches)
    }

    /// Replace the server-side copy returned by the next fetch.
    pub fn set_case(&self, snapshot: CaseSnapshot) {
        lock(&self.cases).insert(snapshot.case_id.clone(), snapshot);
    }

    /// Hold every future call of `kind` until [`release`](Self::release).
    pub fn hold(&self, kind: ActionClass) {
        lock(&self.holds).insert(kind, Arc::new(Semaphore::new(0)));
    }

    /// Let one held call of `kind` complete.
    pub fn release(&self, kind: ActionClass) {
        if let Some(sem) = lock(&self.holds).get(&kind) {
            sem.add_permits(1);
        }
    }

    /// Yield until a call of `kind` has been recorded.
    pub async fn wait_for_call(&self, kind: ActionClass) {
        while self.call_count(kind) == 0 {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl CaseBackend for FakeCaseBackend {
    async fn fetch_case(&self, case_id: &CaseId) -> Result<CaseSnapshot, TransportError> {
        *lock(&self.fetches) += 1;
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }
        lock(&self.cases)
            .get(case_id)
            .cloned()
            .ok_or_else(|| TransportError::Message(format!("Case {} not found", case_id)))
    }

    async fn mutate(&self, call: &MutationCall) -> Result<MutationReply, TransportError> {
        lock(&self.calls).push(call.clone());

        let hold = lock(&self.holds).get(&call.kind).cloned();
        if let Some(sem) = hold {
            if let Ok(permit) = sem.acquire().await {
                permit.forget();
            }
        }

        match self.replies.get(&call.kind).unwrap_or(&self.default_reply) {
            FakeReply::Ok => Ok(MutationReply::ok()),
            FakeReply::Fail(text) => Ok(MutationReply::failure(text.clone())),
            FakeReply::Transport(err) => Err(err.clone()),
        }
    }
}

/// Builder for FakeCaseBackend
pub struct FakeCaseBackendBuilder {
    cases: HashMap<CaseId, CaseSnapshot>,
    replies: HashMap<ActionClass, FakeReply>,
    default_reply: FakeReply,
    fetch_error: Option<TransportError>,
}

impl FakeCaseBackendBuilder {
    pub fn new() -> Self {
        Self {
            cases: HashMap::new(),
            replies: HashMap::new(),
            default_reply: FakeReply::Ok,
            fetch_error: None,
        }
    }

    pub fn case(mut self, snapshot: CaseSnapshot) -> Self {
        self.cases.insert(snapshot.case_id.clone(), snapshot);
        self
    }

    pub fn reply(mut self, kind: ActionClass, reply: FakeReply) -> Self {
        self.replies.insert(kind, reply);
        self
    }

    pub fn default_reply(mut self, reply: FakeReply) -> Self {
        self.default_reply = reply;
        self
    }

    pub fn fetch_error(mut self, err: TransportError) -> Self {
        self.fetch_error = Some(err);
        self
    }

    pub fn build(self) -> FakeCaseBackend {
        FakeCaseBackend {
            cases: Mutex::new(self.cases),
            replies: self.replies,
            default_reply: self.default_reply,
            fetch_error: self.fetch_error,
            holds: Mutex::new(HashMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            fetches: Arc::new(Mutex::new(0)),
        }
    }
}

impl Default for FakeCaseBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}
