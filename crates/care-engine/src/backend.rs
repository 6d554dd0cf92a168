//! Case backend abstraction.
//!
//! The engine talks to the case-management API through this trait only:
//! one fetch and one mutation call. Production wiring supplies an HTTP
//! client; tests use [`crate::fake::FakeCaseBackend`].

use async_trait::async_trait;
use care_shared::{ActionClass, ActionKind, ActionRequest, CaseId, CaseSnapshot, Transition, UserId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Transport-level failure: the call was rejected or never answered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Recognizable error value with a message
    #[error("{0}")]
    Message(String),

    #[error("request timed out")]
    Timeout,

    /// Something went wrong and nothing usable came back
    #[error("unrecognized transport failure")]
    Opaque,
}

impl TransportError {
    /// Message fit for the notification channel, when there is one.
    pub fn displayable_message(&self) -> Option<&str> {
        match self {
            TransportError::Message(m) if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }

    /// No response is handled like an explicit business failure.
    pub fn is_no_response(&self) -> bool {
        matches!(self, TransportError::Timeout)
    }
}

/// One remote mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationCall {
    pub kind: ActionClass,
    pub case_id: CaseId,
    pub actor: UserId,
    pub payload: Value,
}

impl MutationCall {
    /// Build the call for an already-validated request.
    pub fn for_request(request: &ActionRequest) -> Self {
        let payload = match &request.kind {
            ActionKind::Lifecycle { transition } => match transition {
                Transition::SetMsoc { reason } | Transition::Close { reason } => {
                    json!({ "reason": reason })
                }
                Transition::Assign { assignee } => json!({ "assignee": assignee }),
                Transition::Escalate | Transition::UndoEscalate | Transition::UndoMsoc => {
                    json!({})
                }
            },
            ActionKind::EditSection { payload, .. } => payload.clone(),
        };
        Self {
            kind: request.kind.class(),
            case_id: request.case_id.clone(),
            actor: request.actor.identity.clone(),
            payload,
        }
    }
}

/// `{success, error?}` as returned by every mutation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MutationReply {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failure(error: Option<String>) -> Self {
        Self { success: false, error }
    }
}

#[async_trait]
pub trait CaseBackend: Send + Sync {
    /// `FetchCase(caseId)`
    async fn fetch_case(&self, case_id: &CaseId) -> Result<CaseSnapshot, TransportError>;

    /// `Mutate(kind, caseId, actor, payload)`
    async fn mutate(&self, call: &MutationCall) -> Result<MutationReply, TransportError>;
}
