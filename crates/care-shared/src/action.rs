//! Action requests and their outcomes.
//!
//! A request lives for exactly one round trip: it is created by a UI
//! trigger, submitted once, and discarded after producing an outcome.

use crate::authz::ActionClass;
use crate::error::CareError;
use crate::lifecycle::Transition;
use crate::snapshot::{CaseId, SectionName, SnapshotDelta};
use crate::user::{ActingUser, UserId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fallback shown when a transport failure carries no usable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Lifecycle { transition: Transition },
    EditSection { section: SectionName, payload: Value },
}

impl ActionKind {
    pub fn escalate() -> Self {
        Self::Lifecycle { transition: Transition::Escalate }
    }

    pub fn undo_escalate() -> Self {
        Self::Lifecycle { transition: Transition::UndoEscalate }
    }

    pub fn set_msoc(reason: impl Into<String>) -> Self {
        Self::Lifecycle { transition: Transition::SetMsoc { reason: reason.into() } }
    }

    pub fn undo_msoc() -> Self {
        Self::Lifecycle { transition: Transition::UndoMsoc }
    }

    pub fn close(reason: impl Into<String>) -> Self {
        Self::Lifecycle { transition: Transition::Close { reason: reason.into() } }
    }

    pub fn assign(assignee: impl Into<UserId>) -> Self {
        Self::Lifecycle { transition: Transition::Assign { assignee: assignee.into() } }
    }

    pub fn edit_section(section: SectionName, payload: Value) -> Self {
        Self::EditSection { section, payload }
    }

    /// Gate class. Also the in-flight slot: one per lifecycle kind, one per
    /// section.
    pub fn class(&self) -> ActionClass {
        match self {
            ActionKind::Lifecycle { transition } => transition.kind().into(),
            ActionKind::EditSection { section, .. } => ActionClass::EditSection(*section),
        }
    }

    pub fn success_message(&self) -> String {
        match self {
            ActionKind::Lifecycle { transition } => transition.success_message(),
            ActionKind::EditSection { section, .. } => {
                format!("{} updated successfully!", section.label())
            }
        }
    }

    pub fn failure_message(&self) -> String {
        match self {
            ActionKind::Lifecycle { transition } => transition.failure_message(),
            ActionKind::EditSection { section, .. } => {
                format!("{} can not be updated!", section.label())
            }
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.class())
    }
}

/// One attempted transition or edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub case_id: CaseId,
    pub actor: ActingUser,
    pub kind: ActionKind,
}

impl ActionRequest {
    pub fn new(case_id: impl Into<CaseId>, actor: ActingUser, kind: ActionKind) -> Self {
        Self { case_id: case_id.into(), actor, kind }
    }
}

/// Result of one submitted request.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// Remote call succeeded; the delta has been merged.
    Success { delta: SnapshotDelta, message: String },
    /// Refused locally; no remote call was made.
    Rejected { error: CareError },
    /// Remote call failed; carries no delta.
    Failed { message: String },
}

impl ActionOutcome {
    pub fn success(delta: SnapshotDelta, message: impl Into<String>) -> Self {
        Self::Success { delta, message: message.into() }
    }

    pub fn rejected(error: CareError) -> Self {
        Self::Rejected { error }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed { message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn delta(&self) -> Option<&SnapshotDelta> {
        match self {
            Self::Success { delta, .. } => Some(delta),
            _ => None,
        }
    }

    /// Displayable text for any outcome
    pub fn message(&self) -> String {
        match self {
            Self::Success { message, .. } | Self::Failed { message } => message.clone(),
            Self::Rejected { error } => error.to_string(),
        }
    }

    pub fn rejection(&self) -> Option<&CareError> {
        match self {
            Self::Rejected { error } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use serde_json::json;

    #[test]
    fn test_kind_classes() {
        assert_eq!(ActionKind::escalate().class(), ActionClass::Escalate);
        assert_eq!(ActionKind::close("x").class(), ActionClass::Close);
        assert_eq!(
            ActionKind::edit_section(SectionName::Notes, json!({})).class(),
            ActionClass::EditSection(SectionName::Notes)
        );
    }

    #[test]
    fn test_section_messages() {
        let kind = ActionKind::edit_section(SectionName::FollowUp, json!({}));
        assert_eq!(kind.success_message(), "Follow-up updated successfully!");
        assert_eq!(kind.failure_message(), "Follow-up can not be updated!");
    }

    #[test]
    fn test_outcome_accessors() {
        let ok = ActionOutcome::success(SnapshotDelta::escalated(true), "done");
        assert!(ok.is_success());
        assert_eq!(ok.delta(), Some(&SnapshotDelta::escalated(true)));

        let failed = ActionOutcome::failed(UNKNOWN_ERROR_MESSAGE);
        assert!(failed.delta().is_none());
        assert_eq!(failed.message(), "An unknown error occurred");

        let rejected =
            ActionOutcome::rejected(CareError::Validation(ValidationError::BlankAssignee));
        assert!(rejected.is_rejected());
        assert_eq!(rejected.message(), "Validation failed: Assignee cannot be empty.");
    }

    #[test]
    fn test_request_serializes() {
        let req = ActionRequest::new("C-1", ActingUser::member("a@x.com"), ActionKind::escalate());
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["case_id"], "C-1");
        assert_eq!(json["kind"]["type"], "lifecycle");
        assert_eq!(json["kind"]["transition"]["type"], "escalate");
    }
}
