//! Lifecycle transition table.
//!
//! `Open -> Closed` is the only status transition and `Closed` is terminal.
//! Escalation and MSOC are two independent two-state tags layered on top of
//! an open case. Each row of [`TRANSITION_TABLE`] pins the gate, the
//! required pre-state and the input a transition needs; [`Transition::plan`]
//! turns a request into the delta it would commit, or refuses it.

use crate::authz::{self, ActionClass};
use crate::error::{CareError, ReasonError, ValidationError};
use crate::msoc::MsocReasonCatalog;
use crate::snapshot::{CaseSnapshot, SnapshotDelta};
use crate::user::{ActingUser, UserId};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum close reason length (trimmed, in characters)
pub const CLOSE_REASON_MIN_CHARS: usize = 5;

/// Maximum close reason length (trimmed, in characters)
pub const CLOSE_REASON_MAX_CHARS: usize = 500;

static NUMERIC_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]*$").expect("numeric-only pattern is valid"));

/// Validate a close reason, returning the trimmed text to submit.
///
/// Checks run in a fixed order so the message is deterministic when more
/// than one would apply: blank, numeric-only, too short, too long. An
/// all-digit reason reports numeric-only even when it is also short.
pub fn validate_close_reason(reason: &str) -> Result<String, ReasonError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(ReasonError::Blank);
    }
    if NUMERIC_ONLY.is_match(trimmed) {
        return Err(ReasonError::NumericOnly);
    }
    let chars = trimmed.chars().count();
    if chars < CLOSE_REASON_MIN_CHARS {
        return Err(ReasonError::TooShort { min: CLOSE_REASON_MIN_CHARS });
    }
    if chars > CLOSE_REASON_MAX_CHARS {
        return Err(ReasonError::TooLong { max: CLOSE_REASON_MAX_CHARS });
    }
    Ok(trimmed.to_string())
}

/// Transition kinds without their input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Escalate,
    UndoEscalate,
    SetMsoc,
    UndoMsoc,
    Close,
    Assign,
}

impl TransitionKind {
    pub fn rule(&self) -> &'static TransitionRule {
        // Every kind has exactly one row.
        match self {
            TransitionKind::Escalate => &TRANSITION_TABLE[0],
            TransitionKind::UndoEscalate => &TRANSITION_TABLE[1],
            TransitionKind::SetMsoc => &TRANSITION_TABLE[2],
            TransitionKind::UndoMsoc => &TRANSITION_TABLE[3],
            TransitionKind::Close => &TRANSITION_TABLE[4],
            TransitionKind::Assign => &TRANSITION_TABLE[5],
        }
    }
}

impl From<TransitionKind> for ActionClass {
    fn from(kind: TransitionKind) -> Self {
        match kind {
            TransitionKind::Escalate => ActionClass::Escalate,
            TransitionKind::UndoEscalate => ActionClass::UndoEscalate,
            TransitionKind::SetMsoc => ActionClass::SetMsoc,
            TransitionKind::UndoMsoc => ActionClass::UndoMsoc,
            TransitionKind::Close => ActionClass::Close,
            TransitionKind::Assign => ActionClass::Assign,
        }
    }
}

impl std::fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", ActionClass::from(*self))
    }
}

/// What a transition needs from the user before it can be attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRequirement {
    None,
    /// One entry of the MSOC reason catalog
    MsocReason,
    /// Free text, see [`validate_close_reason`]
    CloseReason,
    /// Non-blank user identity
    Assignee,
}

/// One row of the transition table.
pub struct TransitionRule {
    pub kind: TransitionKind,
    pub gate: fn(&CaseSnapshot, &ActingUser) -> bool,
    pub pre_state: fn(&CaseSnapshot) -> bool,
    pub input: InputRequirement,
}

impl std::fmt::Debug for TransitionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionRule")
            .field("kind", &self.kind)
            .field("input", &self.input)
            .finish()
    }
}

/// Pinned transition table. Order matches [`TransitionKind::rule`].
pub static TRANSITION_TABLE: [TransitionRule; 6] = [
    TransitionRule {
        kind: TransitionKind::Escalate,
        gate: authz::can_escalate,
        pre_state: |s| !s.escalated,
        input: InputRequirement::None,
    },
    TransitionRule {
        kind: TransitionKind::UndoEscalate,
        gate: authz::can_undo_escalate,
        pre_state: |s| s.escalated,
        input: InputRequirement::None,
    },
    TransitionRule {
        kind: TransitionKind::SetMsoc,
        gate: authz::can_set_msoc,
        pre_state: |s| !s.is_msoc(),
        input: InputRequirement::MsocReason,
    },
    TransitionRule {
        kind: TransitionKind::UndoMsoc,
        gate: authz::can_undo_msoc,
        pre_state: |s| s.is_msoc(),
        input: InputRequirement::None,
    },
    TransitionRule {
        kind: TransitionKind::Close,
        gate: authz::can_close,
        pre_state: |s| s.is_open(),
        input: InputRequirement::CloseReason,
    },
    TransitionRule {
        kind: TransitionKind::Assign,
        gate: authz::can_assign,
        pre_state: |s| s.is_open(),
        input: InputRequirement::Assignee,
    },
];

/// A lifecycle transition with its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    Escalate,
    UndoEscalate,
    SetMsoc { reason: String },
    UndoMsoc,
    Close { reason: String },
    Assign { assignee: UserId },
}

impl Transition {
    pub fn kind(&self) -> TransitionKind {
        match self {
            Transition::Escalate => TransitionKind::Escalate,
            Transition::UndoEscalate => TransitionKind::UndoEscalate,
            Transition::SetMsoc { .. } => TransitionKind::SetMsoc,
            Transition::UndoMsoc => TransitionKind::UndoMsoc,
            Transition::Close { .. } => TransitionKind::Close,
            Transition::Assign { .. } => TransitionKind::Assign,
        }
    }

    /// Gate and pre-state against `snapshot`. Never fails.
    pub fn permitted(&self, snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
        let rule = self.kind().rule();
        (rule.gate)(snapshot, user) && (rule.pre_state)(snapshot)
    }

    /// Check and normalize the transition's input, returning the
    /// normalized form to submit.
    pub fn validate(&self, catalog: &MsocReasonCatalog) -> Result<Transition, ValidationError> {
        match self {
            Transition::SetMsoc { reason } => Ok(Transition::SetMsoc {
                reason: catalog.validate(reason)?,
            }),
            Transition::Close { reason } => Ok(Transition::Close {
                reason: validate_close_reason(reason)?,
            }),
            Transition::Assign { assignee } => {
                if assignee.is_blank() {
                    Err(ValidationError::BlankAssignee)
                } else {
                    Ok(Transition::Assign {
                        assignee: UserId::new(assignee.as_str().trim()),
                    })
                }
            }
            other => Ok(other.clone()),
        }
    }

    /// The post-state delta this transition commits.
    pub fn delta(&self, now: DateTime<Utc>) -> SnapshotDelta {
        match self {
            Transition::Escalate => SnapshotDelta::escalated(true),
            Transition::UndoEscalate => SnapshotDelta::escalated(false),
            Transition::SetMsoc { reason } => SnapshotDelta::msoc_set(reason.clone()),
            Transition::UndoMsoc => SnapshotDelta::msoc_cleared(),
            Transition::Close { reason } => SnapshotDelta::closed(reason.clone(), now),
            Transition::Assign { assignee } => SnapshotDelta::assigned(assignee.clone()),
        }
    }

    /// Gate first, then input. Returns the normalized transition and its
    /// delta, or the reason it must not be attempted.
    pub fn plan(
        &self,
        snapshot: &CaseSnapshot,
        user: &ActingUser,
        catalog: &MsocReasonCatalog,
        now: DateTime<Utc>,
    ) -> Result<(Transition, SnapshotDelta), CareError> {
        if !self.permitted(snapshot, user) {
            return Err(CareError::NotPermitted);
        }
        let normalized = self.validate(catalog)?;
        let delta = normalized.delta(now);
        Ok((normalized, delta))
    }

    pub fn success_message(&self) -> String {
        match self {
            Transition::Escalate => "Request escalated successfully!".to_string(),
            Transition::UndoEscalate => "Escalation removed successfully!".to_string(),
            Transition::SetMsoc { .. } => "MSOC tag added successfully!".to_string(),
            Transition::UndoMsoc => "MSOC tag removed successfully!".to_string(),
            Transition::Close { .. } => "Request closed successfully!".to_string(),
            Transition::Assign { assignee } => format!("Request assigned to {}", assignee),
        }
    }

    /// Fixed message for a business failure reported by the backend.
    pub fn failure_message(&self) -> String {
        match self {
            Transition::Escalate => "Request can not be escalated!".to_string(),
            Transition::UndoEscalate => "Escalation can not be removed!".to_string(),
            Transition::SetMsoc { .. } => "MSOC tag can not be added!".to_string(),
            Transition::UndoMsoc => "MSOC tag can not be removed!".to_string(),
            Transition::Close { .. } => "Request can not be closed!".to_string(),
            Transition::Assign { assignee } => {
                format!("Request can not be assigned to {}", assignee)
            }
        }
    }
}
