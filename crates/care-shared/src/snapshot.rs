//! Case snapshot: the server's view of one care coordination case.
//!
//! A snapshot is replaced wholesale on fetch and otherwise only changes by
//! merging a [`SnapshotDelta`] produced by a successful action. `Closed` is
//! terminal: no delta can move a case back to `Open`.

use crate::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Opaque case identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(String);

impl CaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CaseId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Primary case status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Open,
    /// Terminal. The case is frozen.
    Closed,
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Independently editable sub-sections of the case detail view.
/// Order is pinned for deterministic serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionName {
    FollowUp,
    CareCoordination,
    CaseManager,
    ProcedureCodes,
    Notes,
    Attachments,
    Provider,
}

impl SectionName {
    pub const ALL: [SectionName; 7] = [
        SectionName::FollowUp,
        SectionName::CareCoordination,
        SectionName::CaseManager,
        SectionName::ProcedureCodes,
        SectionName::Notes,
        SectionName::Attachments,
        SectionName::Provider,
    ];

    /// Human label used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            SectionName::FollowUp => "Follow-up",
            SectionName::CareCoordination => "Care coordination",
            SectionName::CaseManager => "Case manager",
            SectionName::ProcedureCodes => "Procedure codes",
            SectionName::Notes => "Notes",
            SectionName::Attachments => "Attachments",
            SectionName::Provider => "Provider",
        }
    }
}

impl std::fmt::Display for SectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SectionName::FollowUp => "follow_up",
            SectionName::CareCoordination => "care_coordination",
            SectionName::CaseManager => "case_manager",
            SectionName::ProcedureCodes => "procedure_codes",
            SectionName::Notes => "notes",
            SectionName::Attachments => "attachments",
            SectionName::Provider => "provider",
        };
        write!(f, "{}", s)
    }
}

/// Missed-start-of-care tag with the reason it was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsocTag {
    pub reason: String,
}

/// Change to the MSOC tag carried by a delta
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MsocChange {
    Set { reason: String },
    Cleared,
}

/// The engine's view of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSnapshot {
    pub case_id: CaseId,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub escalated: bool,
    #[serde(default)]
    pub msoc: Option<MsocTag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Section payloads, opaque to the engine
    #[serde(default)]
    pub sections: BTreeMap<SectionName, Value>,
    /// Local counter bumped on every merge; not part of the server model.
    #[serde(skip)]
    pub generation: u64,
}

impl CaseSnapshot {
    /// A fresh, unassigned, untagged open case.
    pub fn open(case_id: impl Into<CaseId>) -> Self {
        Self {
            case_id: case_id.into(),
            status: CaseStatus::Open,
            assigned_to: None,
            escalated: false,
            msoc: None,
            close_reason: None,
            closed_at: None,
            sections: BTreeMap::new(),
            generation: 0,
        }
    }

    pub fn with_assignee(mut self, user: impl Into<UserId>) -> Self {
        self.assigned_to = Some(user.into());
        self
    }

    pub fn with_escalated(mut self, escalated: bool) -> Self {
        self.escalated = escalated;
        self
    }

    pub fn with_msoc(mut self, reason: impl Into<String>) -> Self {
        self.msoc = Some(MsocTag { reason: reason.into() });
        self
    }

    pub fn with_section(mut self, name: SectionName, payload: Value) -> Self {
        self.sections.insert(name, payload);
        self
    }

    pub fn closed(mut self, reason: impl Into<String>) -> Self {
        self.status = CaseStatus::Closed;
        self.close_reason = Some(reason.into());
        self
    }

    pub fn is_open(&self) -> bool {
        self.status == CaseStatus::Open
    }

    pub fn is_closed(&self) -> bool {
        self.status == CaseStatus::Closed
    }

    pub fn is_msoc(&self) -> bool {
        self.msoc.is_some()
    }

    pub fn section(&self, name: SectionName) -> Option<&Value> {
        self.sections.get(&name)
    }

    /// Merge a delta field by field.
    ///
    /// Status only ever moves Open -> Closed. Section payloads always land,
    /// including edits that complete after a close.
    pub fn apply(&mut self, delta: &SnapshotDelta) {
        if let Some(status) = delta.status {
            if self.status != CaseStatus::Closed {
                self.status = status;
            }
        }
        if let Some(assignee) = &delta.assigned_to {
            self.assigned_to = Some(assignee.clone());
        }
        if let Some(escalated) = delta.escalated {
            self.escalated = escalated;
        }
        match &delta.msoc {
            Some(MsocChange::Set { reason }) => {
                self.msoc = Some(MsocTag { reason: reason.clone() });
            }
            Some(MsocChange::Cleared) => self.msoc = None,
            None => {}
        }
        if let Some(reason) = &delta.close_reason {
            self.close_reason = Some(reason.clone());
        }
        if let Some(at) = delta.closed_at {
            self.closed_at = Some(at);
        }
        for (name, payload) in &delta.sections {
            self.sections.insert(*name, payload.clone());
        }
        self.generation = self.generation.wrapping_add(1);
    }
}

/// The fields a successful action changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msoc: Option<MsocChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sections: BTreeMap<SectionName, Value>,
}

impl SnapshotDelta {
    pub fn escalated(value: bool) -> Self {
        Self { escalated: Some(value), ..Default::default() }
    }

    pub fn msoc_set(reason: impl Into<String>) -> Self {
        Self {
            msoc: Some(MsocChange::Set { reason: reason.into() }),
            ..Default::default()
        }
    }

    pub fn msoc_cleared() -> Self {
        Self { msoc: Some(MsocChange::Cleared), ..Default::default() }
    }

    pub fn closed(reason: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(CaseStatus::Closed),
            close_reason: Some(reason.into()),
            closed_at: Some(at),
            ..Default::default()
        }
    }

    pub fn assigned(user: impl Into<UserId>) -> Self {
        Self { assigned_to: Some(user.into()), ..Default::default() }
    }

    pub fn section(name: SectionName, payload: Value) -> Self {
        let mut sections = BTreeMap::new();
        sections.insert(name, payload);
        Self { sections, ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
