//! Authorization predicate.
//!
//! Pure functions over a snapshot and an acting user. NO I/O, never fails.
//! Every section edit resolves to [`can_edit_case`]; lifecycle actions add
//! their tag pre-state on top of the same ownership rule.

use crate::snapshot::{CaseSnapshot, SectionName};
use crate::user::ActingUser;
use serde::{Deserialize, Serialize};

/// Class of action being authorized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "section", rename_all = "snake_case")]
pub enum ActionClass {
    EditSection(SectionName),
    Escalate,
    UndoEscalate,
    SetMsoc,
    UndoMsoc,
    Close,
    Assign,
}

impl std::fmt::Display for ActionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EditSection(name) => write!(f, "edit:{}", name),
            Self::Escalate => write!(f, "escalate"),
            Self::UndoEscalate => write!(f, "undo_escalate"),
            Self::SetMsoc => write!(f, "set_msoc"),
            Self::UndoMsoc => write!(f, "undo_msoc"),
            Self::Close => write!(f, "close"),
            Self::Assign => write!(f, "assign"),
        }
    }
}

pub fn is_owner(snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
    match &snapshot.assigned_to {
        Some(owner) => !owner.is_blank() && *owner == user.identity,
        None => false,
    }
}

fn owner_or_supervisor(snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
    is_owner(snapshot, user) || user.is_supervisor
}

/// The single rule behind every section edit control.
pub fn can_edit_case(snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
    snapshot.is_open() && owner_or_supervisor(snapshot, user)
}

pub fn can_escalate(snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
    can_edit_case(snapshot, user) && !snapshot.escalated
}

pub fn can_undo_escalate(snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
    can_edit_case(snapshot, user) && snapshot.escalated
}

pub fn can_set_msoc(snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
    can_edit_case(snapshot, user) && !snapshot.is_msoc()
}

pub fn can_undo_msoc(snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
    can_edit_case(snapshot, user) && snapshot.is_msoc()
}

pub fn can_close(snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
    can_edit_case(snapshot, user)
}

pub fn can_assign(snapshot: &CaseSnapshot, user: &ActingUser) -> bool {
    can_edit_case(snapshot, user)
}

/// `CanAct(snapshot, user, class)`
pub fn can_act(snapshot: &CaseSnapshot, user: &ActingUser, class: ActionClass) -> bool {
    match class {
        ActionClass::EditSection(_) => can_edit_case(snapshot, user),
        ActionClass::Escalate => can_escalate(snapshot, user),
        ActionClass::UndoEscalate => can_undo_escalate(snapshot, user),
        ActionClass::SetMsoc => can_set_msoc(snapshot, user),
        ActionClass::UndoMsoc => can_undo_msoc(snapshot, user),
        ActionClass::Close => can_close(snapshot, user),
        ActionClass::Assign => can_assign(snapshot, user),
    }
}

/// Every gate evaluated once against one snapshot, for rendering controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    pub edit_case: bool,
    pub escalate: bool,
    pub undo_escalate: bool,
    pub set_msoc: bool,
    pub undo_msoc: bool,
    pub close: bool,
    pub assign: bool,
}

impl Permissions {
    pub fn evaluate(snapshot: &CaseSnapshot, user: &ActingUser) -> Self {
        Self {
            edit_case: can_edit_case(snapshot, user),
            escalate: can_escalate(snapshot, user),
            undo_escalate: can_undo_escalate(snapshot, user),
            set_msoc: can_set_msoc(snapshot, user),
            undo_msoc: can_undo_msoc(snapshot, user),
            close: can_close(snapshot, user),
            assign: can_assign(snapshot, user),
        }
    }

    pub fn allows(&self, class: ActionClass) -> bool {
        match class {
            ActionClass::EditSection(_) => self.edit_case,
            ActionClass::Escalate => self.escalate,
            ActionClass::UndoEscalate => self.undo_escalate,
            ActionClass::SetMsoc => self.set_msoc,
            ActionClass::UndoMsoc => self.undo_msoc,
            ActionClass::Close => self.close,
            ActionClass::Assign => self.assign,
        }
    }

    /// Nothing at all can be done (closed case, or a stranger).
    pub fn is_frozen(&self) -> bool {
        *self == Self::default()
    }
}
