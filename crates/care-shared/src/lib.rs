//! Shared types and rules for care coordination case management.
//!
//! Everything here is pure: snapshot model, authorization predicate,
//! lifecycle transition table, action values and section working state.
//! The async orchestration lives in `care-engine`.

pub mod action;
pub mod authz;
pub mod error;
pub mod lifecycle;
pub mod msoc;
pub mod notification;
pub mod section;
pub mod snapshot;
pub mod user;

pub use action::{ActionKind, ActionOutcome, ActionRequest, UNKNOWN_ERROR_MESSAGE};
pub use authz::{can_act, can_edit_case, is_owner, ActionClass, Permissions};
pub use error::{CareError, ReasonError, ValidationError};
pub use lifecycle::{validate_close_reason, Transition, TransitionKind, TRANSITION_TABLE};
pub use msoc::MsocReasonCatalog;
pub use notification::{Notification, Severity};
pub use section::{SectionMode, SectionRules, SectionState, SyncDecision};
pub use snapshot::{CaseId, CaseSnapshot, CaseStatus, MsocChange, MsocTag, SectionName, SnapshotDelta};
pub use user::{ActingUser, SupervisorRoles, UserId};
