//! Section working state.
//!
//! Every editable section of the case detail view keeps a working copy of
//! its own payload and a viewing/editing mode. The edit control is shown
//! exactly when [`can_edit_case`] holds for the latest snapshot; sections
//! never derive their own variant of that rule.

use crate::authz::can_edit_case;
use crate::error::{CareError, ValidationError};
use crate::snapshot::{CaseSnapshot, SectionName};
use crate::user::ActingUser;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionMode {
    #[default]
    Viewing,
    Editing,
}

/// What [`SectionState::sync`] did with an incoming snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// Working copy overwritten from the snapshot
    Refreshed,
    /// A local edit is pending; working copy kept
    KeptPending,
    /// Edit mode abandoned because the gate closed
    EditRevoked,
    /// Snapshot generation already seen
    Unchanged,
}

/// Required payload keys for one section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRules {
    pub required: Vec<String>,
}

impl SectionRules {
    pub fn required<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { required: fields.into_iter().map(Into::into).collect() }
    }

    /// First missing or blank required field, in declaration order.
    pub fn check(&self, payload: &Value) -> Result<(), ValidationError> {
        for field in &self.required {
            let present = match payload.get(field) {
                None | Some(Value::Null) => false,
                Some(Value::String(s)) => !s.trim().is_empty(),
                Some(Value::Array(a)) => !a.is_empty(),
                Some(_) => true,
            };
            if !present {
                return Err(ValidationError::MissingField { field: field.clone() });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionState {
    name: SectionName,
    mode: SectionMode,
    synced: Value,
    working: Value,
    submitting: bool,
    can_edit: bool,
    seen_generation: Option<u64>,
}

impl SectionState {
    pub fn new(name: SectionName) -> Self {
        Self {
            name,
            mode: SectionMode::Viewing,
            synced: Value::Null,
            working: Value::Null,
            submitting: false,
            can_edit: false,
            seen_generation: None,
        }
    }

    pub fn name(&self) -> SectionName {
        self.name
    }

    pub fn mode(&self) -> SectionMode {
        self.mode
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Last synchronized payload
    pub fn view(&self) -> &Value {
        &self.synced
    }

    pub fn working(&self) -> &Value {
        &self.working
    }

    /// Exactly `can_edit_case` for the last synced snapshot.
    pub fn show_edit_control(&self) -> bool {
        self.can_edit
    }

    pub fn has_pending_edit(&self) -> bool {
        self.mode == SectionMode::Editing || self.submitting
    }

    /// Take in a (re)broadcast snapshot.
    pub fn sync(&mut self, snapshot: &CaseSnapshot, user: &ActingUser) -> SyncDecision {
        self.can_edit = can_edit_case(snapshot, user);
        let payload = snapshot.section(self.name).cloned().unwrap_or(Value::Null);

        if self.seen_generation == Some(snapshot.generation) && !self.has_pending_edit() {
            return SyncDecision::Unchanged;
        }
        self.seen_generation = Some(snapshot.generation);
        self.synced = payload;

        if self.mode == SectionMode::Editing && !self.submitting && !self.can_edit {
            self.mode = SectionMode::Viewing;
            self.working = self.synced.clone();
            return SyncDecision::EditRevoked;
        }
        if self.has_pending_edit() {
            return SyncDecision::KeptPending;
        }
        self.working = self.synced.clone();
        SyncDecision::Refreshed
    }

    /// Enter edit mode. Does not touch the shared snapshot.
    pub fn begin_edit(&mut self) -> Result<(), CareError> {
        if !self.can_edit {
            return Err(CareError::NotPermitted);
        }
        if self.mode == SectionMode::Viewing {
            self.mode = SectionMode::Editing;
            self.working = self.synced.clone();
        }
        Ok(())
    }

    pub fn set_working(&mut self, payload: Value) -> Result<(), CareError> {
        if self.mode != SectionMode::Editing || self.submitting {
            return Err(CareError::NotPermitted);
        }
        self.working = payload;
        Ok(())
    }

    /// Discard the working copy. No remote call.
    pub fn cancel(&mut self) {
        if self.submitting {
            return;
        }
        self.mode = SectionMode::Viewing;
        self.working = self.synced.clone();
    }

    /// Claim the section's single submit slot and hand out the payload.
    pub fn begin_submit(&mut self, rules: &SectionRules) -> Result<Value, CareError> {
        if self.submitting {
            return Err(CareError::InFlight(self.name.to_string()));
        }
        if self.mode != SectionMode::Editing {
            return Err(CareError::NotPermitted);
        }
        rules.check(&self.working)?;
        self.submitting = true;
        Ok(self.working.clone())
    }

    /// Release the submit slot. On success the submitted payload becomes
    /// the view; on failure the working copy stays for another attempt.
    pub fn finish_submit(&mut self, committed: Option<Value>) {
        self.submitting = false;
        if let Some(payload) = committed {
            self.synced = payload.clone();
            self.working = payload;
            self.mode = SectionMode::Viewing;
        } else if !self.can_edit {
            self.mode = SectionMode::Viewing;
            self.working = self.synced.clone();
        }
    }
}
