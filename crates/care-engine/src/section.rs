//! Section editors bound to a case store.
//!
//! Each editor owns one section's working state and follows the shared
//! snapshot. Submits go through the coordinator as `EditSection` requests,
//! so they pass the same gate as everything else.

use crate::coordinator::ActionCoordinator;
use care_shared::{
    ActingUser, ActionKind, ActionOutcome, ActionRequest, CareError, SectionMode, SectionName,
    SectionRules, SectionState, SyncDecision,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

pub struct SectionEditor {
    coordinator: Arc<ActionCoordinator>,
    user: ActingUser,
    rules: SectionRules,
    state: Mutex<SectionState>,
}

impl SectionEditor {
    pub fn new(
        coordinator: Arc<ActionCoordinator>,
        name: SectionName,
        user: ActingUser,
        rules: SectionRules,
    ) -> Self {
        let editor = Self { coordinator, user, rules, state: Mutex::new(SectionState::new(name)) };
        editor.sync();
        editor
    }

    fn state(&self) -> MutexGuard<'_, SectionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn name(&self) -> SectionName {
        self.state().name()
    }

    /// Pull the latest snapshot into the working state.
    pub fn sync(&self) -> SyncDecision {
        let snapshot = self.coordinator.store().current();
        let mut state = self.state();
        let decision = state.sync(&snapshot, &self.user);
        if decision != SyncDecision::Unchanged {
            debug!("Section {} sync: {:?}", state.name(), decision);
        }
        decision
    }

    pub fn show_edit_control(&self) -> bool {
        self.state().show_edit_control()
    }

    pub fn mode(&self) -> SectionMode {
        self.state().mode()
    }

    pub fn is_submitting(&self) -> bool {
        self.state().is_submitting()
    }

    pub fn view(&self) -> Value {
        self.state().view().clone()
    }

    pub fn working(&self) -> Value {
        self.state().working().clone()
    }

    pub fn begin_edit(&self) -> Result<(), CareError> {
        self.sync();
        self.state().begin_edit()
    }

    pub fn set_working(&self, payload: Value) -> Result<(), CareError> {
        self.state().set_working(payload)
    }

    pub fn cancel(&self) {
        self.state().cancel();
    }

    /// Validate the working copy, submit it, and fold the result back in.
    pub async fn submit(&self) -> ActionOutcome {
        self.sync();
        let (name, payload) = {
            let mut state = self.state();
            match state.begin_submit(&self.rules) {
                Ok(payload) => (state.name(), payload),
                Err(e) => return ActionOutcome::rejected(e),
            }
        };

        let request = ActionRequest::new(
            self.coordinator.store().case_id(),
            self.user.clone(),
            ActionKind::edit_section(name, payload.clone()),
        );
        let outcome = self.coordinator.submit(request).await;

        self.state().finish_submit(outcome.is_success().then_some(payload));
        self.sync();
        outcome
    }

    /// Follow store broadcasts until the editor is dropped or the store
    /// goes away.
    pub fn spawn_sync(self: Arc<Self>) -> JoinHandle<()> {
        let mut rx = self.coordinator.store().subscribe();
        let editor = Arc::downgrade(&self);
        drop(self);
        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                match editor.upgrade() {
                    Some(editor) => {
                        editor.sync();
                    }
                    None => break,
                }
            }
        })
    }
}
