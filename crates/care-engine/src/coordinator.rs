//! Action coordinator.
//!
//! `submit` runs one request through a fixed pipeline:
//! 1. Gate - authorization against the *latest* snapshot
//! 2. Validate - reason / assignee input
//! 3. Mutate - exactly one remote call
//! 4. Merge - apply the delta and rebroadcast (success only)
//! 5. Notify - success and failure outcomes
//!
//! Steps 1 and 2 never touch the backend. A failed outcome carries no
//! delta, so the snapshot is never left half-updated.

use crate::backend::{CaseBackend, MutationCall, TransportError};
use crate::notify::Notifier;
use crate::store::CaseStore;
use care_shared::{
    can_edit_case, ActingUser, ActionClass, ActionKind, ActionOutcome, ActionRequest, CareError,
    CaseSnapshot, MsocReasonCatalog, Notification, Permissions, SnapshotDelta,
    UNKNOWN_ERROR_MESSAGE,
};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub struct ActionCoordinator {
    store: Arc<CaseStore>,
    backend: Arc<dyn CaseBackend>,
    notifier: Notifier,
    catalog: MsocReasonCatalog,
    in_flight: Mutex<HashSet<ActionClass>>,
}

/// Releases an in-flight slot when the call finishes, however it ends.
struct SlotGuard<'a> {
    slots: &'a Mutex<HashSet<ActionClass>>,
    class: ActionClass,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.remove(&self.class);
    }
}

impl ActionCoordinator {
    pub fn new(
        store: Arc<CaseStore>,
        backend: Arc<dyn CaseBackend>,
        notifier: Notifier,
        catalog: MsocReasonCatalog,
    ) -> Self {
        Self { store, backend, notifier, catalog, in_flight: Mutex::new(HashSet::new()) }
    }

    pub fn store(&self) -> &Arc<CaseStore> {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn catalog(&self) -> &MsocReasonCatalog {
        &self.catalog
    }

    /// Every gate for `user` against the latest snapshot.
    pub fn permissions(&self, user: &ActingUser) -> Permissions {
        Permissions::evaluate(&self.store.current(), user)
    }

    /// Whether the affordance for `class` is currently waiting on the backend.
    pub fn is_in_flight(&self, class: ActionClass) -> bool {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).contains(&class)
    }

    fn claim(&self, class: ActionClass) -> Option<SlotGuard<'_>> {
        let mut slots = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if slots.insert(class) {
            Some(SlotGuard { slots: &self.in_flight, class })
        } else {
            None
        }
    }

    /// Gate then validate. Produces the normalized request and the delta it
    /// will commit on success.
    fn prepare(
        &self,
        snapshot: &CaseSnapshot,
        request: &ActionRequest,
    ) -> Result<(ActionRequest, SnapshotDelta), CareError> {
        if request.case_id != snapshot.case_id {
            return Err(CareError::CaseMismatch {
                requested: request.case_id.to_string(),
                loaded: snapshot.case_id.to_string(),
            });
        }
        match &request.kind {
            ActionKind::Lifecycle { transition } => {
                let (normalized, delta) =
                    transition.plan(snapshot, &request.actor, &self.catalog, Utc::now())?;
                let request = ActionRequest {
                    kind: ActionKind::Lifecycle { transition: normalized },
                    ..request.clone()
                };
                Ok((request, delta))
            }
            ActionKind::EditSection { section, payload } => {
                if !can_edit_case(snapshot, &request.actor) {
                    return Err(CareError::NotPermitted);
                }
                Ok((request.clone(), SnapshotDelta::section(*section, payload.clone())))
            }
        }
    }

    /// `Submit(actionRequest) -> ActionOutcome`
    pub async fn submit(&self, request: ActionRequest) -> ActionOutcome {
        let class = request.kind.class();
        let snapshot = self.store.current();

        let (request, delta) = match self.prepare(&snapshot, &request) {
            Ok(prepared) => prepared,
            Err(e) => {
                debug!("Rejected {} on case {} for {}: {}", class, request.case_id, request.actor.identity, e);
                return ActionOutcome::rejected(e);
            }
        };

        let _slot = match self.claim(class) {
            Some(slot) => slot,
            None => {
                debug!("{} already in flight on case {}", class, request.case_id);
                return ActionOutcome::rejected(CareError::InFlight(class.to_string()));
            }
        };

        let call = MutationCall::for_request(&request);
        info!("Submitting {} on case {} as {}", class, request.case_id, request.actor.identity);
        let result = self.backend.mutate(&call).await;

        let outcome = match result {
            Ok(reply) if reply.success => {
                let snap = self.store.apply(&delta);
                info!("{} on case {} succeeded (generation {})", class, snap.case_id, snap.generation);
                ActionOutcome::success(delta, request.kind.success_message())
            }
            Ok(reply) => {
                warn!(
                    "{} on case {} refused by backend: {}",
                    class,
                    request.case_id,
                    reply.error.as_deref().unwrap_or("no detail")
                );
                ActionOutcome::failed(request.kind.failure_message())
            }
            Err(e) => {
                warn!("{} on case {} transport failure: {}", class, request.case_id, e);
                ActionOutcome::failed(transport_message(&e, &request.kind))
            }
        };

        if let Some(notification) = Notification::from_outcome(&outcome) {
            self.notifier.show(notification);
        }
        outcome
    }
}

/// Single displayable string for a transport failure.
fn transport_message(err: &TransportError, kind: &ActionKind) -> String {
    if err.is_no_response() {
        return kind.failure_message();
    }
    err.displayable_message()
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
}
