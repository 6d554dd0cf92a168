//! Case session: one open detail view.
//!
//! Loads the snapshot once and wires the store, coordinator, notifier and
//! section editors together from an [`EngineConfig`].

use crate::backend::CaseBackend;
use crate::config::EngineConfig;
use crate::coordinator::ActionCoordinator;
use crate::notify::Notifier;
use crate::section::SectionEditor;
use crate::store::CaseStore;
use care_shared::{
    ActingUser, ActionOutcome, ActionRequest, CareError, CaseId, CaseSnapshot, Permissions,
    SectionName, SupervisorRoles, UserId,
};
use std::sync::Arc;
use tracing::info;

pub struct CaseSession {
    backend: Arc<dyn CaseBackend>,
    coordinator: Arc<ActionCoordinator>,
    supervisor_roles: SupervisorRoles,
    config: EngineConfig,
}

impl CaseSession {
    pub async fn open(
        backend: Arc<dyn CaseBackend>,
        case_id: &CaseId,
        config: EngineConfig,
    ) -> Result<Self, CareError> {
        let store = Arc::new(CaseStore::load(backend.as_ref(), case_id).await?);
        let notifier = Notifier::new(config.dismiss_after());
        let coordinator = Arc::new(ActionCoordinator::new(
            store,
            backend.clone(),
            notifier,
            config.msoc_catalog(),
        ));
        info!("Opened session for case {}", case_id);
        Ok(Self {
            backend,
            coordinator,
            supervisor_roles: config.supervisor_roles(),
            config,
        })
    }

    /// Resolve a user once; the supervisor flag is fixed from here on.
    pub fn acting_user<S: AsRef<str>>(&self, identity: impl Into<UserId>, roles: &[S]) -> ActingUser {
        ActingUser::from_roles(identity, roles, &self.supervisor_roles)
    }

    pub fn coordinator(&self) -> &Arc<ActionCoordinator> {
        &self.coordinator
    }

    pub fn notifier(&self) -> &Notifier {
        self.coordinator.notifier()
    }

    pub fn snapshot(&self) -> Arc<CaseSnapshot> {
        self.coordinator.store().current()
    }

    pub fn permissions(&self, user: &ActingUser) -> Permissions {
        self.coordinator.permissions(user)
    }

    pub async fn submit(&self, request: ActionRequest) -> ActionOutcome {
        self.coordinator.submit(request).await
    }

    /// Editor for one section, using the configured field rules.
    pub fn section(&self, name: SectionName, user: ActingUser) -> Arc<SectionEditor> {
        Arc::new(SectionEditor::new(
            self.coordinator.clone(),
            name,
            user,
            self.config.section_rules(name),
        ))
    }

    pub async fn refresh(&self) -> Result<(), CareError> {
        self.coordinator.store().refresh(self.backend.as_ref()).await
    }
}
