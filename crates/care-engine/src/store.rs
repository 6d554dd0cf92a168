//! Case snapshot owner.
//!
//! One store per open detail view. The snapshot lives in a watch channel:
//! merging a delta or replacing the snapshot rebroadcasts it to every
//! subscribed section and to the lifecycle controls.

use crate::backend::CaseBackend;
use care_shared::{CareError, CaseId, CaseSnapshot, SnapshotDelta};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct CaseStore {
    tx: watch::Sender<Arc<CaseSnapshot>>,
}

impl CaseStore {
    pub fn new(snapshot: CaseSnapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(snapshot));
        Self { tx }
    }

    /// Fetch the initial snapshot.
    pub async fn load(backend: &dyn CaseBackend, case_id: &CaseId) -> Result<Self, CareError> {
        let snapshot = backend.fetch_case(case_id).await.map_err(|e| {
            warn!("Failed to load case {}: {}", case_id, e);
            CareError::Transport(e.to_string())
        })?;
        info!(
            "Loaded case {} (status={}, escalated={}, msoc={})",
            snapshot.case_id,
            snapshot.status,
            snapshot.escalated,
            snapshot.is_msoc()
        );
        Ok(Self::new(snapshot))
    }

    /// Latest snapshot. Gates must be evaluated against this, never a copy
    /// taken when the action was initiated.
    pub fn current(&self) -> Arc<CaseSnapshot> {
        self.tx.borrow().clone()
    }

    pub fn case_id(&self) -> CaseId {
        self.tx.borrow().case_id.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<CaseSnapshot>> {
        self.tx.subscribe()
    }

    /// Merge a delta and rebroadcast.
    pub fn apply(&self, delta: &SnapshotDelta) -> Arc<CaseSnapshot> {
        self.tx.send_modify(|snap| {
            Arc::make_mut(snap).apply(delta);
        });
        let snap = self.current();
        debug!("Case {} now at generation {}", snap.case_id, snap.generation);
        snap
    }

    /// Replace wholesale (last writer wins).
    pub fn replace(&self, mut snapshot: CaseSnapshot) {
        self.tx.send_modify(|snap| {
            snapshot.generation = snap.generation.wrapping_add(1);
            *snap = Arc::new(snapshot);
        });
    }

    /// Re-fetch from the backend and replace.
    pub async fn refresh(&self, backend: &dyn CaseBackend) -> Result<(), CareError> {
        let case_id = self.case_id();
        let snapshot = backend
            .fetch_case(&case_id)
            .await
            .map_err(|e| CareError::Transport(e.to_string()))?;
        if snapshot.case_id != case_id {
            return Err(CareError::CaseMismatch {
                requested: case_id.to_string(),
                loaded: snapshot.case_id.to_string(),
            });
        }
        info!("Refreshed case {}", case_id);
        self.replace(snapshot);
        Ok(())
    }
}
