//! Care coordination case engine.
//!
//! Async orchestration over the pure rules in `care-shared`: snapshot
//! ownership and broadcast, the action coordinator, auto-dismissing
//! notifications, section editors and configuration.

pub mod backend;
pub mod config;
pub mod coordinator;
pub mod fake;
pub mod logging;
pub mod notify;
pub mod section;
pub mod session;
pub mod store;

pub use backend::{CaseBackend, MutationCall, MutationReply, TransportError};
pub use config::EngineConfig;
pub use coordinator::ActionCoordinator;
pub use notify::Notifier;
pub use section::SectionEditor;
pub use session::CaseSession;
pub use store::CaseStore;
