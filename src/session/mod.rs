//! Session management
//!
//! A session is a named, independently stored unit of one patient-dialog
//! capture-and-analysis workflow. This module provides:
//! - `SessionStore`: the persisted session metadata collection
//! - `Workspace`: the per-session artifact directory convention
//! - `SessionManager`: the single serialized owner of the whole pipeline

mod manager;
mod store;
mod workspace;

pub use manager::{SessionManager, SessionView, StopOutcome};
pub use store::{SessionRecord, SessionStore};
pub use workspace::Workspace;
