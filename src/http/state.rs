use crate::session::SessionManager;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state for HTTP handlers.
///
/// The manager sits behind a single mutex: every session and store mutation
/// is serialized, which is the single-writer discipline the persisted store
/// requires.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<Mutex<SessionManager>>,
}

impl AppState {
    pub fn new(manager: SessionManager) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
        }
    }
}
