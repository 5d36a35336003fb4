use std::sync::Arc;

use pethelp_engine::Engine;
use pethelp_store::ConversationStore;

/// Shared application state accessible from all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub store: Arc<dyn ConversationStore>,
}
