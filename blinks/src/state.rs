use std::sync::Arc;

use crate::actions::ActionRegistry;
use crate::history::ClaimHistory;
use crate::pending::PendingClaims;
use crate::reclaim::Reclaimer;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub reclaimer: Arc<Reclaimer>,
    pub history: Arc<dyn ClaimHistory>,
    pub registry: Arc<ActionRegistry>,
    pub pending: Arc<PendingClaims>,
    pub base_url: String,
}

impl AppState {
    pub fn new(reclaimer: Reclaimer, history: Arc<dyn ClaimHistory>, base_url: String) -> Self {
        Self {
            reclaimer: Arc::new(reclaimer),
            history,
            registry: Arc::new(ActionRegistry::default()),
            pending: Arc::new(PendingClaims::default()),
            base_url,
        }
    }
}
