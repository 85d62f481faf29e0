use std::sync::Arc;

use crate::compose::LayoutConfig;
use crate::optimizer::RequestOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: RequestOrchestrator,
    /// Page geometry and type sizes for every rendered résumé.
    pub layout: Arc<LayoutConfig>,
}

impl AppState {
    pub fn new(orchestrator: RequestOrchestrator, layout: LayoutConfig) -> Self {
        Self {
            orchestrator,
            layout: Arc::new(layout),
        }
    }
}
