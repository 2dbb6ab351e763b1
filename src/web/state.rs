//! # Web API Application State

use std::sync::Arc;

use crate::bootstrap::AnalystSystem;
use crate::database::TableBrowser;
use crate::orchestration::WorkflowOrchestrator;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    system: Arc<AnalystSystem>,
}

impl AppState {
    pub fn new(system: Arc<AnalystSystem>) -> Self {
        Self { system }
    }

    pub fn system(&self) -> &AnalystSystem {
        &self.system
    }

    pub fn orchestrator(&self) -> &WorkflowOrchestrator {
        self.system.orchestrator()
    }

    pub fn browser(&self) -> &TableBrowser {
        self.system.browser()
    }
}
