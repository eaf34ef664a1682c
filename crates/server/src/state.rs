use prodiscovery_core::{Config, SanitizedConfig, SearchOrchestrator};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: SearchOrchestrator,
}

impl AppState {
    pub fn new(config: Config, orchestrator: SearchOrchestrator) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }
}
