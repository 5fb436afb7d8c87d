use std::sync::Arc;

use crate::analysis::ai::AiAssessor;
use crate::analysis::config::AnalysisConfig;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable AI reviewer. `DisabledAiAssessor` when no API key is configured.
    pub ai_assessor: Arc<dyn AiAssessor>,
    pub analysis_config: Arc<AnalysisConfig>,
}
