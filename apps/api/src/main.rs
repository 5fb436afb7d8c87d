mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::ai::{AiAssessor, DisabledAiAssessor, LlmAiAssessor};
use crate::analysis::config::AnalysisConfig;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS API v{}", env!("CARGO_PKG_VERSION"));

    let analysis_config = match &config.analysis_config_path {
        Some(path) => {
            let loaded = AnalysisConfig::from_json_file(path)?;
            info!("Loaded analysis thresholds from {}", path.display());
            loaded
        }
        None => AnalysisConfig::default(),
    };

    let ai_assessor: Arc<dyn AiAssessor> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(
                key.clone(),
                config.anthropic_model.clone(),
                Duration::from_secs(config.ai_timeout_secs),
            )?;
            info!("AI review enabled (model: {})", llm.model());
            Arc::new(LlmAiAssessor(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; analyses will be rule-based only");
            Arc::new(DisabledAiAssessor)
        }
    };

    let state = AppState {
        config: config.clone(),
        ai_assessor,
        analysis_config: Arc::new(analysis_config),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web frontend has a fixed domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
