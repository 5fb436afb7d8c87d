//! Axum route handlers for the Analysis API.

use std::time::Duration;

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analysis::parseability::{analyze_document, ParseabilityResult};
use crate::analysis::validator::{validate, AiResult, FinalAnalysis};
use crate::errors::AppError;
use crate::extraction::{
    extract_text, resolve_mime, KnownPageCount, NoPageCount, PdfPageCounter, MIME_PDF, MIME_TEXT,
};
use crate::llm_client::LlmError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
    pub mime_type: Option<String>,
    pub page_count: Option<usize>,
    #[serde(default)]
    pub skip_ai: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub file_name: Option<String>,
    pub mime_type: String,
    pub parseability: ParseabilityResult,
    pub analysis: FinalAnalysis,
}

struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
/// Multipart upload: `file` (PDF or plain text) and optional `skip_ai`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, AppError> {
    let mut upload = None;
    let mut skip_ai = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("skip_ai") => {
                let raw = field.text().await.map_err(multipart_error)?;
                skip_ai = parse_flag(&raw);
            }
            _ => {}
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if upload.bytes.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "File is {} bytes; the limit is {} bytes",
            upload.bytes.len(),
            state.config.max_upload_bytes
        )));
    }

    let mime_type = resolve_mime(upload.content_type.as_deref(), upload.file_name.as_deref());
    info!(
        "Analyzing upload {:?} ({mime_type}, {} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    let config = state.analysis_config.clone();
    let mime = mime_type.clone();
    let bytes = upload.bytes;
    let (text, parseability) = tokio::task::spawn_blocking(move || {
        let text = extract_text(&bytes, &mime)?;
        let result = if mime == MIME_PDF {
            analyze_document(&text, &mime, &PdfPageCounter::new(&bytes), &config)
        } else {
            analyze_document(&text, &mime, &NoPageCount, &config)
        };
        Ok::<_, AppError>((text, result))
    })
    .await
    .context("Analysis task failed")??;

    let response = finish(&state, upload.file_name, mime_type, &text, parseability, skip_ai).await;
    Ok(Json(response))
}

/// POST /api/v1/analyze/text
/// For callers that already hold extracted text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalysisResponse>, AppError> {
    if request.text.len() > state.config.max_upload_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Text is {} bytes; the limit is {} bytes",
            request.text.len(),
            state.config.max_upload_bytes
        )));
    }
    let mime_type = request
        .mime_type
        .as_deref()
        .map(|m| resolve_mime(Some(m), None))
        .unwrap_or_else(|| MIME_TEXT.to_string());

    let config = state.analysis_config.clone();
    let mime = mime_type.clone();
    let page_count = request.page_count;
    let text = request.text;
    let (text, parseability) = tokio::task::spawn_blocking(move || {
        let result = match page_count {
            Some(pages) => analyze_document(&text, &mime, &KnownPageCount(pages), &config),
            None => analyze_document(&text, &mime, &NoPageCount, &config),
        };
        (text, result)
    })
    .await
    .context("Analysis task failed")?;

    let response = finish(&state, None, mime_type, &text, parseability, request.skip_ai).await;
    Ok(Json(response))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn finish(
    state: &AppState,
    file_name: Option<String>,
    mime_type: String,
    text: &str,
    parseability: ParseabilityResult,
    skip_ai: bool,
) -> AnalysisResponse {
    let ai = if skip_ai || parseability.details.length.word_count == 0 {
        None
    } else {
        assess(state, text).await
    };

    let analysis = validate(&parseability, ai.as_ref(), &state.analysis_config.validator);
    let analysis_id = Uuid::new_v4();

    info!(
        "Analysis {analysis_id}: parseability={} overall={} confidence={:?} critical={} ai={}",
        parseability.score,
        analysis.overall_score,
        analysis.confidence,
        analysis.critical_issues.len(),
        !analysis.ai_unavailable,
    );

    AnalysisResponse {
        analysis_id,
        analyzed_at: Utc::now(),
        file_name,
        mime_type,
        parseability,
        analysis,
    }
}

/// Asks the configured assessor, bounded by the AI timeout. Any failure means
/// "no AI result"; the analysis continues rules-only.
async fn assess(state: &AppState, text: &str) -> Option<AiResult> {
    let limit = Duration::from_secs(state.config.ai_timeout_secs);
    let outcome = tokio::time::timeout(limit, state.ai_assessor.assess(text))
        .await
        .unwrap_or(Err(LlmError::Timeout(limit)));

    match outcome {
        Ok(result) => Some(result),
        Err(LlmError::Disabled) => {
            debug!("AI assessment disabled, scoring with rules only");
            None
        }
        Err(e) => {
            warn!(
                "AI assessment via {} failed, scoring with rules only: {e}",
                state.ai_assessor.name()
            );
            None
        }
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
