//! AI assessment capability. The engine never calls the model itself: handlers
//! ask an `AiAssessor` and hand whatever comes back (or nothing) to the validator.

use async_trait::async_trait;

use crate::analysis::prompts::{build_ats_review_prompt, ATS_REVIEW_SYSTEM, MAX_PROMPT_CHARS};
use crate::analysis::validator::AiResult;
use crate::llm_client::prompts::{truncate_for_prompt, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};

/// Carried in `AppState` as `Arc<dyn AiAssessor>`.
#[async_trait]
pub trait AiAssessor: Send + Sync {
    async fn assess(&self, resume_text: &str) -> Result<AiResult, LlmError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Assessment backed by the Anthropic Messages API.
pub struct LlmAiAssessor(pub LlmClient);

#[async_trait]
impl AiAssessor for LlmAiAssessor {
    async fn assess(&self, resume_text: &str) -> Result<AiResult, LlmError> {
        let excerpt = truncate_for_prompt(resume_text, MAX_PROMPT_CHARS);
        let prompt = build_ats_review_prompt(&excerpt);
        let system = format!("{ATS_REVIEW_SYSTEM} {JSON_ONLY_SYSTEM}");
        self.0.complete_json(&prompt, &system).await
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

/// Used when no API key is configured; every analysis runs rules-only.
pub struct DisabledAiAssessor;

#[async_trait]
impl AiAssessor for DisabledAiAssessor {
    async fn assess(&self, _resume_text: &str) -> Result<AiResult, LlmError> {
        Err(LlmError::Disabled)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
