// Proposal analysis: free text in, structured problem/solution/rationale out.
// All LLM calls go through llm_client. No direct vendor calls here.

pub mod handlers;
pub mod models;
pub mod prompts;

use tracing::warn;

use crate::llm_client::extract::parse_reply;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{ChatModel, LlmError};
use self::models::AnalysisResult;
use self::prompts::ANALYZE_PROMPT_TEMPLATE;

/// The model's raw reply and, when it parsed, the structured record.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub raw: String,
    pub analysis: Option<AnalysisResult>,
}

/// Sends a proposal through the analysis prompt.
pub async fn analyze_proposal(
    model: &dyn ChatModel,
    proposal_text: &str,
) -> Result<AnalysisOutcome, LlmError> {
    let prompt = ANALYZE_PROMPT_TEMPLATE.replace("{proposal_text}", proposal_text);
    let raw = model.complete(&prompt, JSON_ONLY_SYSTEM).await?;

    let analysis = parse_reply(&raw)
        .into_value()
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value::<AnalysisResult>(v).ok());
    if analysis.is_none() {
        warn!(len = raw.len(), "analysis reply did not contain a JSON object");
    }

    Ok(AnalysisOutcome { raw, analysis })
}
