//! Axum route handlers for proposal analysis.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::analyze_proposal;
use crate::analysis::models::AnalysisResult;
use crate::errors::AppError;
use crate::state::{AppState, LlmGrant};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Caller's LLM credential. Ignored by the demo endpoint.
    #[serde(default, alias = "apiKey")]
    pub credential: String,
    #[serde(default)]
    pub proposal_text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    /// The model's reply, verbatim.
    pub result: String,
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_quota: Option<u32>,
}

/// POST /analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    validate(&request)?;
    let grant = state.caller_llm(&request.credential)?;
    analyze_with(grant, &request.proposal_text).await
}

/// POST /demo/analyze
pub async fn handle_demo_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    validate(&request)?;
    let grant = state.demo_llm()?;
    analyze_with(grant, &request.proposal_text).await
}

fn validate(request: &AnalyzeRequest) -> Result<(), AppError> {
    if request.proposal_text.trim().is_empty() {
        return Err(AppError::Validation(
            "proposalText cannot be empty".to_string(),
        ));
    }
    Ok(())
}

async fn analyze_with(grant: LlmGrant, proposal_text: &str) -> Result<Json<AnalyzeResponse>, AppError> {
    let outcome = analyze_proposal(&grant.client, proposal_text).await?;
    Ok(Json(AnalyzeResponse {
        success: true,
        result: outcome.raw,
        analysis: outcome.analysis,
        remaining_quota: grant.remaining_quota,
    }))
}
