//! Axum route handlers for proposal and slide generation.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::models::AnalysisResult;
use crate::documents::{draft_proposal, outline_slides, ProgramRef, DEFAULT_SLIDE_COUNT};
use crate::errors::AppError;
use crate::state::{AppState, LlmGrant};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalRequest {
    #[serde(default, alias = "apiKey")]
    pub credential: String,
    #[serde(default, alias = "n2bAnalysis")]
    pub analysis: AnalysisResult,
    #[serde(default)]
    pub program: ProgramRef,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub success: bool,
    pub result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_quota: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidesRequest {
    #[serde(default, alias = "apiKey")]
    pub credential: String,
    #[serde(default)]
    pub proposal_text: String,
    #[serde(default)]
    pub slide_count: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidesResponse {
    pub success: bool,
    pub result: String,
    /// Parsed outline, when the reply contained valid JSON.
    pub slides: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_quota: Option<u32>,
}

/// POST /proposal
pub async fn handle_proposal(
    State(state): State<AppState>,
    Json(request): Json<ProposalRequest>,
) -> Result<Json<ProposalResponse>, AppError> {
    validate_proposal(&request)?;
    let grant = state.caller_llm(&request.credential)?;
    proposal_with(grant, &request).await
}

/// POST /demo/proposal
pub async fn handle_demo_proposal(
    State(state): State<AppState>,
    Json(request): Json<ProposalRequest>,
) -> Result<Json<ProposalResponse>, AppError> {
    validate_proposal(&request)?;
    let grant = state.demo_llm()?;
    proposal_with(grant, &request).await
}

/// POST /slides
pub async fn handle_slides(
    State(state): State<AppState>,
    Json(request): Json<SlidesRequest>,
) -> Result<Json<SlidesResponse>, AppError> {
    validate_slides(&request)?;
    let grant = state.caller_llm(&request.credential)?;
    slides_with(grant, &request).await
}

/// POST /demo/slides
pub async fn handle_demo_slides(
    State(state): State<AppState>,
    Json(request): Json<SlidesRequest>,
) -> Result<Json<SlidesResponse>, AppError> {
    validate_slides(&request)?;
    let grant = state.demo_llm()?;
    slides_with(grant, &request).await
}

fn validate_proposal(request: &ProposalRequest) -> Result<(), AppError> {
    let a = &request.analysis;
    if a.problem.trim().is_empty() && a.solution.trim().is_empty() {
        return Err(AppError::Validation(
            "analysis must contain a problem or a solution".to_string(),
        ));
    }
    Ok(())
}

fn validate_slides(request: &SlidesRequest) -> Result<(), AppError> {
    if request.proposal_text.trim().is_empty() {
        return Err(AppError::Validation(
            "proposalText cannot be empty".to_string(),
        ));
    }
    Ok(())
}

async fn proposal_with(
    grant: LlmGrant,
    request: &ProposalRequest,
) -> Result<Json<ProposalResponse>, AppError> {
    let draft = draft_proposal(&grant.client, &request.analysis, &request.program).await?;
    Ok(Json(ProposalResponse {
        success: true,
        result: draft,
        remaining_quota: grant.remaining_quota,
    }))
}

async fn slides_with(
    grant: LlmGrant,
    request: &SlidesRequest,
) -> Result<Json<SlidesResponse>, AppError> {
    let slide_count = request.slide_count.unwrap_or(DEFAULT_SLIDE_COUNT);
    let (raw, slides) = outline_slides(&grant.client, &request.proposal_text, slide_count).await?;
    Ok(Json(SlidesResponse {
        success: true,
        result: raw,
        slides,
        remaining_quota: grant.remaining_quota,
    }))
}
