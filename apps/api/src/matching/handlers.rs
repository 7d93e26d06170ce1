//! Axum route handlers for program matching.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::models::AnalysisResult;
use crate::errors::AppError;
use crate::matching::ranking::RankingResult;
use crate::matching::{run_match, MatchParams};
use crate::programs::recurring::ExpectedProgram;
use crate::programs::region::ALL_REGIONS;
use crate::state::{AppState, LlmGrant};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    /// Caller's LLM credential. Ignored by the demo endpoint.
    #[serde(default, alias = "apiKey")]
    pub credential: String,
    #[serde(default, alias = "n2bAnalysis")]
    pub analysis: AnalysisResult,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_use_realtime")]
    pub use_realtime: bool,
    /// Optional upstream search keyword.
    #[serde(default)]
    pub keyword: Option<String>,
}

fn default_region() -> String {
    ALL_REGIONS.to_string()
}

fn default_use_realtime() -> bool {
    true
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub success: bool,
    pub total_programs: usize,
    pub candidate_count: usize,
    pub region: String,
    pub result: RankingResult,
    pub expected_programs: Vec<ExpectedProgram>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_quota: Option<u32>,
}

/// POST /match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    validate(&request)?;
    let grant = state.caller_llm(&request.credential)?;
    match_with(&state, grant, request).await
}

/// POST /demo/match
pub async fn handle_demo_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResponse>, AppError> {
    validate(&request)?;
    let grant = state.demo_llm()?;
    match_with(&state, grant, request).await
}

fn validate(request: &MatchRequest) -> Result<(), AppError> {
    let a = &request.analysis;
    if a.problem.trim().is_empty()
        && a.solution.trim().is_empty()
        && a.rationale.trim().is_empty()
        && a.keywords.is_empty()
    {
        return Err(AppError::Validation(
            "analysis must contain at least one of problem, solution, rationale or keywords"
                .to_string(),
        ));
    }
    Ok(())
}

async fn match_with(
    state: &AppState,
    grant: LlmGrant,
    request: MatchRequest,
) -> Result<Json<MatchResponse>, AppError> {
    let outcome = run_match(
        &state.aggregator,
        &state.catalog,
        &grant.client,
        MatchParams {
            analysis: &request.analysis,
            region: &request.region,
            keyword: request.keyword.as_deref(),
            use_realtime: request.use_realtime,
        },
    )
    .await?;

    Ok(Json(MatchResponse {
        success: true,
        total_programs: outcome.total_programs,
        candidate_count: outcome.candidate_count,
        region: request.region,
        result: outcome.ranking.into(),
        expected_programs: outcome.expected,
        remaining_quota: grant.remaining_quota,
    }))
}
