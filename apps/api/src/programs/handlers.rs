//! Axum route handlers for the program listing API.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::programs::models::{FetchQuery, Program};
use crate::programs::recurring::{split_keywords, ExpectedProgram};
use crate::programs::region::ALL_REGIONS;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceQuery {
    pub keyword: Option<String>,
    pub page: Option<u32>,
    #[serde(alias = "count")]
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct AllQuery {
    pub keyword: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectedQuery {
    #[serde(default)]
    pub keywords: String,
}

#[derive(Debug, Serialize)]
pub struct SourceProgramsResponse {
    pub source: &'static str,
    pub count: usize,
    pub programs: Vec<Program>,
}

#[derive(Debug, Serialize)]
pub struct AllProgramsResponse {
    pub count: usize,
    pub region: String,
    pub programs: Vec<Program>,
}

#[derive(Debug, Serialize)]
pub struct ExpectedProgramsResponse {
    pub count: usize,
    pub programs: Vec<ExpectedProgram>,
}

/// GET /api/programs/:source
///
/// Queries one adapter directly. Upstream failures yield an empty list.
pub async fn handle_source_programs(
    State(state): State<AppState>,
    Path(source): Path<String>,
    Query(params): Query<SourceQuery>,
) -> Result<Json<SourceProgramsResponse>, AppError> {
    let adapter = state
        .aggregator
        .adapter(&source)
        .ok_or_else(|| AppError::NotFound(format!("Unknown program source '{source}'")))?;

    let defaults = FetchQuery::search(params.keyword.as_deref());
    let query = FetchQuery {
        page: params.page.filter(|p| *p > 0).unwrap_or(defaults.page),
        per_page: params
            .per_page
            .filter(|n| *n > 0)
            .unwrap_or(defaults.per_page),
        ..defaults
    };
    let programs = adapter.fetch(&query).await;

    Ok(Json(SourceProgramsResponse {
        source: adapter.label(),
        count: programs.len(),
        programs,
    }))
}

/// GET /api/programs/all
pub async fn handle_all_programs(
    State(state): State<AppState>,
    Query(params): Query<AllQuery>,
) -> Json<AllProgramsResponse> {
    let region = params
        .region
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| ALL_REGIONS.to_string());

    let programs = state
        .aggregator
        .search_all(params.keyword.as_deref(), &region)
        .await;

    Json(AllProgramsResponse {
        count: programs.len(),
        region,
        programs,
    })
}

/// GET /api/programs/expected
pub async fn handle_expected_programs(
    State(state): State<AppState>,
    Query(params): Query<ExpectedQuery>,
) -> Json<ExpectedProgramsResponse> {
    let programs = state.catalog.match_keywords(&split_keywords(&params.keywords));
    Json(ExpectedProgramsResponse {
        count: programs.len(),
        programs,
    })
}
