//! Ranking Gateway: asks the LLM to pick and score candidate programs.
//!
//! The reply is recovered with the bracket scanner in `llm_client::extract`.
//! A reply that does not parse is a normal outcome and is returned as
//! `RankingReply::Unparseable` with the raw text. After a successful parse,
//! `url` and `period` are copied from the candidate whose name overlaps the
//! ranked name, since the model is not trusted to reproduce them.

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::analysis::models::AnalysisResult;
use crate::llm_client::extract::{parse_reply, JsonReply};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM};
use crate::llm_client::{ChatModel, LlmError};
use crate::matching::prompts::RANKING_PROMPT_TEMPLATE;
use crate::programs::models::Program;

/// Candidates beyond this many are not shown to the model.
pub const DEFAULT_MAX_CANDIDATES: usize = 50;

/// Object keys under which a model may nest its list of matches.
const NESTED_LIST_KEYS: [&str; 4] = ["matches", "recommendations", "programs", "results"];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMatch {
    pub name: String,
    pub agency: String,
    pub reason: String,
    /// Model-defined scale; not normalised.
    pub fit_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

impl RankedMatch {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |keys: &[&str]| -> String {
            keys.iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        let optional = |key: &str| -> Option<String> {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .filter(|s| !s.is_empty())
        };
        let fit_score = ["fit_score", "fitScore", "score"]
            .iter()
            .find_map(|k| obj.get(*k))
            .and_then(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            })
            .unwrap_or(0.0);

        Some(Self {
            name: text(&["name", "program_name"]),
            agency: text(&["agency"]),
            reason: text(&["reason", "recommendation_reason"]),
            fit_score,
            url: optional("url"),
            period: optional("period"),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RankingReply {
    Ranked(Vec<RankedMatch>),
    Unparseable { raw: String },
}

/// Wire shape of a ranking outcome.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResult {
    pub parsed: bool,
    pub matches: Vec<RankedMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_reply: Option<String>,
}

impl From<RankingReply> for RankingResult {
    fn from(reply: RankingReply) -> Self {
        match reply {
            RankingReply::Ranked(matches) => Self {
                parsed: true,
                matches,
                raw_reply: None,
            },
            RankingReply::Unparseable { raw } => Self {
                parsed: false,
                matches: Vec::new(),
                raw_reply: Some(raw),
            },
        }
    }
}

/// Ranks `candidates` against `analysis` with one LLM call.
///
/// Only the first `max_candidates` are shown to the model; backfill scans
/// all of them. An empty candidate set skips the call.
pub async fn rank(
    model: &dyn ChatModel,
    analysis: &AnalysisResult,
    candidates: &[Program],
    max_candidates: usize,
) -> Result<RankingReply, LlmError> {
    if candidates.is_empty() {
        return Ok(RankingReply::Ranked(Vec::new()));
    }

    let shown = &candidates[..candidates.len().min(max_candidates)];
    let prompt = build_ranking_prompt(analysis, shown);
    let reply = model.complete(&prompt, JSON_ONLY_SYSTEM).await?;

    Ok(interpret_reply(&reply, candidates))
}

/// Parses a ranking reply and backfills links from the candidates.
pub fn interpret_reply(reply: &str, candidates: &[Program]) -> RankingReply {
    match parse_reply(reply) {
        JsonReply::Parsed(value) => {
            let mut matches = matches_from_value(&value);
            backfill(&mut matches, candidates);
            RankingReply::Ranked(matches)
        }
        JsonReply::Unparseable { raw } => {
            warn!(len = raw.len(), "ranking reply contained no parseable JSON");
            RankingReply::Unparseable { raw }
        }
    }
}

fn matches_from_value(value: &Value) -> Vec<RankedMatch> {
    match value {
        Value::Array(items) => items.iter().filter_map(RankedMatch::from_value).collect(),
        Value::Object(obj) => match NESTED_LIST_KEYS
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_array))
        {
            Some(items) => items.iter().filter_map(RankedMatch::from_value).collect(),
            None if obj.contains_key("name") => {
                RankedMatch::from_value(value).into_iter().collect()
            }
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Copies `url` and `period` from the first candidate whose name contains
/// the ranked name. Only when none does, falls back to the first candidate
/// whose name is contained in the ranked name.
pub fn backfill(matches: &mut [RankedMatch], candidates: &[Program]) {
    for ranked in matches.iter_mut().filter(|m| !m.name.is_empty()) {
        let named = candidates.iter().filter(|p| !p.name.is_empty());
        let source = named
            .clone()
            .find(|p| p.name.contains(ranked.name.as_str()))
            .or_else(|| named.clone().find(|p| ranked.name.contains(p.name.as_str())));
        if let Some(program) = source {
            ranked.url = Some(program.url.clone());
            ranked.period = Some(program.period.clone());
        }
    }
}

fn build_ranking_prompt(analysis: &AnalysisResult, candidates: &[Program]) -> String {
    let programs = candidates
        .iter()
        .map(|p| {
            format!(
                "- {} | {} | {} | {} | {}",
                p.name, p.agency, p.target, p.region, p.period
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let keywords = analysis.keywords.join(", ");
    fill_template(
        RANKING_PROMPT_TEMPLATE,
        &[
            ("problem", analysis.problem.as_str()),
            ("solution", analysis.solution.as_str()),
            ("rationale", analysis.rationale.as_str()),
            ("keywords", keywords.as_str()),
            ("category", analysis.category.as_deref().unwrap_or("-")),
            ("programs", programs.as_str()),
        ],
    )
}
