// Document drafting: application proposals and pitch-deck outlines.
// All LLM calls go through llm_client. No direct vendor calls here.

pub mod handlers;
pub mod prompts;

use serde::Deserialize;
use serde_json::Value;

use self::prompts::{PROPOSAL_PROMPT_TEMPLATE, SLIDES_PROMPT_TEMPLATE};
use crate::analysis::models::AnalysisResult;
use crate::llm_client::extract::parse_reply;
use crate::llm_client::prompts::{fill_template, DRAFTING_SYSTEM, JSON_ONLY_SYSTEM};
use crate::llm_client::{ChatModel, LlmError};

pub const DEFAULT_SLIDE_COUNT: u32 = 8;
const MAX_SLIDE_COUNT: u32 = 20;

/// The program a proposal is written for. Both fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProgramRef {
    pub name: String,
    pub agency: String,
}

impl ProgramRef {
    fn describe(&self) -> String {
        match (self.name.trim(), self.agency.trim()) {
            ("", "") => "(not specified; write a general-purpose application)".to_string(),
            (name, "") => name.to_string(),
            ("", agency) => format!("a program run by {agency}"),
            (name, agency) => format!("{name} ({agency})"),
        }
    }
}

/// Drafts a proposal. The reply is returned as prose.
pub async fn draft_proposal(
    model: &dyn ChatModel,
    analysis: &AnalysisResult,
    program: &ProgramRef,
) -> Result<String, LlmError> {
    let target = program.describe();
    let keywords = analysis.keywords.join(", ");
    let prompt = fill_template(
        PROPOSAL_PROMPT_TEMPLATE,
        &[
            ("program", target.as_str()),
            ("problem", analysis.problem.as_str()),
            ("solution", analysis.solution.as_str()),
            ("rationale", analysis.rationale.as_str()),
            ("keywords", keywords.as_str()),
        ],
    );
    model.complete(&prompt, DRAFTING_SYSTEM).await
}

/// Asks for a slide outline; returns the raw reply and the parsed outline.
pub async fn outline_slides(
    model: &dyn ChatModel,
    proposal: &str,
    slide_count: u32,
) -> Result<(String, Option<Value>), LlmError> {
    let slide_count = slide_count.clamp(1, MAX_SLIDE_COUNT).to_string();
    let prompt = fill_template(
        SLIDES_PROMPT_TEMPLATE,
        &[("slide_count", slide_count.as_str()), ("proposal", proposal)],
    );
    let raw = model.complete(&prompt, JSON_ONLY_SYSTEM).await?;
    let outline = parse_reply(&raw).into_value();
    Ok((raw, outline))
}
