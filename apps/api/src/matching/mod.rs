// Program matching: aggregate -> region filter -> LLM ranking -> recurring suggestions.
// All LLM calls go through llm_client. No direct vendor calls here.

pub mod handlers;
pub mod prompts;
pub mod ranking;

use tracing::info;

use crate::analysis::models::AnalysisResult;
use crate::llm_client::{ChatModel, LlmError};
use crate::programs::aggregator::Aggregator;
use crate::programs::recurring::{ExpectedProgram, RecurringCatalog};
use crate::programs::region::ALL_REGIONS;
use self::ranking::{rank, RankingReply, DEFAULT_MAX_CANDIDATES};

/// Inputs to one match run.
#[derive(Debug, Clone)]
pub struct MatchParams<'a> {
    pub analysis: &'a AnalysisResult,
    pub region: &'a str,
    pub keyword: Option<&'a str>,
    pub use_realtime: bool,
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Programs fetched before region filtering.
    pub total_programs: usize,
    /// Programs left after region filtering and handed to ranking.
    pub candidate_count: usize,
    pub ranking: RankingReply,
    pub expected: Vec<ExpectedProgram>,
}

/// Runs the full matching pipeline.
///
/// Upstream failures only shrink the candidate set; the only error path is
/// the ranking call itself.
pub async fn run_match(
    aggregator: &Aggregator,
    catalog: &RecurringCatalog,
    model: &dyn ChatModel,
    params: MatchParams<'_>,
) -> Result<MatchOutcome, LlmError> {
    let programs = if params.use_realtime {
        aggregator.search_all(params.keyword, ALL_REGIONS).await
    } else {
        Vec::new()
    };
    let total_programs = programs.len();

    let candidates = aggregator.regions().filter(programs, params.region);
    let candidate_count = candidates.len();

    let ranking = rank(
        model,
        params.analysis,
        &candidates,
        DEFAULT_MAX_CANDIDATES,
    )
    .await?;

    let expected = catalog.match_keywords(&params.analysis.match_terms());

    info!(
        total_programs,
        candidate_count,
        region = params.region,
        expected = expected.len(),
        "match pipeline finished"
    );

    Ok(MatchOutcome {
        total_programs,
        candidate_count,
        ranking,
        expected,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use crate::programs::aggregator::testing::{StubAdapter, StubBehavior};
    use crate::programs::models::Program;
    use crate::programs::region::RegionTable;

    fn program(name: &str, agency: &str, region: &str, url: &str) -> Program {
        Program {
            name: name.to_string(),
            agency: agency.to_string(),
            region: region.to_string(),
            url: url.to_string(),
            ..Program::default()
        }
    }

    fn aggregator() -> Aggregator {
        Aggregator::new(
            vec![
                StubAdapter::returning(
                    "a",
                    vec![
                        program("Seoul Youth Startup Fund", "", "Seoul", "http://seoul"),
                        program("Busan Youth Startup Fund", "", "Busan", "http://busan"),
                    ],
                ),
                StubAdapter::with("b", StubBehavior::Fails),
                StubAdapter::returning(
                    "c",
                    vec![program("National R&D Grant", "Ministry X", "", "http://rnd")],
                ),
            ],
            Arc::new(RegionTable::embedded().unwrap()),
        )
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            problem: "p".to_string(),
            keywords: vec!["youth".to_string(), "수출".to_string()],
            ..AnalysisResult::default()
        }
    }

    #[tokio::test]
    async fn test_pipeline_filters_ranks_and_suggests() {
        let model = ScriptedModel::replying(
            r#"Sure! [{"name": "Seoul Youth Startup Fund", "agency": "", "reason": "local", "fit_score": 91}]"#,
        );
        let catalog = RecurringCatalog::embedded().unwrap();
        let analysis = analysis();

        let outcome = run_match(
            &aggregator(),
            &catalog,
            &model,
            MatchParams {
                analysis: &analysis,
                region: "Seoul",
                keyword: None,
                use_realtime: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.total_programs, 3);
        assert_eq!(outcome.candidate_count, 2);

        let prompt = model.last_prompt();
        assert!(prompt.contains("Seoul Youth Startup Fund"));
        assert!(prompt.contains("National R&D Grant"));
        assert!(!prompt.contains("Busan Youth Startup Fund"));

        match outcome.ranking {
            RankingReply::Ranked(matches) => {
                assert_eq!(matches[0].url.as_deref(), Some("http://seoul"));
            }
            other => panic!("expected ranked reply, got {other:?}"),
        }

        assert!(!outcome.expected.is_empty());
        assert!(outcome.expected.iter().all(|e| e.score >= 80));
    }

    #[tokio::test]
    async fn test_realtime_off_skips_sources_and_model() {
        let model = ScriptedModel::replying("[]");
        let catalog = RecurringCatalog::embedded().unwrap();
        let analysis = analysis();

        let outcome = run_match(
            &aggregator(),
            &catalog,
            &model,
            MatchParams {
                analysis: &analysis,
                region: ALL_REGIONS,
                keyword: None,
                use_realtime: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.total_programs, 0);
        assert_eq!(outcome.ranking, RankingReply::Ranked(Vec::new()));
        assert!(model.prompts.lock().unwrap().is_empty());
    }
}
