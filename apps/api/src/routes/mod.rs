pub mod health;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::analysis::handlers as analysis;
use crate::documents::handlers as documents;
use crate::matching::handlers as matching;
use crate::programs::handlers as programs;
use crate::state::AppState;

/// Builds the full router. Every response carries permissive CORS headers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Program listings
        .route("/api/programs/all", get(programs::handle_all_programs))
        .route(
            "/api/programs/expected",
            get(programs::handle_expected_programs),
        )
        .route(
            "/api/programs/:source",
            get(programs::handle_source_programs),
        )
        // Caller-credential endpoints
        .route("/analyze", post(analysis::handle_analyze))
        .route("/match", post(matching::handle_match))
        .route("/proposal", post(documents::handle_proposal))
        .route("/slides", post(documents::handle_slides))
        // Demo endpoints (server credential, daily quota)
        .route("/demo/analyze", post(analysis::handle_demo_analyze))
        .route("/demo/match", post(matching::handle_demo_match))
        .route("/demo/proposal", post(documents::handle_demo_proposal))
        .route("/demo/slides", post(documents::handle_demo_slides))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
        routing::post,
        Json,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt as _; // for `oneshot`

    use super::*;
    use crate::config::Config;
    use crate::programs::aggregator::testing::{StubAdapter, StubBehavior};
    use crate::programs::models::Program;
    use crate::programs::sources::SourceAdapter;
    use crate::test_support::spawn_upstream;

    const BODY_LIMIT: usize = 1024 * 1024;

    fn program(name: &str, agency: &str, region: &str, url: &str, period: &str) -> Program {
        Program {
            id: name.to_string(),
            name: name.to_string(),
            agency: agency.to_string(),
            region: region.to_string(),
            url: url.to_string(),
            period: period.to_string(),
            source: "stub".to_string(),
            ..Program::default()
        }
    }

    fn adapters() -> Vec<Arc<dyn SourceAdapter>> {
        vec![
            StubAdapter::returning(
                "bizinfo",
                vec![
                    program("Seoul Youth Startup Fund", "", "Seoul", "http://seoul", "2025-03"),
                    program("Busan Youth Startup Fund", "", "Busan", "http://busan", "2025-04"),
                ],
            ),
            StubAdapter::returning(
                "kstartup",
                vec![program("National R&D Grant", "Ministry X", "", "http://rnd", "2025-05")],
            ),
            StubAdapter::with("broken", StubBehavior::Fails),
        ]
    }

    /// Fake Messages API that always answers with `reply`.
    async fn fake_llm(reply: &'static str) -> String {
        let router = Router::new().route(
            "/v1/messages",
            post(move || async move {
                Json(json!({
                    "content": [{"type": "text", "text": reply}],
                    "usage": {"input_tokens": 10, "output_tokens": 5}
                }))
            }),
        );
        format!("{}/v1/messages", spawn_upstream(router).await)
    }

    fn router_with(config: Config) -> Router {
        build_router(AppState::for_tests(config, adapters()))
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.oneshot(req).await.expect("oneshot");
        let status = resp.status();
        let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
            .await
            .expect("read body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("build GET")
    }

    fn post_json(uri: &str, payload: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("build POST")
    }

    #[tokio::test]
    async fn test_health_reports_sources_and_quota() {
        let (status, body) = send(router_with(Config::for_tests()), get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["apis"]["bizinfo"], "connected");
        assert_eq!(body["apis"]["broken"], "error");
        assert_eq!(body["demo"]["enabled"], false);
        assert_eq!(body["demo"]["remaining"], 100);
    }

    #[tokio::test]
    async fn test_all_programs_region_filtered() {
        let (status, body) = send(
            router_with(Config::for_tests()),
            get_req("/api/programs/all?region=Seoul"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["region"], "Seoul");
        assert_eq!(body["programs"][0]["name"], "Seoul Youth Startup Fund");
        assert_eq!(body["programs"][1]["name"], "National R&D Grant");
    }

    #[tokio::test]
    async fn test_all_programs_defaults_to_all() {
        let (_, body) = send(router_with(Config::for_tests()), get_req("/api/programs/all")).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["region"], "all");
    }

    #[tokio::test]
    async fn test_single_source_and_unknown_source() {
        let (status, body) = send(
            router_with(Config::for_tests()),
            get_req("/api/programs/kstartup?page=1&perPage=5"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "kstartup");
        assert_eq!(body["count"], 1);

        let (status, body) = send(
            router_with(Config::for_tests()),
            get_req("/api/programs/nope"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_expected_programs_from_comma_list() {
        let (status, body) = send(
            router_with(Config::for_tests()),
            get_req("/api/programs/expected?keywords=%EC%88%98%EC%B6%9C,AI"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let count = body["count"].as_u64().unwrap();
        assert!(count >= 2 && count <= 5);
        assert!(body["programs"][0]["score"].as_u64().unwrap() >= 80);
    }

    #[tokio::test]
    async fn test_analyze_requires_credential() {
        let (status, body) = send(
            router_with(Config::for_tests()),
            post_json("/analyze", json!({"proposalText": "we build robots"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_returns_raw_and_parsed() {
        let config = Config {
            llm_api_url: fake_llm(r#"{"problem": "p", "solution": "s", "rationale": "r", "keywords": ["AI"]}"#).await,
            ..Config::for_tests()
        };
        let (status, body) = send(
            router_with(config),
            post_json(
                "/analyze",
                json!({"apiKey": "sk-caller", "proposalText": "we build robots"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["analysis"]["problem"], "p");
        assert!(body.get("remainingQuota").is_none());
    }

    #[tokio::test]
    async fn test_match_end_to_end() {
        let config = Config {
            llm_api_url: fake_llm(
                r#"Recommendations: [{"name": "Seoul Youth Startup", "agency": "", "reason": "local fit", "fit_score": 92}] done"#,
            )
            .await,
            ..Config::for_tests()
        };
        let (status, body) = send(
            router_with(config),
            post_json(
                "/match",
                json!({
                    "credential": "sk-caller",
                    "n2bAnalysis": {"not": "p", "but": "s", "because": "r", "keywords": ["youth"]},
                    "region": "Seoul"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["totalPrograms"], 3);
        assert_eq!(body["candidateCount"], 2);
        assert_eq!(body["region"], "Seoul");
        assert_eq!(body["result"]["parsed"], true);
        let top = &body["result"]["matches"][0];
        assert_eq!(top["name"], "Seoul Youth Startup");
        assert_eq!(top["url"], "http://seoul");
        assert_eq!(top["period"], "2025-03");
        assert!(!body["expectedPrograms"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_match_with_unparseable_ranking_still_succeeds() {
        let config = Config {
            llm_api_url: fake_llm("Sorry, I cannot rank these programs.").await,
            ..Config::for_tests()
        };
        let (status, body) = send(
            router_with(config),
            post_json(
                "/match",
                json!({"credential": "sk", "analysis": {"keywords": ["AI"]}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["parsed"], false);
        assert_eq!(body["result"]["matches"], json!([]));
        assert_eq!(
            body["result"]["rawReply"],
            "Sorry, I cannot rank these programs."
        );
    }

    #[tokio::test]
    async fn test_demo_disabled_without_server_key() {
        let (status, body) = send(
            router_with(Config::for_tests()),
            post_json("/demo/analyze", json!({"proposalText": "we build robots"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_demo_quota_is_global_and_enforced() {
        let config = Config {
            llm_api_url: fake_llm(r#"{"problem": "p"}"#).await,
            demo_api_key: Some("server-key".to_string()),
            demo_daily_limit: 1,
            ..Config::for_tests()
        };
        let app = router_with(config);

        let (status, body) = send(
            app.clone(),
            post_json("/demo/analyze", json!({"proposalText": "first"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["remainingQuota"], 0);

        let (status, body) = send(
            app,
            post_json(
                "/demo/match",
                json!({"analysis": {"problem": "p"}, "useRealtime": false}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(body["error"]["message"].as_str().unwrap().contains('1'));
    }

    #[tokio::test]
    async fn test_slides_returns_parsed_outline() {
        let config = Config {
            llm_api_url: fake_llm(r#"{"slides": [{"title": "Problem", "bullets": ["a"]}]}"#).await,
            ..Config::for_tests()
        };
        let (status, body) = send(
            router_with(config),
            post_json(
                "/slides",
                json!({"credential": "sk", "proposalText": "draft", "slideCount": 3}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slides"]["slides"][0]["title"], "Problem");
    }

    #[tokio::test]
    async fn test_rejected_caller_credential_is_validation_error() {
        let router = Router::new().route(
            "/v1/messages",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "invalid x-api-key"}})),
                )
            }),
        );
        let config = Config {
            llm_api_url: format!("{}/v1/messages", spawn_upstream(router).await),
            ..Config::for_tests()
        };
        let (status, _) = send(
            router_with(config),
            post_json(
                "/proposal",
                json!({"credential": "bad", "analysis": {"problem": "p"}}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let req = Request::builder()
            .method("GET")
            .uri("/api/programs/expected?keywords=AI")
            .header("origin", "https://example.org")
            .body(Body::empty())
            .expect("build GET");
        let resp = router_with(Config::for_tests())
            .oneshot(req)
            .await
            .expect("oneshot");
        assert_eq!(
            resp.headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }
}
