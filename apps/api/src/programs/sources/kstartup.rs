//! K-Startup adapter: startup support announcements from the data.go.kr JSON API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{read_success_body, SourceAdapter, SourceError};
use crate::programs::models::{FetchQuery, Program, NATIONWIDE_REGION};

pub const SLUG: &str = "kstartup";
pub const LABEL: &str = "K-Startup";

/// Operating agency assumed when an announcement omits `excins_nm`.
const DEFAULT_AGENCY: &str = "창업진흥원";

pub struct KStartupAdapter {
    client: Client,
    api_url: String,
    service_key: String,
}

impl KStartupAdapter {
    pub fn new(client: Client, api_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            service_key: service_key.into(),
        }
    }
}

/// Decodes a response body into programs.
///
/// Items live under `data`, or under `items` when `data` is missing, null or
/// empty. Anything else is treated as "no items" rather than an error.
pub(crate) fn parse_announcements(body: &str) -> Result<Vec<Program>, SourceError> {
    let payload: Value = serde_json::from_str(body)?;
    if !payload.is_object() {
        return Err(SourceError::Payload(
            "expected a JSON object at the top level".to_string(),
        ));
    }

    let items = non_empty_array(&payload, "data")
        .or_else(|| non_empty_array(&payload, "items"))
        .unwrap_or_default();

    Ok(items.iter().map(map_announcement).collect())
}

fn non_empty_array<'a>(payload: &'a Value, key: &str) -> Option<&'a [Value]> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .filter(|items| !items.is_empty())
}

fn map_announcement(item: &Value) -> Program {
    let begin = field(item, "pbanc_rcpt_bgng_dt");
    let end = field(item, "pbanc_rcpt_end_dt");
    let period = if begin.is_empty() && end.is_empty() {
        String::new()
    } else {
        format!("{begin} ~ {end}")
    };

    let target = Some(field(item, "aply_trgt_ctnt"))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| field(item, "aply_trgt"));

    Program {
        id: field(item, "pbanc_sn"),
        name: field(item, "biz_pbanc_nm"),
        agency: or_default(field(item, "excins_nm"), DEFAULT_AGENCY),
        target,
        period,
        support_amount: field(item, "supt_biz_clsfc"),
        url: field(item, "detl_pg_url"),
        region: or_default(field(item, "supt_regin"), NATIONWIDE_REGION),
        recruiting: field(item, "rcrt_prgs_yn"),
        source: LABEL.to_string(),
    }
}

/// Reads a scalar field as a string; null, missing and non-scalars become "".
fn field(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

#[async_trait]
impl SourceAdapter for KStartupAdapter {
    fn slug(&self) -> &'static str {
        SLUG
    }

    fn label(&self) -> &'static str {
        LABEL
    }

    async fn try_fetch(&self, query: &FetchQuery) -> Result<Vec<Program>, SourceError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("ServiceKey", self.service_key.clone()),
                ("page", query.page.to_string()),
                ("perPage", query.per_page.to_string()),
                ("returnType", "json".to_string()),
            ])
            .send()
            .await?;
        let body = read_success_body(response).await?;
        let programs = parse_announcements(&body)?;

        // The announcement API has no free-text search parameter.
        Ok(match &query.keyword {
            Some(keyword) => programs
                .into_iter()
                .filter(|p| p.name.contains(keyword.as_str()) || p.target.contains(keyword.as_str()))
                .collect(),
            None => programs,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::json;

    use super::*;
    use crate::test_support::spawn_upstream;

    fn sample_payload() -> Value {
        json!({
            "currentCount": 2,
            "data": [
                {
                    "pbanc_sn": 174321,
                    "biz_pbanc_nm": "2025년 예비창업패키지 예비창업자 모집",
                    "excins_nm": "창업진흥원",
                    "aply_trgt_ctnt": "예비창업자",
                    "pbanc_rcpt_bgng_dt": "20250301",
                    "pbanc_rcpt_end_dt": "20250320",
                    "supt_biz_clsfc": "사업화",
                    "detl_pg_url": "https://www.k-startup.go.kr/174321",
                    "supt_regin": "전국",
                    "rcrt_prgs_yn": "Y"
                },
                {
                    "pbanc_sn": "174400",
                    "biz_pbanc_nm": "부산 청년 창업 지원",
                    "excins_nm": null,
                    "aply_trgt": "청년",
                    "supt_regin": "부산"
                }
            ]
        })
    }

    #[test]
    fn test_parse_maps_fields_and_defaults() {
        let programs = parse_announcements(&sample_payload().to_string()).unwrap();
        assert_eq!(programs.len(), 2);

        let first = &programs[0];
        assert_eq!(first.id, "174321");
        assert_eq!(first.period, "20250301 ~ 20250320");
        assert_eq!(first.target, "예비창업자");
        assert_eq!(first.recruiting, "Y");
        assert_eq!(first.source, LABEL);

        let second = &programs[1];
        assert_eq!(second.id, "174400");
        assert_eq!(second.agency, DEFAULT_AGENCY);
        assert_eq!(second.target, "청년");
        assert_eq!(second.period, "");
        assert_eq!(second.region, "부산");
    }

    #[test]
    fn test_parse_falls_back_to_items_key() {
        let body = json!({"data": null, "items": [{"biz_pbanc_nm": "A"}]}).to_string();
        let programs = parse_announcements(&body).unwrap();
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].name, "A");
        assert_eq!(programs[0].region, NATIONWIDE_REGION);
    }

    #[test]
    fn test_parse_with_neither_key_is_empty() {
        assert!(parse_announcements(r#"{"data": [], "items": null}"#)
            .unwrap()
            .is_empty());
        assert!(parse_announcements(r#"{"totalCount": 0}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(
            parse_announcements("[1, 2]"),
            Err(SourceError::Payload(_))
        ));
        assert!(matches!(
            parse_announcements("<html>"),
            Err(SourceError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_sends_paging_and_filters_keyword_locally() {
        let payload = sample_payload();
        let router = Router::new().route(
            "/announcements",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let payload = payload.clone();
                async move {
                    assert_eq!(params.get("ServiceKey").map(String::as_str), Some("svc"));
                    assert_eq!(params.get("page").map(String::as_str), Some("2"));
                    assert_eq!(params.get("perPage").map(String::as_str), Some("10"));
                    assert_eq!(params.get("returnType").map(String::as_str), Some("json"));
                    Json(payload)
                }
            }),
        );
        let base = spawn_upstream(router).await;
        let adapter = KStartupAdapter::new(Client::new(), format!("{base}/announcements"), "svc");

        let query = FetchQuery {
            keyword: Some("청년".to_string()),
            page: 2,
            per_page: 10,
        };
        let programs = adapter.fetch(&query).await;
        assert_eq!(programs.len(), 1);
        assert_eq!(programs[0].name, "부산 청년 창업 지원");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_yields_empty() {
        let adapter = KStartupAdapter::new(Client::new(), "http://127.0.0.1:9/none", "svc");
        assert!(adapter.fetch(&FetchQuery::default()).await.is_empty());
    }
}
