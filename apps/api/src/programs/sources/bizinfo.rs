//! 기업마당 (Bizinfo) adapter: RSS-style XML feed of SME support notices.

use async_trait::async_trait;
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;

use super::{read_success_body, SourceAdapter, SourceError};
use crate::programs::models::{FetchQuery, Program, NATIONWIDE_REGION};

pub const SLUG: &str = "bizinfo";
pub const LABEL: &str = "기업마당";

#[derive(Debug, Deserialize)]
struct Rss {
    #[serde(default)]
    channel: Channel,
}

#[derive(Debug, Default, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(rename = "pblancId")]
    id: Option<String>,
    #[serde(rename = "pblancNm")]
    name: Option<String>,
    #[serde(rename = "jrsdInsttNm")]
    agency: Option<String>,
    #[serde(rename = "trgetNm")]
    target: Option<String>,
    #[serde(rename = "reqstBeginEndDe")]
    period: Option<String>,
    #[serde(rename = "sprtCn")]
    support: Option<String>,
    #[serde(rename = "detailPageUrl")]
    url: Option<String>,
}

pub struct BizinfoAdapter {
    client: Client,
    api_url: String,
    api_key: String,
}

impl BizinfoAdapter {
    pub fn new(client: Client, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    fn query_params(&self, query: &FetchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("crtfcKey", self.api_key.clone()),
            ("dataType", "xml".to_string()),
            ("searchCnt", query.per_page.to_string()),
        ];
        if let Some(keyword) = &query.keyword {
            params.push(("searchKind", keyword.clone()));
        }
        params
    }
}

/// Decodes the feed body into programs. Bizinfo carries no region field.
pub(crate) fn parse_feed(xml: &str) -> Result<Vec<Program>, SourceError> {
    let xml = scrub_html_entities_for_xml(xml);
    let rss: Rss = from_str(&xml)?;

    Ok(rss
        .channel
        .item
        .into_iter()
        .map(|it| Program {
            id: text(it.id),
            name: text(it.name),
            agency: text(it.agency),
            target: text(it.target),
            period: text(it.period),
            support_amount: text(it.support),
            url: text(it.url),
            region: NATIONWIDE_REGION.to_string(),
            recruiting: String::new(),
            source: LABEL.to_string(),
        })
        .collect())
}

fn text(field: Option<String>) -> String {
    field.map(|s| s.trim().to_string()).unwrap_or_default()
}

// Notice bodies are HTML fragments; these entities are not defined in XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&middot;", "·")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
}

#[async_trait]
impl SourceAdapter for BizinfoAdapter {
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
            .query(&self.query_params(query))
            .send()
            .await?;
        let body = read_success_body(response).await?;
        parse_feed(&body)
    }
}
