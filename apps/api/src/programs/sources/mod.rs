//! Source adapters: one per upstream open-data provider.
//!
//! Each adapter owns its upstream credential and its field mapping into
//! `Program`. `try_fetch` may fail; `fetch` never does: any transport error,
//! non-2xx status or decode failure is logged and becomes an empty list.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::programs::models::{FetchQuery, Program};

pub mod bizinfo;
pub mod kstartup;

pub use bizinfo::BizinfoAdapter;
pub use kstartup::KStartupAdapter;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("XML decode error: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected payload: {0}")]
    Payload(String),
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Path segment used by `/api/programs/<slug>` and health reports.
    fn slug(&self) -> &'static str;

    /// Value stamped into `Program::source`.
    fn label(&self) -> &'static str;

    async fn try_fetch(&self, query: &FetchQuery) -> Result<Vec<Program>, SourceError>;

    /// Fetches programs, converting every failure into an empty list.
    async fn fetch(&self, query: &FetchQuery) -> Vec<Program> {
        match self.try_fetch(query).await {
            Ok(programs) => programs,
            Err(e) => {
                warn!(source = self.slug(), error = %e, "source adapter failed; returning no programs");
                Vec::new()
            }
        }
    }
}

/// Rejects non-2xx responses before any decoding is attempted.
pub(crate) async fn read_success_body(response: reqwest::Response) -> Result<String, SourceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status(status.as_u16()));
    }
    Ok(response.text().await?)
}
