use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::programs::aggregator::Aggregator;
use crate::programs::recurring::RecurringCatalog;
use crate::programs::region::RegionTable;
use crate::programs::sources::{BizinfoAdapter, KStartupAdapter, SourceAdapter};
use crate::quota::DailyQuota;

const LLM_TIMEOUT: Duration = Duration::from_secs(120);

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub catalog: Arc<RecurringCatalog>,
    /// Global demo-usage counter; one per process.
    pub quota: Arc<DailyQuota>,
    /// Pooled client shared by every per-request `LlmClient`.
    pub llm_http: Client,
    pub config: Config,
}

/// An LLM client plus the demo quota left after acquiring it, if any.
pub struct LlmGrant {
    pub client: LlmClient,
    pub remaining_quota: Option<u32>,
}

impl AppState {
    /// Wires adapters, seed tables and HTTP clients from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let upstream_http = Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .context("building upstream HTTP client")?;
        let llm_http = Client::builder()
            .timeout(LLM_TIMEOUT)
            .build()
            .context("building LLM HTTP client")?;

        let regions = Arc::new(RegionTable::load(config.region_table_path.as_deref())?);
        let catalog = Arc::new(RecurringCatalog::load(
            config.recurring_catalog_path.as_deref(),
        )?);

        let adapters: Vec<Arc<dyn SourceAdapter>> = vec![
            Arc::new(BizinfoAdapter::new(
                upstream_http.clone(),
                config.bizinfo_api_url.clone(),
                config.bizinfo_api_key.clone(),
            )),
            Arc::new(KStartupAdapter::new(
                upstream_http,
                config.kstartup_api_url.clone(),
                config.kstartup_api_key.clone(),
            )),
        ];

        Ok(Self {
            aggregator: Arc::new(Aggregator::new(adapters, regions)),
            catalog,
            quota: Arc::new(DailyQuota::new(config.demo_daily_limit)),
            llm_http,
            config,
        })
    }

    pub fn demo_enabled(&self) -> bool {
        self.config.demo_api_key.is_some()
    }

    /// Builds an LLM client from a caller-supplied credential.
    pub fn caller_llm(&self, credential: &str) -> Result<LlmGrant, AppError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AppError::Validation("credential is required".to_string()));
        }
        Ok(LlmGrant {
            client: self.llm_client(credential),
            remaining_quota: None,
        })
    }

    /// Builds an LLM client from the server's demo credential, consuming one
    /// unit of the daily quota.
    pub fn demo_llm(&self) -> Result<LlmGrant, AppError> {
        let key = self.config.demo_api_key.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable("Demo mode is not configured on this server".to_string())
        })?;
        let remaining = self
            .quota
            .try_acquire()
            .map_err(|e| AppError::RateLimited { limit: e.limit })?;
        Ok(LlmGrant {
            client: self.llm_client(key),
            remaining_quota: Some(remaining),
        })
    }

    fn llm_client(&self, api_key: &str) -> LlmClient {
        LlmClient::new(
            self.llm_http.clone(),
            self.config.llm_api_url.clone(),
            api_key,
        )
    }
}

#[cfg(test)]
impl AppState {
    /// State over in-memory adapters and the embedded seed tables.
    pub fn for_tests(config: Config, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        let regions = Arc::new(RegionTable::embedded().expect("embedded region table"));
        Self {
            aggregator: Arc::new(Aggregator::new(adapters, regions)),
            catalog: Arc::new(RecurringCatalog::embedded().expect("embedded catalog")),
            quota: Arc::new(DailyQuota::new(config.demo_daily_limit)),
            llm_http: Client::new(),
            config,
        }
    }
}
