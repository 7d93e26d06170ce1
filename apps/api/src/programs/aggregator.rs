//! Aggregator: fans a search out to every source adapter and merges results.

use std::sync::Arc;

use tracing::{info, warn};

use crate::programs::models::{FetchQuery, Program};
use crate::programs::region::RegionTable;
use crate::programs::sources::SourceAdapter;

/// Per-source outcome of a health probe.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub slug: &'static str,
    pub connected: bool,
}

pub struct Aggregator {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    regions: Arc<RegionTable>,
}

impl Aggregator {
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>, regions: Arc<RegionTable>) -> Self {
        Self { adapters, regions }
    }

    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn adapter(&self, slug: &str) -> Option<&Arc<dyn SourceAdapter>> {
        self.adapters.iter().find(|a| a.slug() == slug)
    }

    pub fn regions(&self) -> &RegionTable {
        &self.regions
    }

    /// Queries every adapter concurrently and returns the merged list.
    ///
    /// Waits for all adapters. Each one runs in its own task, so an adapter
    /// that panics contributes nothing instead of failing the search. Output
    /// is in registration order, then source order, with no de-duplication
    /// across sources. `region` is applied via [`RegionTable::filter`].
    pub async fn search_all(&self, keyword: Option<&str>, region: &str) -> Vec<Program> {
        let merged = self.fetch_all(&FetchQuery::search(keyword)).await;
        let total = merged.len();
        let filtered = self.regions.filter(merged, region);
        info!(
            total,
            kept = filtered.len(),
            region,
            "aggregated programs from {} sources",
            self.adapters.len()
        );
        filtered
    }

    async fn fetch_all(&self, query: &FetchQuery) -> Vec<Program> {
        let handles: Vec<_> = self
            .adapters
            .iter()
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                let query = query.clone();
                tokio::spawn(async move { adapter.fetch(&query).await })
            })
            .collect();

        let mut merged = Vec::new();
        for (adapter, handle) in self.adapters.iter().zip(handles) {
            match handle.await {
                Ok(programs) => merged.extend(programs),
                Err(e) => {
                    warn!(source = adapter.slug(), error = %e, "source adapter task failed");
                }
            }
        }
        merged
    }

    /// Issues a minimal request to every adapter concurrently. A source is
    /// connected when the request succeeds, even with zero records.
    pub async fn probe_all(&self) -> Vec<ProbeResult> {
        let handles: Vec<_> = self
            .adapters
            .iter()
            .map(|adapter| {
                let adapter = Arc::clone(adapter);
                tokio::spawn(async move { adapter.try_fetch(&FetchQuery::probe()).await.is_ok() })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (adapter, handle) in self.adapters.iter().zip(handles) {
            results.push(ProbeResult {
                slug: adapter.slug(),
                connected: handle.await.unwrap_or(false),
            });
        }
        results
    }
}
