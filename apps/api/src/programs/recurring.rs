//! Recurring-program matcher: forward-looking suggestions from a static
//! catalog of programs announced every year, independent of live data.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const EMBEDDED_CATALOG: &str = include_str!("../../data/recurring_programs.json");

/// Upper bound on suggestions returned per request.
pub const MAX_EXPECTED: usize = 5;
const BASE_SCORE: u32 = 70;
const SCORE_PER_MATCH: u32 = 10;
const SCORE_CEILING: u32 = 95;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringProgramEntry {
    pub name: String,
    pub agency: String,
    pub expected_month: String,
    pub category: String,
    pub keywords: Vec<String>,
}

/// A catalog entry that overlapped the caller's keywords.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedProgram {
    pub name: String,
    pub agency: String,
    pub expected_month: String,
    pub category: String,
    pub matched_keywords: Vec<String>,
    pub match_count: usize,
    pub score: u32,
    pub status: &'static str,
}

/// Read-only catalog, loaded once at startup.
#[derive(Debug, Clone)]
pub struct RecurringCatalog {
    entries: Vec<RecurringProgramEntry>,
}

impl RecurringCatalog {
    pub fn new(entries: Vec<RecurringProgramEntry>) -> Self {
        Self { entries }
    }

    pub fn embedded() -> Result<Self> {
        let entries = serde_json::from_str(EMBEDDED_CATALOG)
            .context("embedded recurring-program catalog is invalid")?;
        Ok(Self::new(entries))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading recurring catalog {}", path.display()))?;
        let entries = serde_json::from_str(&raw)
            .with_context(|| format!("parsing recurring catalog {}", path.display()))?;
        Ok(Self::new(entries))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scores every entry against `keywords` and returns the best five.
    ///
    /// A caller keyword counts once per entry when it and any of the entry's
    /// keywords contain one another, ignoring case. Score is
    /// `min(95, 70 + 10 * matches)`; entries without matches are dropped.
    /// Ties keep catalog order.
    pub fn match_keywords(&self, keywords: &[String]) -> Vec<ExpectedProgram> {
        let needles: Vec<(&str, String)> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| (k, k.to_lowercase()))
            .collect();

        let mut results: Vec<ExpectedProgram> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let haystack: Vec<String> =
                    entry.keywords.iter().map(|k| k.to_lowercase()).collect();
                let matched: Vec<String> = needles
                    .iter()
                    .filter(|(_, needle)| {
                        haystack
                            .iter()
                            .any(|k| k.contains(needle.as_str()) || needle.contains(k.as_str()))
                    })
                    .map(|(original, _)| original.to_string())
                    .collect();

                if matched.is_empty() {
                    return None;
                }

                Some(ExpectedProgram {
                    name: entry.name.clone(),
                    agency: entry.agency.clone(),
                    expected_month: entry.expected_month.clone(),
                    category: entry.category.clone(),
                    match_count: matched.len(),
                    score: score_for(matched.len()),
                    matched_keywords: matched,
                    status: "expected",
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score));
        results.truncate(MAX_EXPECTED);
        results
    }
}

fn score_for(match_count: usize) -> u32 {
    let count = u32::try_from(match_count).unwrap_or(u32::MAX);
    BASE_SCORE
        .saturating_add(count.saturating_mul(SCORE_PER_MATCH))
        .min(SCORE_CEILING)
}

/// Splits a comma-separated keyword string, dropping blanks.
pub fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
