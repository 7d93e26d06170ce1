//! Region/keyword filter over aggregated programs.
//!
//! The alias table is seed data loaded once at startup and never mutated.
//! Matching is case-sensitive substring containment on the raw strings, with
//! no word-boundary checks: an alias such as "강남" matches anywhere in a title.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::programs::models::Program;

/// Region value meaning "do not filter".
pub const ALL_REGIONS: &str = "all";

const EMBEDDED_TABLE: &str = include_str!("../../data/regions.json");

#[derive(Debug, Clone, Deserialize)]
pub struct RegionEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl RegionEntry {
    /// The canonical name followed by every alias.
    fn keywords(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    fn answers_to(&self, requested: &str) -> bool {
        self.keywords().any(|k| k == requested)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionTable {
    /// Agencies whose programs apply everywhere unless the title says otherwise.
    #[serde(default)]
    pub nationwide_agencies: Vec<String>,
    /// Region values that mean "not tied to a region".
    #[serde(default)]
    pub nationwide_markers: Vec<String>,
    pub regions: Vec<RegionEntry>,
}

impl RegionTable {
    pub fn embedded() -> Result<Self> {
        serde_json::from_str(EMBEDDED_TABLE).context("embedded region table is invalid")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading region table {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing region table {}", path.display()))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::embedded(),
        }
    }

    /// Retains the programs relevant to `region`, preserving order.
    ///
    /// `"all"` (or a blank region) returns the input untouched. Otherwise, per
    /// program, first rule that applies wins:
    /// 1. nationwide agency: keep unless the title names a different region;
    /// 2. title or region field names the requested region: keep;
    /// 3. title names no other region and the region field is unclassified: keep;
    /// 4. drop.
    pub fn filter(&self, programs: Vec<Program>, region: &str) -> Vec<Program> {
        let region = region.trim();
        if region.is_empty() || region == ALL_REGIONS {
            return programs;
        }

        let requested = self.regions.iter().find(|r| r.answers_to(region));
        let requested_keywords: Vec<&str> = match requested {
            Some(entry) => entry.keywords().collect(),
            None => vec![region],
        };
        let other_keywords: Vec<&str> = self
            .regions
            .iter()
            .filter(|r| !requested.is_some_and(|req| std::ptr::eq(*r, req)))
            .flat_map(RegionEntry::keywords)
            .filter(|k| !requested_keywords.contains(k))
            .collect();

        programs
            .into_iter()
            .filter(|p| self.keep(p, &requested_keywords, &other_keywords))
            .collect()
    }

    fn keep(&self, program: &Program, requested: &[&str], others: &[&str]) -> bool {
        let names_other_region = others.iter().any(|k| program.name.contains(k));

        if self.is_nationwide_agency(&program.agency) {
            return !names_other_region;
        }

        if requested
            .iter()
            .any(|k| program.name.contains(k) || program.region.contains(k))
        {
            return true;
        }

        !names_other_region && self.is_unclassified(&program.region)
    }

    fn is_nationwide_agency(&self, agency: &str) -> bool {
        !agency.is_empty()
            && self
                .nationwide_agencies
                .iter()
                .any(|a| agency.contains(a.as_str()))
    }

    fn is_unclassified(&self, region: &str) -> bool {
        let region = region.trim();
        region.is_empty() || self.nationwide_markers.iter().any(|m| m == region)
    }
}
