use serde::{Deserialize, Serialize};

/// Region value given to programs whose source does not classify them.
pub const NATIONWIDE_REGION: &str = "전국";

/// One open support program, normalised from any upstream source.
///
/// Every field is a plain string; absent upstream fields become `""` so the
/// substring checks downstream never have to handle a missing value.
/// Built fresh per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Program {
    /// Source-native identifier; unique within its source only.
    pub id: String,
    pub name: String,
    pub agency: String,
    pub target: String,
    /// Free-text application window, e.g. "20250101 ~ 20250214".
    pub period: String,
    /// Support amount or support field, whichever the source provides.
    pub support_amount: String,
    pub url: String,
    pub region: String,
    /// Recruiting flag as the source reports it ("Y"/"N"), or empty.
    pub recruiting: String,
    /// Label of the adapter that produced this record.
    pub source: String,
}

/// Paging and search parameters passed to a source adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchQuery {
    pub keyword: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl FetchQuery {
    pub const DEFAULT_PER_PAGE: u32 = 100;

    pub fn search(keyword: Option<&str>) -> Self {
        Self {
            keyword: keyword
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            ..Self::default()
        }
    }

    /// Smallest request that still proves a source is reachable.
    pub fn probe() -> Self {
        Self {
            per_page: 1,
            ..Self::default()
        }
    }
}

impl Default for FetchQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}
