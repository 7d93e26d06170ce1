use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Structured reading of a business proposal.
///
/// Produced by the LLM and echoed back by callers, so it is accepted loosely:
/// every field defaults, the legacy `not`/`but`/`because` keys are aliases,
/// and `keywords` may be an array or a comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    #[serde(alias = "not", deserialize_with = "lenient_text")]
    pub problem: String,
    #[serde(alias = "but", deserialize_with = "lenient_text")]
    pub solution: String,
    #[serde(alias = "because", deserialize_with = "lenient_text")]
    pub rationale: String,
    #[serde(deserialize_with = "lenient_keywords")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl AnalysisResult {
    /// Keywords used to match recurring programs: keywords, then category.
    pub fn match_terms(&self) -> Vec<String> {
        let mut terms = self.keywords.clone();
        if let Some(category) = self.category.as_deref().map(str::trim) {
            if !category.is_empty() && !terms.iter().any(|t| t == category) {
                terms.push(category.to_string());
            }
        }
        terms
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_keywords<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => crate::programs::recurring::split_keywords(&s),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}
