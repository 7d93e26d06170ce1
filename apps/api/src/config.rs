use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_BIZINFO_API_URL: &str = "https://www.bizinfo.go.kr/uss/rss/bizinfoApi.do";
pub const DEFAULT_KSTARTUP_API_URL: &str =
    "https://apis.data.go.kr/B552735/kisedKstartupService01/getAnnouncementInformation01";
pub const DEFAULT_LLM_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a numeric one is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub bizinfo_api_key: String,
    pub bizinfo_api_url: String,
    pub kstartup_api_key: String,
    pub kstartup_api_url: String,
    pub llm_api_url: String,
    /// Server-side LLM credential for the demo endpoints. `None` disables them.
    pub demo_api_key: Option<String>,
    pub demo_daily_limit: u32,
    pub upstream_timeout_secs: u64,
    pub region_table_path: Option<PathBuf>,
    pub recurring_catalog_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            bizinfo_api_key: require_env("BIZINFO_API_KEY")?,
            bizinfo_api_url: env_or("BIZINFO_API_URL", DEFAULT_BIZINFO_API_URL),
            kstartup_api_key: require_env("KSTARTUP_API_KEY")?,
            kstartup_api_url: env_or("KSTARTUP_API_URL", DEFAULT_KSTARTUP_API_URL),
            llm_api_url: env_or("LLM_API_URL", DEFAULT_LLM_API_URL),
            demo_api_key: optional_env("DEMO_LLM_API_KEY"),
            demo_daily_limit: env_or("DEMO_DAILY_LIMIT", "100")
                .parse::<u32>()
                .context("DEMO_DAILY_LIMIT must be a non-negative integer")?,
            upstream_timeout_secs: env_or("UPSTREAM_TIMEOUT_SECS", "30")
                .parse::<u64>()
                .context("UPSTREAM_TIMEOUT_SECS must be a whole number of seconds")?,
            region_table_path: optional_env("REGION_TABLE_PATH").map(PathBuf::from),
            recurring_catalog_path: optional_env("RECURRING_CATALOG_PATH").map(PathBuf::from),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Treats an empty value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    /// Config pointing every upstream at loopback placeholders.
    pub fn for_tests() -> Self {
        Config {
            bizinfo_api_key: "bizinfo-test-key".to_string(),
            bizinfo_api_url: "http://127.0.0.1:9/bizinfo".to_string(),
            kstartup_api_key: "kstartup-test-key".to_string(),
            kstartup_api_url: "http://127.0.0.1:9/kstartup".to_string(),
            llm_api_url: "http://127.0.0.1:9/v1/messages".to_string(),
            demo_api_key: None,
            demo_daily_limit: 100,
            upstream_timeout_secs: 5,
            region_table_path: None,
            recurring_catalog_path: None,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
