//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the checker.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the balance checker.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Text file with one wallet address per line.
    pub wallets_file: String,

    /// Balance API connection settings.
    pub api: ApiConfig,

    /// External signing process settings.
    pub signer: SignerConfig,

    /// Retry policy of the authenticated request client.
    pub retries: RetryConfig,

    /// Worker pool settings.
    pub workers: WorkerConfig,

    /// Target selection (chains and pools) and value threshold.
    pub selection: SelectionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            wallets_file: "wallets.txt".to_string(),
            api: ApiConfig::default(),
            signer: SignerConfig::default(),
            retries: RetryConfig::default(),
            workers: WorkerConfig::default(),
            selection: SelectionConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Balance API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the balance-data API (no trailing slash).
    pub base_url: String,

    /// Per-request HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Minimum pause after every successful response, in milliseconds.
    pub pacing_ms: u64,

    /// Random extra pause added on top of `pacing_ms`.
    pub pacing_jitter_ms: u64,

    /// Body fragment identifying an explicit rate-limit 429 response.
    pub rate_limit_marker: String,

    /// Optional outbound proxy URL. Environment proxies are ignored.
    pub proxy: Option<String>,

    /// Static headers sent with every request.
    pub headers: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.debank.com".to_string(),
            request_timeout_secs: 30,
            pacing_ms: 500,
            pacing_jitter_ms: 50,
            rate_limit_marker: "Too Many".to_string(),
            proxy: None,
            headers: default_headers(),
        }
    }
}

fn default_headers() -> BTreeMap<String, String> {
    [
        ("accept", "*/*"),
        ("accept-language", "en-US,en;q=0.9"),
        ("cache-control", "no-cache"),
        ("origin", "https://debank.com"),
        ("pragma", "no-cache"),
        ("referer", "https://debank.com/"),
        ("sec-fetch-dest", "empty"),
        ("sec-fetch-mode", "cors"),
        ("sec-fetch-site", "same-site"),
        ("source", "web"),
        (
            "user-agent",
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/112.0.0.0 Safari/537.36",
        ),
        ("x-api-ver", "v2"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// External signing process configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Program to launch.
    pub command: String,

    /// Arguments passed to the program.
    pub args: Vec<String>,

    /// How long to wait for a response line, in milliseconds.
    pub response_timeout_ms: u64,

    /// Attempts (each on a fresh process after the first failure) before giving up.
    pub max_attempts: u32,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            command: "node".to_string(),
            args: vec!["js/main.js".to_string()],
            response_timeout_ms: 5_000,
            max_attempts: 3,
        }
    }
}

/// Retry configuration for API requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per request. Absent means retry forever.
    pub max_attempts: Option<u32>,

    /// Base delay between attempts in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound for the exponential delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            base_delay_ms: 1_000,
            max_delay_ms: 1_000,
        }
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of concurrent workers. More than 3 tends to trigger rate limiting.
    pub count: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { count: 1 }
    }
}

/// How targets are chosen once discovery is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Every discovered chain and pool.
    Auto,
    /// Only the targets listed in `selection.targets`.
    Configured,
}

/// Target selection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub mode: SelectionMode,

    /// Chain ids and pool names to fetch in `configured` mode.
    pub targets: Vec<String>,

    /// Coin entries worth this many USD or less are dropped.
    pub min_usd: f64,

    /// Only keep coin entries with this ticker.
    pub ticker: Option<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Auto,
            targets: Vec::new(),
            min_usd: 7.0,
            ticker: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Also append logs to this file.
    pub log_file: Option<String>,

    /// Show progress bars on a terminal.
    pub progress: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            progress: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: CheckerConfig = toml::from_str("").unwrap();
        assert_eq!(config.workers.count, 1);
        assert_eq!(config.signer.max_attempts, 3);
        assert_eq!(config.selection.mode, SelectionMode::Auto);
        assert_eq!(config.selection.min_usd, 7.0);
        assert!(config.retries.max_attempts.is_none());
        assert_eq!(config.api.headers.get("x-api-ver").map(String::as_str), Some("v2"));
    }

    #[test]
    fn test_partial_sections() {
        let config: CheckerConfig = toml::from_str(
            r#"
            [workers]
            count = 3

            [selection]
            mode = "configured"
            targets = ["eth", "arb"]
            ticker = "ETH"

            [retries]
            max_attempts = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.workers.count, 3);
        assert_eq!(config.selection.mode, SelectionMode::Configured);
        assert_eq!(config.selection.targets, vec!["eth", "arb"]);
        assert_eq!(config.selection.ticker.as_deref(), Some("ETH"));
        assert_eq!(config.retries.max_attempts, Some(10));
        assert_eq!(config.retries.base_delay_ms, 1_000);
        assert_eq!(config.api.pacing_ms, 500);
    }
}
