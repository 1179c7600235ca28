//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.transparency.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".transparency.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Congress.gov and legislators directory settings.
    #[serde(default)]
    pub congress: CongressConfig,

    /// OpenFEC settings.
    #[serde(default)]
    pub fec: FecConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    20
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ]
}

/// Congress.gov settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CongressConfig {
    #[serde(default = "default_congress_url")]
    pub base_url: String,

    /// API key; listing routes fall back to `DEMO_KEY` without one.
    #[serde(default)]
    pub api_key: Option<String>,

    /// `congress-legislators` current legislators JSON.
    #[serde(default = "default_legislators_url")]
    pub legislators_url: String,

    /// Lifetime of the senate/house snapshot.
    #[serde(default = "default_hour")]
    pub cache_ttl_seconds: u64,

    /// Lifetime of member statistics.
    #[serde(default = "default_day")]
    pub stats_ttl_seconds: u64,

    /// Lifetime of the legislators directory.
    #[serde(default = "default_directory_ttl")]
    pub directory_ttl_seconds: u64,

    /// Page size for the House roster listing.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// States fetched concurrently per senate batch.
    #[serde(default = "default_state_batch_size")]
    pub state_batch_size: usize,
}

impl Default for CongressConfig {
    fn default() -> Self {
        Self {
            base_url: default_congress_url(),
            api_key: None,
            legislators_url: default_legislators_url(),
            cache_ttl_seconds: default_hour(),
            stats_ttl_seconds: default_day(),
            directory_ttl_seconds: default_directory_ttl(),
            page_limit: default_page_limit(),
            state_batch_size: default_state_batch_size(),
        }
    }
}

impl CongressConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn stats_ttl(&self) -> Duration {
        Duration::from_secs(self.stats_ttl_seconds)
    }

    pub fn directory_ttl(&self) -> Duration {
        Duration::from_secs(self.directory_ttl_seconds)
    }
}

fn default_congress_url() -> String {
    "https://api.congress.gov/v3".to_string()
}

fn default_legislators_url() -> String {
    "https://unitedstates.github.io/congress-legislators/legislators-current.json".to_string()
}

fn default_hour() -> u64 {
    3600
}

fn default_day() -> u64 {
    86_400
}

fn default_directory_ttl() -> u64 {
    12 * 3600
}

fn default_page_limit() -> u32 {
    250
}

fn default_state_batch_size() -> usize {
    10
}

/// OpenFEC settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FecConfig {
    #[serde(default = "default_fec_url")]
    pub base_url: String,

    /// API key; omitted from requests when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Lifetime of donation aggregates.
    #[serde(default = "default_hour")]
    pub cache_ttl_seconds: u64,

    /// Lifetime of proxied responses.
    #[serde(default = "default_proxy_ttl")]
    pub proxy_ttl_seconds: u64,

    /// Schedule A rows per page for party aggregation.
    #[serde(default = "default_schedule_a_per_page")]
    pub schedule_a_per_page: u32,

    /// Schedule A pages read per candidate.
    #[serde(default = "default_schedule_a_max_pages")]
    pub schedule_a_max_pages: u32,

    /// Pause between Schedule A pages.
    #[serde(default = "default_page_delay")]
    pub page_delay_ms: u64,

    /// Pause between candidates during party aggregation.
    #[serde(default = "default_candidate_delay")]
    pub candidate_delay_ms: u64,

    /// Candidates shown on the donations dashboard.
    #[serde(default = "default_candidate_ids")]
    pub candidate_ids: Vec<String>,

    /// Individual share of receipts (percent) above which a campaign is
    /// labelled grassroots.
    #[serde(default = "default_grassroots_threshold")]
    pub grassroots_threshold_pct: f64,
}

impl Default for FecConfig {
    fn default() -> Self {
        Self {
            base_url: default_fec_url(),
            api_key: None,
            cache_ttl_seconds: default_hour(),
            proxy_ttl_seconds: default_proxy_ttl(),
            schedule_a_per_page: default_schedule_a_per_page(),
            schedule_a_max_pages: default_schedule_a_max_pages(),
            page_delay_ms: default_page_delay(),
            candidate_delay_ms: default_candidate_delay(),
            candidate_ids: default_candidate_ids(),
            grassroots_threshold_pct: default_grassroots_threshold(),
        }
    }
}

impl FecConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn proxy_ttl(&self) -> Duration {
        Duration::from_secs(self.proxy_ttl_seconds)
    }
}

fn default_fec_url() -> String {
    "https://api.open.fec.gov/v1".to_string()
}

fn default_proxy_ttl() -> u64 {
    60
}

fn default_schedule_a_per_page() -> u32 {
    100
}

fn default_schedule_a_max_pages() -> u32 {
    10
}

fn default_page_delay() -> u64 {
    250
}

fn default_candidate_delay() -> u64 {
    300
}

fn default_candidate_ids() -> Vec<String> {
    [
        "P80001571",
        "P80000722",
        "P40013074",
        "S2MA00170",
        "S4VT00033",
        "S2KY00012",
        "S8NY00082",
        "H6CA22125",
        "H8CA05035",
        "S2TX00312",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_grassroots_threshold() -> f64 {
    90.0
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings; only values
    /// the user actually supplied are applied.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        // Keys may also arrive through the environment via clap's `env`.
        if let Some(ref key) = args.congress_api_key {
            self.congress.api_key = Some(key.clone());
        }
        if let Some(ref key) = args.fec_api_key {
            self.fec.api_key = Some(key.clone());
        }

        if let Some(timeout) = args.timeout {
            self.general.timeout_seconds = timeout;
        }

        if args.verbose {
            self.general.verbose = true;
        }

        self.congress.api_key = self.congress.api_key.take().filter(|k| !k.trim().is_empty());
        self.fec.api_key = self.fec.api_key.take().filter(|k| !k.trim().is_empty());
    }

    /// Effective log level: `quiet` wins, then `general.verbose` (set by the
    /// file or by `--verbose`).
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.general.timeout_seconds)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.congress.page_limit, 250);
        assert_eq!(config.congress.cache_ttl(), Duration::from_secs(3600));
        assert_eq!(config.fec.candidate_ids.len(), 10);
        assert_eq!(config.fec.candidate_ids[0], "P80001571");
        assert!(config.congress.api_key.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true
timeout_seconds = 5

[server]
port = 9000

[congress]
api_key = "abc"
state_batch_size = 5

[fec]
candidate_ids = ["S4VT00033"]
proxy_ttl_seconds = 0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.congress.api_key.as_deref(), Some("abc"));
        assert_eq!(config.congress.state_batch_size, 5);
        assert_eq!(config.congress.stats_ttl_seconds, 86_400);
        assert_eq!(config.fec.candidate_ids, vec!["S4VT00033"]);
        assert_eq!(config.fec.proxy_ttl(), Duration::ZERO);
        assert_eq!(config.fec.schedule_a_max_pages, 10);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nhost = \"127.0.0.1\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.cors_origins.len(), 2);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nport = ").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config: Config = toml::from_str("[server]\nport = 9000").unwrap();
        let args = Args::try_parse_from([
            "transparency",
            "--port",
            "8080",
            "--timeout",
            "3",
            "--fec-api-key",
            "  ",
        ])
        .unwrap();

        config.merge_with_args(&args);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.general.timeout_seconds, 3);
        assert!(config.fec.api_key.is_none());
    }

    #[test]
    fn test_verbose_from_file_sets_log_level() {
        let mut config: Config = toml::from_str("[general]\nverbose = true").unwrap();
        let args = Args::try_parse_from(["transparency"]).unwrap();
        config.merge_with_args(&args);

        assert_eq!(config.log_level(false), tracing::Level::DEBUG);
        assert_eq!(config.log_level(true), tracing::Level::ERROR);

        let mut config = Config::default();
        assert_eq!(config.log_level(false), tracing::Level::INFO);
        let args = Args::try_parse_from(["transparency", "--verbose"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.log_level(false), tracing::Level::DEBUG);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[congress]"));
        assert!(toml_str.contains("[fec]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.fec.candidate_ids.len(), 10);
    }
}
