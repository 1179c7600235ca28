//! Command-line interface argument parsing.
//!
//! Flags override `.transparency.toml`; API keys may also come from the
//! environment.

use clap::Parser;
use std::path::PathBuf;

/// Transparency - congressional and campaign-finance aggregation service
///
/// Serves cached aggregates of Congress.gov, OpenFEC and the
/// congress-legislators directory over HTTP, or prints one report as JSON.
///
/// Examples:
///   transparency
///   transparency --port 8080 --congress-api-key KEY
///   transparency --report senate
///   transparency --report stats --id S000033
///   transparency --report donations --party DEM
///   transparency --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .transparency.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind the HTTP server to
    #[arg(short, long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Congress.gov API key
    #[arg(long, env = "CONGRESS_API_KEY", hide_env_values = true)]
    pub congress_api_key: Option<String>,

    /// OpenFEC API key
    #[arg(long, env = "FEC_API_KEY", hide_env_values = true)]
    pub fec_api_key: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print one report as JSON instead of serving
    #[arg(long, value_name = "KIND")]
    pub report: Option<ReportKind>,

    /// Bioguide id for the stats and finances reports
    #[arg(long, value_name = "BIOGUIDE_ID")]
    pub id: Option<String>,

    /// Party key for the donations report (e.g. DEM, REP)
    ///
    /// Enables the per-party Schedule A aggregation.
    #[arg(long, value_name = "KEY")]
    pub party: Option<String>,

    /// Generate a default .transparency.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// One-shot report printed by `--report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKind {
    House,
    Senate,
    Detailed,
    Donations,
    Stats,
    Finances,
}

impl ReportKind {
    pub fn needs_id(self) -> bool {
        matches!(self, ReportKind::Stats | ReportKind::Finances)
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.port == Some(0) {
            return Err("Port must be between 1 and 65535".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(kind) = self.report {
            let has_id = self.id.as_deref().is_some_and(|id| !id.trim().is_empty());
            if kind.needs_id() && !has_id {
                return Err(format!("--report {:?} requires --id", kind).to_lowercase());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            host: None,
            port: None,
            congress_api_key: None,
            fec_api_key: None,
            timeout: None,
            verbose: false,
            quiet: false,
            report: None,
            id: None,
            party: None,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_report_flags() {
        let args = Args::try_parse_from([
            "transparency",
            "--report",
            "stats",
            "--id",
            "S000033",
            "--port",
            "9000",
        ])
        .unwrap();
        assert_eq!(args.report, Some(ReportKind::Stats));
        assert_eq!(args.id.as_deref(), Some("S000033"));
        assert_eq!(args.port, Some(9000));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_values() {
        let mut args = make_args();
        args.port = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_member_reports_require_id() {
        let mut args = make_args();
        args.report = Some(ReportKind::Finances);
        assert_eq!(
            args.validate().unwrap_err(),
            "--report finances requires --id"
        );

        args.id = Some(" ".to_string());
        assert!(args.validate().is_err());

        args.report = Some(ReportKind::Senate);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.init_config = true;
        args.port = Some(0);
        assert!(args.validate().is_ok());
    }
}
