//! CLI argument definitions for logwarden-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Logwarden log ingestion daemon.
///
/// Reads raw log lines, tags each one with an anomaly verdict and
/// threat type, persists the result, and broadcasts it to subscribers.
#[derive(Parser, Debug)]
#[command(name = "logwarden-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logwarden.toml configuration file.
    #[arg(short, long, default_value = "/etc/logwarden/logwarden.toml")]
    pub config: PathBuf,

    /// Read log lines from this file instead of stdin.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        DaemonCli::command().debug_assert();
    }

    #[test]
    fn parses_all_flags() {
        let cli = DaemonCli::parse_from([
            "logwarden-daemon",
            "--config",
            "/tmp/logwarden.toml",
            "--input",
            "/var/log/auth.log",
            "--log-level",
            "debug",
            "--log-format",
            "pretty",
            "--validate",
        ]);
        assert_eq!(cli.config, PathBuf::from("/tmp/logwarden.toml"));
        assert_eq!(cli.input, Some(PathBuf::from("/var/log/auth.log")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_format.as_deref(), Some("pretty"));
        assert!(cli.validate);
    }

    #[test]
    fn defaults_read_from_stdin() {
        let cli = DaemonCli::parse_from(["logwarden-daemon"]);
        assert_eq!(cli.input, None);
        assert!(!cli.validate);
    }
}
