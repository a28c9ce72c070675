//! Command-line interface parsing for the Pokedex CLI
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the startup configuration: resolved settings plus the default log filter.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::{parse_duration, AppConfig, ConfigError, FileConfig, Overrides};

/// Pokedex - browse PokeAPI location areas and catch pokemon from a REPL
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(about = "Interactive Pokedex backed by PokeAPI")]
#[command(version)]
pub struct Cli {
    /// How long fetched responses stay cached (e.g. 500ms, 5s, 2m)
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_arg)]
    pub ttl: Option<Duration>,

    /// How often expired cache entries are swept (defaults to the TTL)
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_arg)]
    pub sweep_interval: Option<Duration>,

    /// PokeAPI base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Per-request HTTP timeout
    #[arg(long, value_name = "DURATION", value_parser = parse_duration_arg)]
    pub timeout: Option<Duration>,

    /// Path to a JSON config file (defaults to the XDG config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Clap value parser for duration flags
pub fn parse_duration_arg(s: &str) -> Result<Duration, ConfigError> {
    parse_duration(s)
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Resolved application settings
    pub app: AppConfig,
    /// Log filter used when RUST_LOG is not set
    pub log_filter: &'static str,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// Reads the config file named by `--config`, or the default one if it
    /// exists, and applies the flags on top of it.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let file = FileConfig::discover(cli.config.as_deref())?;
        let app = AppConfig::resolve(file, cli.overrides())?;
        Ok(Self {
            app,
            log_filter: log_filter(cli.verbose),
        })
    }
}

impl Cli {
    /// Flag values that take precedence over the config file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            cache_ttl: self.ttl,
            sweep_interval: self.sweep_interval,
            request_timeout: self.timeout,
        }
    }
}

/// Maps `-v` occurrences to a tracing filter
pub fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}
