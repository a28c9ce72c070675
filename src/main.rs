//! Pokedex CLI - browse PokeAPI from an interactive prompt
//!
//! Location areas and pokemon are fetched from PokeAPI; raw responses are
//! memoized for the session in an expiring in-memory cache.

use std::io;
use std::sync::Arc;

use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pokedex::app::App;
use pokedex::cache::ResponseCache;
use pokedex::cli::{Cli, StartupConfig};
use pokedex::data::PokeApiClient;

/// Sets up logging to stderr so it never interleaves with REPL output on stdout.
/// RUST_LOG takes precedence over the verbosity flags.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let startup = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    init_tracing(startup.log_filter);

    let config = startup.app;
    info!(
        base_url = %config.base_url,
        ttl = ?config.cache_ttl,
        sweep_interval = ?config.sweep_interval,
        "starting pokedex"
    );

    // One cache per session, owned here and shared with the client
    let cache = Arc::new(ResponseCache::new(config.cache_config()));
    let client = PokeApiClient::new(&config.base_url, Arc::clone(&cache), config.request_timeout)?;

    let mut app = App::new(client);
    let mut stdout = io::stdout();
    let result = app.run(BufReader::new(tokio::io::stdin()), &mut stdout).await;

    cache.shutdown().await;
    result?;

    Ok(())
}
