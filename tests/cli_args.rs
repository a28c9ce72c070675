//! Integration tests for CLI argument handling
//!
//! Tests flag parsing and startup failures from the command line.

use std::io::Write;
use std::process::{Command, Stdio};

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pokedex"))
        .args(args)
        .output()
        .expect("Failed to execute pokedex")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(
        output.status.success(),
        "Expected --help to exit successfully"
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pokedex"), "Help should mention pokedex");
    assert!(stdout.contains("--ttl"), "Help should mention --ttl flag");
    assert!(
        stdout.contains("--sweep-interval"),
        "Help should mention --sweep-interval flag"
    );
}

#[test]
fn test_invalid_duration_prints_error_and_exits() {
    let output = run_cli(&["--ttl", "eventually"]);
    assert!(!output.status.success(), "Expected invalid duration to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid duration") || stderr.contains("invalid"),
        "Should print error message about invalid duration: {}",
        stderr
    );
}

#[test]
fn test_zero_sweep_interval_is_rejected() {
    let output = run_cli(&["--sweep-interval", "0s"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("greater than zero"),
        "Should explain the zero duration: {}",
        stderr
    );
}

#[test]
fn test_missing_config_file_is_reported() {
    let output = run_cli(&["--config", "/nonexistent/pokedex/config.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_repl_exits_on_exit_command() {
    // Offline base URL: the session below never touches the network.
    let mut child = Command::new(env!("CARGO_BIN_EXE_pokedex"))
        .args(["--base-url", "http://127.0.0.1:9/api/v2"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn pokedex");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"help\npokedex\nexit\n")
        .expect("Failed to write commands");

    let output = child.wait_with_output().expect("Failed to wait for pokedex");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pokedex > "));
    assert!(stdout.contains("Your pokedex is empty..."));
    assert!(stdout.contains("Closing the Pokedex... Goodbye!"));
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use std::time::Duration;

    use clap::Parser;
    use pokedex::cli::{parse_duration_arg, Cli, StartupConfig};

    #[test]
    fn test_cli_no_args_has_no_overrides() {
        let cli = Cli::parse_from(["pokedex"]);
        let overrides = cli.overrides();
        assert!(overrides.cache_ttl.is_none());
        assert!(overrides.sweep_interval.is_none());
        assert!(overrides.base_url.is_none());
        assert!(overrides.request_timeout.is_none());
    }

    #[test]
    fn test_cli_ttl_and_sweep_are_independent() {
        let cli = Cli::parse_from(["pokedex", "--ttl", "5s", "--sweep-interval", "500ms"]);
        assert_eq!(cli.ttl, Some(Duration::from_secs(5)));
        assert_eq!(cli.sweep_interval, Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_parse_duration_arg_invalid_returns_error() {
        assert!(parse_duration_arg("soon").is_err());
    }

    #[test]
    fn test_startup_config_base_url_override() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        let path_str = path.to_string_lossy().to_string();

        let cli = Cli::parse_from([
            "pokedex",
            "--config",
            path_str.as_str(),
            "--base-url",
            "http://localhost:3000/api/v2/",
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();

        assert_eq!(config.app.base_url, "http://localhost:3000/api/v2");
        assert_eq!(config.log_filter, "warn");
    }
}
