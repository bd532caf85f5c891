// Copyright 2024-2026 Veritas SPARK Contributors
// SPDX-License-Identifier: Apache-2.0

//! fleet-core entry point.
//!
//! ## CLI Subcommands
//!
//! - `fleet-core` or `fleet-core serve` - run the gateway (default)
//! - `fleet-core health` - full health check against a running gateway (exit 0/1)
//! - `fleet-core live` - liveness probe (exit 0/1)
//! - `fleet-core ready` - readiness probe (exit 0/1)
//! - `fleet-core status [--json]` - print a status summary

use std::process::ExitCode;
use std::sync::Arc;

use fleet_core::cli::{default_base_url, run_health, run_liveness, run_readiness, run_status};
use fleet_core::config::ProgramSettings;
use fleet_core::shutdown::ShutdownResult;
use fleet_core::telemetry::{init_logging, init_metrics, LogConfig};
use fleet_core::Fleet;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("serve");

    match command {
        "serve" | "" => run_serve(&args).await,
        "health" => ExitCode::from(run_health(&default_base_url()).await as u8),
        "live" | "liveness" => ExitCode::from(run_liveness(&default_base_url()).await as u8),
        "ready" | "readiness" => ExitCode::from(run_readiness(&default_base_url()).await as u8),
        "status" => {
            let json_output = args.get(2).map(|s| s.as_str()) == Some("--json");
            ExitCode::from(run_status(&default_base_url(), json_output).await as u8)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("fleet-core {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

async fn run_serve(args: &[String]) -> ExitCode {
    if let Err(e) = init_logging(LogConfig::default()) {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }
    init_metrics();

    let config_path = config_path_from_args(args);
    let settings = match config_path {
        Some(path) => match ProgramSettings::load(std::path::Path::new(&path)) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("failed to load config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => ProgramSettings::default(),
    };

    let fleet = match Fleet::bootstrap(settings) {
        Ok(fleet) => Arc::new(fleet),
        Err(e) => {
            eprintln!("bootstrap failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    fleet.autostart().await;

    let serve_fleet = fleet.clone();
    let server = tokio::spawn(async move { serve_fleet.serve().await });

    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to install signal handler: {}", e);
    }
    tracing::info!("shutdown signal received, draining in-flight requests");

    match fleet.shutdown.initiate(fleet.settings.shutdown_grace()).await {
        ShutdownResult::Complete => tracing::info!("shutdown complete"),
        ShutdownResult::Timeout { remaining } => {
            tracing::warn!(remaining, "shutdown grace period elapsed with requests still in flight");
        }
    }

    let names: Vec<String> = fleet.config.canonical_names().into_iter().cloned().collect();
    for name in names {
        let _ = fleet.lifecycle.stop(&name).await;
    }

    server.abort();
    ExitCode::SUCCESS
}

fn config_path_from_args(args: &[String]) -> Option<String> {
    let mut i = 2;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "fleet-core - local LLM fleet orchestrator and OpenAI-compatible gateway v{}

USAGE:
    fleet-core [COMMAND] [OPTIONS]

COMMANDS:
    serve            Run the gateway (default when no command given)
    health           Full health check (exit 0 if healthy, 1 if unhealthy)
    live             Liveness probe (exit 0 if alive)
    ready            Readiness probe (exit 0 if ready)
    status           Show fleet status and per-model lifecycle state
    version          Show version information
    help             Show this help message

OPTIONS:
    --config PATH    Load program settings from PATH (serve only)
    --json           Output in JSON format (status only)
    -h, --help       Show help
    -V, --version    Show version information

ENVIRONMENT:
    FLEET_CORE_URL   Base URL used by health/ready/live/status (default: http://127.0.0.1:8080)
    RUST_LOG         Log level (debug, info, warn, error)

EXIT CODES:
    0  Success / Healthy
    1  Failure / Unhealthy
    3  Connection error (status only)
",
        version
    );
}
