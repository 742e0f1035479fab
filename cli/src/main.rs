// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # S2T Accelerator Gateway
//!
//! The `s2t-gateway` binary exposes the accelerator operation catalog over
//! MCP transports.
//!
//! ## Commands
//!
//! - `s2t-gateway serve` - streamable HTTP + legacy SSE transports (default)
//! - `s2t-gateway stdio` - point-to-point JSON-RPC over stdin/stdout
//!
//! Configuration comes from `S2T_*` environment variables; `S2T_API_KEY`
//! is required and startup fails before serving any traffic without it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use s2t_gateway_core::infrastructure::config::GatewayConfig;

mod server;

/// S2T Accelerator Gateway - MCP access to the accelerator platform
#[derive(Parser)]
#[command(name = "s2t-gateway")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Listen port for the HTTP transports (default: 3001)
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "S2T_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the streamable HTTP and legacy SSE transports
    Serve,

    /// Speak JSON-RPC over stdin/stdout
    Stdio,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    // In stdio mode stdout carries protocol messages, so logs go to stderr.
    init_tracing(&cli.log_level, matches!(command, Commands::Stdio));

    let mut config = GatewayConfig::from_env().context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    match command {
        Commands::Serve => server::serve(config).await,
        Commands::Stdio => server::run_stdio(config).await,
    }
}

fn init_tracing(level: &str, to_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
}
