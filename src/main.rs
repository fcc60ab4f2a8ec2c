//! design-mutation-mcp: MCP server for editing remotely hosted design documents
//!
//! Exposes optimistic-concurrency change submission as MCP tools over stdio.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use design_mutation_mcp::config::{self, Config};
use design_mutation_mcp::error::StartupError;
use design_mutation_mcp::mcp::McpServer;
use design_mutation_mcp::remote::RpcTransport;
use design_mutation_mcp::session::MutationSession;

/// MCP server for editing remotely hosted design documents.
///
/// Each tool call reads the document's current revision, encodes the
/// requested changes and submits them as one all-or-nothing batch.
#[derive(Parser, Debug)]
#[command(name = "design-mutation-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. Logs go to stderr; stdout carries MCP.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the server stack and runs it until shutdown.
fn serve(cfg: &Config) -> Result<(), StartupError> {
    let transport = RpcTransport::from_config(&cfg.remote)?;
    let session = MutationSession::new(transport);

    info!(
        base_url = %cfg.remote.base_url,
        session_id = %session.session_id(),
        authenticated = cfg.remote.resolved_access_token().is_some(),
        "Remote transport configured"
    );

    let mut server = McpServer::new(session);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    info!("MCP server ready, waiting for client connection...");
    runtime.block_on(server.run())?;
    Ok(())
}

/// Entry point for the design-mutation-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", StartupError::from(e));
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nExpected config at: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting design-mutation-mcp server"
    );

    match serve(&cfg) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
