//! seltabls - language server for seltabl struct-tag selectors
//!
//! `seltabls` (or `seltabls lsp`) speaks LSP over stdin/stdout; `check` and
//! `parse` are JSON-emitting helpers for scripts and CI.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use seltabls::cli::commands::lsp::LspArgs;
use seltabls::cli::{Cli, Commands, OutputContext};
use seltabls::config;
use seltabls::models::config::SeltablsConfig;

fn main() {
    let cli = Cli::parse();

    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&cli, &e.to_string()),
    };
    init_tracing(&cli, &config);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => fail(&cli, &format!("Failed to create runtime: {}", e)),
    };

    match runtime.block_on(async_main(cli.command(), &config)) {
        Ok(code) => std::process::exit(code),
        Err(e) => fail(&cli, &e.to_string()),
    }
}

async fn async_main(command: Commands, config: &SeltablsConfig) -> anyhow::Result<i32> {
    use seltabls::cli::commands;

    let ctx = OutputContext::current();
    match command {
        Commands::Lsp(_) => commands::lsp::execute(config).await,
        Commands::Check(args) => commands::check::execute(args, config, &ctx).await,
        Commands::Parse(args) => commands::parse::execute(args, &ctx).await,
    }
}

/// stdout carries the protocol in LSP mode, so the server logs to a file.
/// Other commands log to stderr.
fn init_tracing(cli: &Cli, config: &SeltablsConfig) {
    let level = if cli.verbose { "debug" } else { config.log.level.as_str() };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("seltabls={}", level)));

    let log_file = match cli.command() {
        Commands::Lsp(LspArgs { log_file }) => log_file
            .or_else(|| config.log.file.clone())
            .or_else(config::default_log_path),
        _ => None,
    };

    match log_file.and_then(open_log) {
        Some(file) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .compact(),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .init(),
    }
}

fn open_log(path: PathBuf) -> Option<std::fs::File> {
    if let Some(parent) = path.parent()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("Cannot create log directory {}: {}", parent.display(), e);
    }
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", path.display(), e);
            None
        }
    }
}

/// Report a startup or command failure and exit with code 2.
fn fail(cli: &Cli, message: &str) -> ! {
    if cli.is_lsp() {
        eprintln!("seltabls: {}", message);
    } else {
        let response = serde_json::json!({
            "success": false,
            "error": message
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&response)
                .unwrap_or_else(|_| format!(r#"{{"success":false,"error":"{}"}}"#, message))
        );
    }
    std::process::exit(2);
}
