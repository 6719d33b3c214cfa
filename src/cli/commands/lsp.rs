//! Language server command

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use crate::models::config::SeltablsConfig;
use crate::server::{Server, TracingLog};

#[derive(Args, Debug, Clone, Default)]
pub struct LspArgs {
    /// Log file (default: <config dir>/seltabls/seltabls.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Serve stdin/stdout until exit. Returns the process exit code.
pub async fn execute(config: &SeltablsConfig) -> Result<i32> {
    let log = Arc::new(TracingLog::new(config.server.log_response_limit));
    let mut server = Server::from_config(config, log)?;

    match server.run(tokio::io::stdin(), tokio::io::stdout()).await {
        Ok(code) => Ok(code),
        Err(e) => {
            tracing::error!("Language server terminated: {}", e);
            Ok(1)
        }
    }
}
