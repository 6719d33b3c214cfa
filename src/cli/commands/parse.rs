//! Parse command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::OutputContext;
use crate::cli::response::ParseResponse;
use crate::parsers::StructParser;

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// Go file to parse
    pub file: PathBuf,
}

pub async fn execute(args: ParseArgs, ctx: &OutputContext) -> Result<i32> {
    let source = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let parser = StructParser::new()?;
    match parser.parse(&source).await {
        Ok(structures) => {
            ctx.print_success_flat(ParseResponse {
                file: ctx.relative_path(&args.file),
                structures,
            });
            Ok(0)
        }
        Err(e) => {
            ctx.print_error(&e.to_string());
            Ok(1)
        }
    }
}
