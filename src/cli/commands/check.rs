//! Check command implementation
//!
//! Runs the same diagnostics the language server publishes over files on
//! disk. Directories are walked honoring `.gitignore`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ignore::WalkBuilder;

use crate::cli::OutputContext;
use crate::cli::response::{CheckResponse, DiagnosticOutput, FileDiagnostics};
use crate::models::config::SeltablsConfig;
use crate::models::diagnostic::Diagnostic;
use crate::parsers::StructParser;
use crate::services::Dialect;
use crate::services::diagnostics;

const GO_EXTENSION: &str = "go";

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Files or directories to lint
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Exit code is 1 when any diagnostic is reported.
pub async fn execute(args: CheckArgs, config: &SeltablsConfig, ctx: &OutputContext) -> Result<i32> {
    let parser = StructParser::new()?;
    let dialect = Dialect::from(&config.lint);
    let files = go_files(&args.paths);

    let mut response = CheckResponse {
        files_checked: files.len(),
        count: 0,
        files: Vec::new(),
    };
    // join_all keeps results in file order
    let checks = files
        .iter()
        .map(|file| check_file(&parser, &dialect, file));
    let results = futures::future::join_all(checks).await;

    for (file, found) in files.iter().zip(results) {
        let found = found?;
        if found.is_empty() {
            continue;
        }
        response.count += found.len();
        response.files.push(FileDiagnostics {
            file: ctx.relative_path(file),
            count: found.len(),
            diagnostics: found.iter().map(DiagnosticOutput::from).collect(),
        });
    }

    let code = if response.count > 0 { 1 } else { 0 };
    ctx.print_success_flat(response);
    Ok(code)
}

pub async fn check_file(parser: &StructParser, dialect: &Dialect, path: &Path) -> Result<Vec<Diagnostic>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed = parser.parse(&text).await;
    Ok(diagnostics::diagnose(&text, &parsed, dialect))
}

/// Expand `paths` into a sorted list of `.go` files.
///
/// Files named explicitly are kept whatever their extension.
pub fn go_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        let walker = WalkBuilder::new(path)
            .git_ignore(true)
            .require_git(false)
            .build();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    let p = entry.path();
                    if p.is_file() && p.extension().is_some_and(|e| e == GO_EXTENSION) {
                        files.push(p.to_path_buf());
                    }
                }
                Err(e) => tracing::warn!("Skipping entry: {}", e),
            }
        }
    }
    files.sort();
    files.dedup();
    files
}
