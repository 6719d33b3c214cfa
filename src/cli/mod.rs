//! CLI module for seltabls
//!
//! Provides command-line interface using clap derive macros.

pub mod commands;
pub mod output;
pub mod response;

pub use output::OutputContext;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{check::CheckArgs, lsp::LspArgs, parse::ParseArgs};

const LONG_ABOUT: &str = r#"
seltabls - language server for seltabl struct-tag selectors

Lints Go structs whose field tags carry seltabl selectors (hSel, dSel, ctl, ...),
and offers completion, hover and quick fixes for them in any LSP editor.

EXAMPLES:
  seltabls                         # Serve LSP over stdin/stdout
  seltabls lsp --log-file /tmp/seltabls.log
  seltabls check ./scrapers        # Lint every .go file, JSON output
  seltabls parse tables.go         # Dump parsed structs as JSON
"#;

/// seltabls - language server for seltabl struct-tag selectors
#[derive(Parser, Debug)]
#[command(name = "seltabls")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
#[command(after_help = "Use 'seltabls <COMMAND> --help' for more information about a command.")]
pub struct Cli {
    /// Defaults to `lsp`
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: $XDG_CONFIG_HOME/seltabls/config.toml)
    #[arg(long, global = true, env = "SELTABLS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Lsp(LspArgs::default()))
    }

    pub fn is_lsp(&self) -> bool {
        matches!(self.command, None | Some(Commands::Lsp(_)))
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the language server over stdin/stdout
    Lsp(LspArgs),

    /// Lint .go files and print diagnostics as JSON
    Check(CheckArgs),

    /// Print the parsed structs of one file as JSON
    Parse(ParseArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_lsp() {
        let cli = Cli::try_parse_from(["seltabls"]).unwrap();
        assert!(cli.is_lsp());
        assert!(matches!(cli.command(), Commands::Lsp(_)));
    }

    #[test]
    fn test_check_paths() {
        let cli = Cli::try_parse_from(["seltabls", "check", "a.go", "dir"]).unwrap();
        let Commands::Check(args) = cli.command() else {
            panic!("expected check");
        };
        assert_eq!(args.paths, vec![PathBuf::from("a.go"), PathBuf::from("dir")]);
        assert!(!cli.is_lsp());
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["seltabls", "parse", "t.go", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn test_check_requires_path() {
        assert!(Cli::try_parse_from(["seltabls", "check"]).is_err());
    }
}
