//! Output formatting for CLI commands

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Output context shared by the reporting commands.
#[derive(Debug, Clone)]
pub struct OutputContext {
    /// Base for relative path display
    root: PathBuf,
}

impl OutputContext {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Context rooted at the working directory.
    pub fn current() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }

    /// Convert an absolute path to relative (if within root)
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }

    /// Print a successful response with data fields at top level
    pub fn print_success_flat<T: Serialize>(&self, data: T) {
        let mut response = serde_json::to_value(data).unwrap_or(serde_json::json!({}));
        if let Some(obj) = response.as_object_mut() {
            obj.insert("success".to_string(), serde_json::json!(true));
        }
        print_json(&response);
    }

    pub fn print_error(&self, message: &str) {
        let response = serde_json::json!({
            "success": false,
            "error": message
        });
        print_json(&response);
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path() {
        let ctx = OutputContext::new(PathBuf::from("/scrapers"));

        assert_eq!(
            ctx.relative_path(Path::new("/scrapers/teams/tables.go")),
            "teams/tables.go"
        );

        // Path outside root stays absolute
        assert_eq!(ctx.relative_path(Path::new("/other/t.go")), "/other/t.go");
    }
}
