//! Response types for CLI output
//!
//! All types implement Serialize for consistent JSON output.

use serde::Serialize;

use crate::models::diagnostic::Diagnostic;
use crate::models::structure::Structure;

/// One diagnostic with 1-based display coordinates
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticOutput {
    pub severity: String,
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl From<&Diagnostic> for DiagnosticOutput {
    fn from(d: &Diagnostic) -> Self {
        Self {
            severity: d.severity.to_string(),
            message: d.message.clone(),
            line: d.display_line(),
            column: d.display_column(),
            end_line: d.range.end.line + 1,
            end_column: d.range.end.character + 1,
            code: d
                .code
                .and_then(|c| serde_json::to_value(c).ok())
                .and_then(|v| v.as_str().map(str::to_string)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileDiagnostics {
    pub file: String,
    pub count: usize,
    pub diagnostics: Vec<DiagnosticOutput>,
}

/// Output of `seltabls check`
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    pub files_checked: usize,
    pub count: usize,
    pub files: Vec<FileDiagnostics>,
}

/// Output of `seltabls parse`
#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    pub file: String,
    pub structures: Vec<Structure>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::diagnostic::{DiagnosticCode, DiagnosticSeverity};
    use crate::models::lsp::{Position, Range};

    #[test]
    fn test_diagnostic_output_is_one_based() {
        let diagnostic = Diagnostic::new(
            Range::new(Position::new(1, 1), Position::new(1, 20)),
            DiagnosticSeverity::Warning,
            "Field 'A' is missing required tags: ctl",
        )
        .with_code(DiagnosticCode::MissingTags);

        let output = DiagnosticOutput::from(&diagnostic);
        assert_eq!((output.line, output.column), (2, 2));
        assert_eq!((output.end_line, output.end_column), (2, 21));
        assert_eq!(output.code.as_deref(), Some("missing-tags"));
    }
}
