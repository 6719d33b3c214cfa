//! Diagnostic model for LSP integration

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use super::lsp::Range;

/// Source label attached to every diagnostic this server produces.
pub const DIAGNOSTIC_SOURCE: &str = "seltabls";

/// LSP diagnostic information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: DiagnosticSeverity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<DiagnosticCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn new(range: Range, severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            range,
            severity,
            message: message.into(),
            code: None,
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
        }
    }

    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn display_line(&self) -> u32 {
        self.range.start.line + 1
    }

    pub fn display_column(&self) -> u32 {
        self.range.start.character + 1
    }
}

/// Severity levels (LSP numbering, serialized as numbers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl std::fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Information => write!(f, "info"),
            Self::Hint => write!(f, "hint"),
        }
    }
}

/// Machine-readable diagnostic kinds; code actions key off these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    SyntaxError,
    InvalidTag,
    DuplicateTag,
    MissingTags,
    UnknownControl,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lsp::Position;

    #[test]
    fn test_diagnostic_wire_shape() {
        let diag = Diagnostic::new(
            Range::new(Position::new(2, 1), Position::new(2, 9)),
            DiagnosticSeverity::Warning,
            "missing tags",
        )
        .with_code(DiagnosticCode::MissingTags);

        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["severity"], 2);
        assert_eq!(json["code"], "missing-tags");
        assert_eq!(json["source"], "seltabls");
        assert_eq!(diag.display_line(), 3);
    }

    #[test]
    fn test_client_diagnostic_without_code_parses() {
        let diag: Diagnostic = serde_json::from_value(serde_json::json!({
            "range": {"start": {"line": 0, "character": 0}, "end": {"line": 0, "character": 1}},
            "severity": 1,
            "message": "x"
        }))
        .unwrap();
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert!(diag.code.is_none());
    }
}
