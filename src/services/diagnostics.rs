//! Diagnostics over parsed structures

use super::dialect::{self, CONTROL_KEY, Dialect};
use crate::error::ParseError;
use crate::infra::text::LineIndex;
use crate::models::diagnostic::{Diagnostic, DiagnosticCode, DiagnosticSeverity};
use crate::models::lsp::{Position, Range};
use crate::models::structure::{Field, Structure};

/// Diagnose one document from the outcome of parsing it.
///
/// Parse failures become a single diagnostic; otherwise every field of a
/// dialect struct is checked for duplicate keys, missing required keys and
/// unknown control tokens.
pub fn diagnose(
    text: &str,
    parsed: &Result<Vec<Structure>, ParseError>,
    dialect: &Dialect,
) -> Vec<Diagnostic> {
    let index = LineIndex::new(text);
    match parsed {
        Ok(structures) => structures
            .iter()
            .filter(|s| dialect.applies_to(s))
            .flat_map(|s| s.fields.iter())
            .flat_map(|field| field_diagnostics(&index, field, dialect))
            .collect(),
        Err(e) => vec![parse_error(&index, e)],
    }
}

fn field_diagnostics(index: &LineIndex, field: &Field, dialect: &Dialect) -> Vec<Diagnostic> {
    let range = field_range(index, field);
    let mut diagnostics = Vec::new();

    for key in field.tags.duplicate_keys() {
        diagnostics.push(
            Diagnostic::new(
                range,
                DiagnosticSeverity::Warning,
                format!("Duplicate tag key '{}' on field '{}'", key, field.name),
            )
            .with_code(DiagnosticCode::DuplicateTag),
        );
    }

    if let Some(diagnostic) = missing_tags(index, field, dialect) {
        diagnostics.push(diagnostic);
    }

    if let Ok(ctl) = field.tags.get(CONTROL_KEY)
        && dialect::control_token(&ctl.name).is_none()
    {
        let known: Vec<_> = dialect::CONTROL_TOKENS.iter().map(|t| t.name).collect();
        diagnostics.push(
            Diagnostic::new(
                range,
                DiagnosticSeverity::Warning,
                format!(
                    "Unknown control token '{}' (expected one of: {})",
                    ctl.name,
                    known.join(", ")
                ),
            )
            .with_code(DiagnosticCode::UnknownControl),
        );
    }

    diagnostics
}

/// The missing-required-tags warning for `field`, if it lacks any.
pub fn missing_tags(index: &LineIndex, field: &Field, dialect: &Dialect) -> Option<Diagnostic> {
    let missing = dialect.missing(&field.tags);
    if missing.is_empty() {
        return None;
    }
    Some(
        Diagnostic::new(
            field_range(index, field),
            DiagnosticSeverity::Warning,
            format!(
                "Field '{}' is missing required tags: {}",
                field.name,
                missing.join(", ")
            ),
        )
        .with_code(DiagnosticCode::MissingTags),
    )
}

pub fn field_range(index: &LineIndex, field: &Field) -> Range {
    index.range(field.start, field.end)
}

fn parse_error(index: &LineIndex, error: &ParseError) -> Diagnostic {
    match error {
        ParseError::Syntax { line, column, .. } => {
            let offset = index.line_start(*line) + *column as usize;
            Diagnostic::new(
                Range::point(index.position(offset)),
                DiagnosticSeverity::Error,
                error.to_string(),
            )
            .with_code(DiagnosticCode::SyntaxError)
        }
        ParseError::Tag { start, end, .. } => Diagnostic::new(
            index.range(*start, *end),
            DiagnosticSeverity::Error,
            error.to_string(),
        )
        .with_code(DiagnosticCode::InvalidTag),
        ParseError::Grammar(_) | ParseError::Task(_) => Diagnostic::new(
            Range::point(Position::default()),
            DiagnosticSeverity::Error,
            error.to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::StructParser;

    async fn run(src: &str) -> Vec<Diagnostic> {
        let parsed = StructParser::new().unwrap().parse(src).await;
        diagnose(src, &parsed, &Dialect::default())
    }

    #[tokio::test]
    async fn test_missing_required_tags_at_field_range() {
        let src = "type T struct {\n\tA string `json:\"a\" hSel:\"tr td:nth-child(1)\"`\n}\n";
        let diagnostics = run(src).await;
        assert_eq!(diagnostics.len(), 1);

        let diag = &diagnostics[0];
        assert_eq!(diag.code, Some(DiagnosticCode::MissingTags));
        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert!(diag.message.contains("dSel, ctl"));
        assert_eq!(diag.range.start, Position::new(1, 1));
        assert_eq!(
            diag.range.end,
            Position::new(1, "\tA string `json:\"a\" hSel:\"tr td:nth-child(1)\"`".len() as u32)
        );
    }

    #[tokio::test]
    async fn test_complete_fields_are_clean() {
        let src = "type T struct {\n\tA string `hSel:\"th\" dSel:\"td\" ctl:\"text\"`\n\tB int\n}\n";
        assert!(run(src).await.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_structs_not_linted() {
        let src = "type Config struct {\n\tName string `json:\"name\" yaml:\"name\"`\n}\n";
        assert!(run(src).await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_and_unknown_control() {
        let src = "type T struct {\n\tA string `hSel:\"a\" hSel:\"b\" dSel:\"td\" ctl:\"html\"`\n}\n";
        let codes: Vec<_> = run(src).await.into_iter().filter_map(|d| d.code).collect();
        assert_eq!(
            codes,
            vec![DiagnosticCode::DuplicateTag, DiagnosticCode::UnknownControl]
        );
    }

    #[tokio::test]
    async fn test_tag_error_becomes_field_diagnostic() {
        let src = "type T struct {\n\tA string `hSel:\"a\"`\n\tB string `hSel:b`\n}\n";
        let diagnostics = run(src).await;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Some(DiagnosticCode::InvalidTag));
        assert_eq!(diagnostics[0].severity, DiagnosticSeverity::Error);
        assert_eq!(diagnostics[0].range.start, Position::new(2, 1));
        assert!(diagnostics[0].message.contains("'B'"));
    }

    #[tokio::test]
    async fn test_syntax_error_single_diagnostic() {
        let diagnostics = run("type T struct {\n\tA string `hSel:\"a\"`\n").await;
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, Some(DiagnosticCode::SyntaxError));
    }
}
