//! Quick fixes for tag diagnostics

use super::diagnostics;
use super::dialect::Dialect;
use crate::infra::text::LineIndex;
use crate::models::lsp::{CodeAction, CodeActionKind, Range, TextEdit, WorkspaceEdit};
use crate::models::structure::{Field, Structure};

const RAW_DELIMITER: u8 = b'`';

/// Actions for every dialect field overlapping `range`.
///
/// Only raw (backquoted) tag literals are edited; interpreted literals
/// would need their inserted quotes escaped.
pub fn code_actions(
    uri: &str,
    text: &str,
    structures: &[Structure],
    range: Range,
    dialect: &Dialect,
) -> Vec<CodeAction> {
    let index = LineIndex::new(text);
    let (start, end) = (index.offset(range.start), index.offset(range.end));

    structures
        .iter()
        .filter(|s| dialect.applies_to(s))
        .flat_map(|s| s.fields.iter())
        .filter(|f| f.start <= end && start <= f.end)
        .filter(|f| text.as_bytes().get(f.tag_start) == Some(&RAW_DELIMITER))
        .flat_map(|field| {
            let mut actions = Vec::new();
            actions.extend(insert_missing(uri, text, &index, field, dialect));
            actions.extend(remove_duplicates(uri, &index, field));
            actions
        })
        .collect()
}

fn insert_missing(
    uri: &str,
    text: &str,
    index: &LineIndex,
    field: &Field,
    dialect: &Dialect,
) -> Option<CodeAction> {
    let diagnostic = diagnostics::missing_tags(index, field, dialect)?;
    let missing = dialect.missing(&field.tags);

    let (interior_start, interior_end) = field.tag_interior();
    let interior = text.get(interior_start..interior_end).unwrap_or_default();
    let mut insertion = missing
        .iter()
        .map(|key| dialect.insertion(key))
        .collect::<Vec<_>>()
        .join(" ");
    if !interior.is_empty() && !interior.ends_with(' ') {
        insertion.insert(0, ' ');
    }

    let at = index.position(interior_end);
    Some(CodeAction {
        title: format!("Add missing tags: {}", missing.join(", ")),
        kind: CodeActionKind::QuickFix,
        is_preferred: true,
        diagnostics: vec![diagnostic],
        edit: Some(WorkspaceEdit::single(uri, vec![TextEdit::insert(at, insertion)])),
    })
}

fn remove_duplicates(uri: &str, index: &LineIndex, field: &Field) -> Option<CodeAction> {
    let duplicates = field.tags.duplicate_keys();
    if duplicates.is_empty() {
        return None;
    }

    let (interior_start, interior_end) = field.tag_interior();
    let edit = TextEdit::replace(
        index.range(interior_start, interior_end),
        field.tags.deduplicated().to_string(),
    );
    Some(CodeAction {
        title: format!("Remove duplicate tags: {}", duplicates.join(", ")),
        kind: CodeActionKind::QuickFix,
        is_preferred: false,
        diagnostics: Vec::new(),
        edit: Some(WorkspaceEdit::single(uri, vec![edit])),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::diagnostic::DiagnosticCode;
    use crate::models::lsp::Position;
    use crate::parsers::StructParser;

    const URI: &str = "file:///tmp/tables.go";

    async fn actions_for(src: &str, range: Range) -> Vec<CodeAction> {
        let structures = StructParser::new().unwrap().parse(src).await.unwrap();
        code_actions(URI, src, &structures, range, &Dialect::default())
    }

    fn apply(src: &str, edit: &TextEdit) -> String {
        let index = LineIndex::new(src);
        let (start, end) = (index.offset(edit.range.start), index.offset(edit.range.end));
        format!("{}{}{}", &src[..start], edit.new_text, &src[end..])
    }

    fn whole_file() -> Range {
        Range::new(Position::new(0, 0), Position::new(99, 0))
    }

    #[tokio::test]
    async fn test_insert_missing_before_closing_backquote() {
        let src = "type T struct {\n\tA string `json:\"a\" hSel:\"td\"`\n}\n";
        let actions = actions_for(src, whole_file()).await;
        assert_eq!(actions.len(), 1);

        let action = &actions[0];
        assert_eq!(action.title, "Add missing tags: dSel, ctl");
        assert_eq!(action.diagnostics[0].code, Some(DiagnosticCode::MissingTags));

        let edit = &action.edit.as_ref().unwrap().changes[URI][0];
        assert_eq!(
            apply(src, edit),
            "type T struct {\n\tA string `json:\"a\" hSel:\"td\" dSel:\"\" ctl:\"text\"`\n}\n"
        );
    }

    #[tokio::test]
    async fn test_remove_duplicates_keeps_first() {
        let src = "type T struct {\n\tA string `hSel:\"a\" dSel:\"td\" hSel:\"b\" ctl:\"text\"`\n}\n";
        let actions = actions_for(src, whole_file()).await;
        assert_eq!(actions.len(), 1);
        let edit = &actions[0].edit.as_ref().unwrap().changes[URI][0];
        assert_eq!(
            apply(src, edit),
            "type T struct {\n\tA string `hSel:\"a\" dSel:\"td\" ctl:\"text\"`\n}\n"
        );
    }

    #[tokio::test]
    async fn test_range_filters_fields() {
        let src = "type T struct {\n\tA string `hSel:\"a\"`\n\tB string `hSel:\"b\"`\n}\n";
        let only_b = Range::point(Position::new(2, 3));
        let actions = actions_for(src, only_b).await;
        assert_eq!(actions.len(), 1);
        assert!(actions[0].diagnostics[0].message.contains("'B'"));
    }

    #[tokio::test]
    async fn test_interpreted_literal_skipped() {
        let src = "type T struct {\n\tA string \"hSel:\\\"a\\\"\"\n}\n";
        assert!(actions_for(src, whole_file()).await.is_empty());
    }
}
