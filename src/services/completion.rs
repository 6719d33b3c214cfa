//! Tag key and control token completion

use super::dialect::{self, CONTROL_KEY};
use crate::infra::text::LineIndex;
use crate::models::lsp::{CompletionItem, CompletionItemKind, Position};
use crate::models::structure::Structure;

const RAW_DELIMITER: u8 = b'`';

/// Where the cursor sits inside a tag literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagContext<'a> {
    Key,
    Value { key: &'a str },
}

/// Completions at `position`. Empty outside raw (backquoted) tag literals;
/// inside interpreted literals the value quotes are escaped.
pub fn complete(text: &str, structures: &[Structure], position: Position) -> Vec<CompletionItem> {
    let offset = LineIndex::new(text).offset(position);
    let Some(field) = structures
        .iter()
        .flat_map(|s| s.fields.iter())
        .find(|f| f.tag_start < offset && offset < f.end)
    else {
        return Vec::new();
    };
    if text.as_bytes().get(field.tag_start) != Some(&RAW_DELIMITER) {
        return Vec::new();
    }

    let Some(prefix) = text.get(field.tag_start + 1..offset) else {
        return Vec::new();
    };

    match tag_context(prefix) {
        TagContext::Value { key } if key == CONTROL_KEY => control_items(),
        TagContext::Value { .. } => Vec::new(),
        TagContext::Key => key_items(),
    }
}

fn key_items() -> Vec<CompletionItem> {
    dialect::TAG_KEYS
        .iter()
        .map(|key| CompletionItem {
            label: key.name.to_string(),
            kind: CompletionItemKind::Property,
            detail: Some(key.detail.to_string()),
            documentation: Some(key.doc.to_string()),
            insert_text: Some(format!("{}:\"{}\"", key.name, key.default_value)),
        })
        .collect()
}

fn control_items() -> Vec<CompletionItem> {
    dialect::CONTROL_TOKENS
        .iter()
        .map(|token| CompletionItem {
            label: token.name.to_string(),
            kind: CompletionItemKind::EnumMember,
            detail: Some(format!("{} token", CONTROL_KEY)),
            documentation: Some(token.doc.to_string()),
            insert_text: None,
        })
        .collect()
}

/// Scan the literal up to the cursor, tracking quoted values.
fn tag_context(prefix: &str) -> TagContext<'_> {
    let bytes = prefix.as_bytes();
    let mut key_start = 0;
    let mut key = "";
    let mut in_value = false;

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if in_value => i += 1,
            b'"' if in_value => in_value = false,
            b'"' if i > 0 && bytes[i - 1] == b':' => {
                key = prefix[key_start..i - 1].trim();
                in_value = true;
            }
            b' ' if !in_value => key_start = i + 1,
            _ => {}
        }
        i += 1;
    }

    if in_value {
        TagContext::Value { key }
    } else {
        TagContext::Key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::StructParser;

    async fn complete_at(src: &str, marker: &str) -> Vec<CompletionItem> {
        let offset = src.find(marker).unwrap();
        let position = LineIndex::new(src).position(offset);
        let structures = StructParser::new().unwrap().parse(src).await.unwrap();
        complete(src, &structures, position)
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    #[test]
    fn test_tag_context() {
        assert_eq!(tag_context(""), TagContext::Key);
        assert_eq!(tag_context(r#"json:"a" "#), TagContext::Key);
        assert_eq!(tag_context(r#"json:"a" ctl:""#), TagContext::Value { key: "ctl" });
        assert_eq!(
            tag_context(r#"hSel:"a[x=\"y"#),
            TagContext::Value { key: "hSel" }
        );
    }

    #[tokio::test]
    async fn test_keys_between_tags() {
        let src = "type T struct {\n\tA string `json:\"a\"  hSel:\"td\"`\n}\n";
        let items = complete_at(src, "  hSel").await;
        assert_eq!(
            labels(&items),
            vec!["seltabl", "hSel", "dSel", "qSel", "ctl", "must"]
        );
        assert_eq!(items[1].insert_text.as_deref(), Some("hSel:\"\""));
    }

    #[tokio::test]
    async fn test_control_tokens_inside_ctl_value() {
        let src = "type T struct {\n\tA string `hSel:\"td\" ctl:\"\"`\n}\n";
        let offset = src.find("ctl:\"").unwrap() + 5;
        let position = LineIndex::new(src).position(offset);
        let structures = StructParser::new().unwrap().parse(src).await.unwrap();
        let items = complete(src, &structures, position);
        assert_eq!(labels(&items), vec!["text", "query"]);
        assert_eq!(items[0].kind, CompletionItemKind::EnumMember);
    }

    #[tokio::test]
    async fn test_nothing_inside_selector_value_or_outside_tags() {
        let src = "type T struct {\n\tA string `hSel:\"td\"`\n}\n";
        assert!(complete_at(src, "d\"`").await.is_empty());
        assert!(complete_at(src, "string").await.is_empty());
    }

    #[tokio::test]
    async fn test_nothing_inside_interpreted_literal() {
        let src = "type T struct {\n\tA string \"hSel:\\\"td\\\" ctl:\\\"\\\"\"\n}\n";
        let structures = StructParser::new().unwrap().parse(src).await.unwrap();
        assert_eq!(structures[0].fields.len(), 1);

        let offset = src.find("ctl:").unwrap() + 6;
        let position = LineIndex::new(src).position(offset);
        assert!(complete(src, &structures, position).is_empty());
        assert!(complete_at(src, "hSel").await.is_empty());
    }
}
