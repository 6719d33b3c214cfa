//! Go syntax infrastructure for seltabls
//!
//! Tree-sitter based extraction of struct declarations from (possibly
//! package-less) Go source fragments. Results are owned values so tag parsing
//! can fan out without holding the tree.

pub mod literal;
pub mod node_types;

use std::sync::Mutex;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, Tree};

use crate::error::ParseError;
use literal::unquote;
use node_types::{is_tag_literal, kinds};

/// Header prepended to fragments that carry no package clause.
pub const SYNTHETIC_PACKAGE: &str = "package main\n";

/// A Go fragment plus the bookkeeping needed to map positions back to it.
#[derive(Debug, Clone)]
pub struct GoSource {
    text: String,
    prefix_len: usize,
    prefix_lines: u32,
}

impl GoSource {
    pub fn new(fragment: &str) -> Self {
        if fragment.contains("package ") {
            return Self {
                text: fragment.to_string(),
                prefix_len: 0,
                prefix_lines: 0,
            };
        }
        Self {
            text: format!("{}{}", SYNTHETIC_PACKAGE, fragment),
            prefix_len: SYNTHETIC_PACKAGE.len(),
            prefix_lines: 1,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset relative to the original fragment.
    pub fn offset(&self, byte: usize) -> usize {
        byte.saturating_sub(self.prefix_len)
    }

    /// 0-based line relative to the original fragment.
    pub fn line(&self, row: usize) -> u32 {
        (row as u32).saturating_sub(self.prefix_lines)
    }
}

/// A struct type node with its tagged and untagged field declarations.
#[derive(Debug, Clone)]
pub struct StructDecl {
    /// Comment lines directly above the enclosing type declaration
    pub doc: Vec<String>,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: String,
    pub line: u32,
    pub start: usize,
    pub end: usize,
    pub tag: Option<TagLiteral>,
}

/// A field's tag literal, delimiters stripped (and unescaped for `"..."` literals).
#[derive(Debug, Clone)]
pub struct TagLiteral {
    pub raw: String,
    /// Offset of the opening delimiter in the original fragment
    pub start: usize,
}

/// Thread-safe Go parser with a precompiled struct query.
pub struct GoParser {
    parser: Mutex<Parser>,
    structs: Query,
}

impl GoParser {
    pub fn new() -> Result<Self, ParseError> {
        let language: Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::Grammar(e.to_string()))?;
        let pattern = format!("({}) @struct", kinds::STRUCT_TYPE);
        let structs =
            Query::new(&language, &pattern).map_err(|e| ParseError::Grammar(e.to_string()))?;

        Ok(Self {
            parser: Mutex::new(parser),
            structs,
        })
    }

    fn parse_tree(&self, source: &GoSource) -> Result<Tree, ParseError> {
        let mut parser = self
            .parser
            .lock()
            .map_err(|_| ParseError::Grammar("Parser lock poisoned".to_string()))?;
        parser
            .parse(source.text(), None)
            .ok_or_else(|| ParseError::Grammar("Parser returned no tree".to_string()))
    }

    /// Extract every struct type (nested ones included) in file order.
    ///
    /// Fails with [`ParseError::Syntax`] at the first error node when the
    /// fragment does not parse cleanly.
    pub fn struct_decls(&self, fragment: &str) -> Result<Vec<StructDecl>, ParseError> {
        let source = GoSource::new(fragment);
        let tree = self.parse_tree(&source)?;
        let root = tree.root_node();
        let bytes = source.text().as_bytes();

        if root.has_error() {
            return Err(syntax_error(&source, root));
        }

        let mut cursor = QueryCursor::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut matches = cursor.matches(&self.structs, root, bytes);
        while let Some(query_match) = matches.next() {
            nodes.extend(query_match.captures.iter().map(|c| c.node));
        }
        nodes.sort_by_key(|n| n.start_byte());
        nodes.dedup_by_key(|n| n.start_byte());

        Ok(nodes
            .into_iter()
            .map(|node| StructDecl {
                doc: doc_comment(node, bytes),
                fields: field_decls(&source, node, bytes),
            })
            .collect())
    }
}

fn text<'a>(node: Node, bytes: &'a [u8]) -> &'a str {
    node.utf8_text(bytes).unwrap_or_default()
}

fn field_decls(source: &GoSource, struct_node: Node, bytes: &[u8]) -> Vec<FieldDecl> {
    let mut cursor = struct_node.walk();
    let Some(list) = struct_node
        .named_children(&mut cursor)
        .find(|n| n.kind() == kinds::FIELD_DECLARATION_LIST)
    else {
        return Vec::new();
    };

    let mut list_cursor = list.walk();
    list.named_children(&mut list_cursor)
        .filter(|n| n.kind() == kinds::FIELD_DECLARATION)
        .filter_map(|field| {
            let type_node = field.child_by_field_name("type")?;
            let type_name = text(type_node, bytes).to_string();
            let name = field
                .child_by_field_name("name")
                .map(|n| text(n, bytes).to_string())
                .unwrap_or_else(|| embedded_name(&type_name));

            let tag = field
                .child_by_field_name("tag")
                .filter(|t| is_tag_literal(t.kind()))
                .map(|tag| {
                    let literal = text(tag, bytes);
                    let stripped = literal.get(1..literal.len().saturating_sub(1));
                    let raw = match tag.kind() {
                        kinds::INTERPRETED_STRING_LITERAL => unquote(literal),
                        _ => None,
                    }
                    .or_else(|| stripped.map(String::from))
                    .unwrap_or_default();
                    TagLiteral {
                        raw,
                        start: source.offset(tag.start_byte()),
                    }
                });

            Some(FieldDecl {
                name,
                type_name,
                line: source.line(field.start_position().row),
                start: source.offset(field.start_byte()),
                end: source.offset(field.end_byte()),
                tag,
            })
        })
        .collect()
}

/// Embedded fields are named after their type: `*pkg.Base` -> `Base`.
fn embedded_name(type_name: &str) -> String {
    let bare = type_name.trim_start_matches('*');
    let bare = bare.split('[').next().unwrap_or(bare);
    bare.rsplit('.').next().unwrap_or(bare).to_string()
}

/// Comment lines immediately above `type X struct {...}`.
fn doc_comment(struct_node: Node, bytes: &[u8]) -> Vec<String> {
    let Some(decl) = struct_node
        .parent()
        .filter(|p| p.kind() == kinds::TYPE_SPEC)
        .and_then(|spec| spec.parent())
        .filter(|d| d.kind() == kinds::TYPE_DECLARATION)
    else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    let mut next_row = decl.start_position().row;
    let mut current = decl.prev_named_sibling();
    while let Some(comment) = current {
        if comment.kind() != kinds::COMMENT || comment.end_position().row + 1 < next_row {
            break;
        }
        lines.push(text(comment, bytes).to_string());
        next_row = comment.start_position().row;
        current = comment.prev_named_sibling();
    }
    lines.reverse();
    lines
}

fn syntax_error(source: &GoSource, root: Node) -> ParseError {
    let node = first_error(root).unwrap_or(root);
    let position = node.start_position();
    let message = if node.is_missing() {
        format!("missing {}", node.kind())
    } else {
        let snippet: String = text(node, source.text().as_bytes()).chars().take(20).collect();
        format!("unexpected {:?}", snippet)
    };

    ParseError::Syntax {
        line: source.line(position.row),
        column: position.column as u32,
        message,
    }
}

/// Pre-order search for the first ERROR or MISSING node.
fn first_error(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_package_only_when_missing() {
        let wrapped = GoSource::new("type A struct{}");
        assert!(wrapped.text().starts_with(SYNTHETIC_PACKAGE));
        assert_eq!(wrapped.offset(SYNTHETIC_PACKAGE.len() + 5), 5);
        assert_eq!(wrapped.line(3), 2);

        let plain = GoSource::new("package foo\ntype A struct{}");
        assert_eq!(plain.text(), "package foo\ntype A struct{}");
        assert_eq!(plain.offset(7), 7);
    }

    #[test]
    fn test_struct_decls_offsets_relative_to_fragment() {
        let parser = GoParser::new().unwrap();
        let src = "type T struct {\n\tA string `json:\"a\"`\n}\n";
        let decls = parser.struct_decls(src).unwrap();
        assert_eq!(decls.len(), 1);

        let field = &decls[0].fields[0];
        assert_eq!(field.name, "A");
        assert_eq!(field.type_name, "string");
        assert_eq!(field.line, 1);
        assert_eq!(&src[field.start..field.end], "A string `json:\"a\"`");

        let tag = field.tag.as_ref().unwrap();
        assert_eq!(tag.raw, "json:\"a\"");
        assert_eq!(&src[tag.start..tag.start + 1], "`");
    }

    #[test]
    fn test_nested_structs_in_file_order() {
        let parser = GoParser::new().unwrap();
        let src = "type Outer struct {\n\tIn struct {\n\t\tX int `a:\"x\"`\n\t} `b:\"in\"`\n}\ntype Second struct {\n\tY int\n}\n";
        let decls = parser.struct_decls(src).unwrap();
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].fields[0].name, "In");
        assert_eq!(decls[1].fields[0].name, "X");
        assert_eq!(decls[2].fields[0].name, "Y");
        assert!(decls[2].fields[0].tag.is_none());
    }

    #[test]
    fn test_interpreted_tag_literal_unescaped() {
        let parser = GoParser::new().unwrap();
        let decls = parser
            .struct_decls("type T struct {\n\tA string \"hSel:\\\"td\\\"\"\n}\n")
            .unwrap();
        let tag = decls[0].fields[0].tag.as_ref().unwrap();
        assert_eq!(tag.raw, "hSel:\"td\"");
    }

    #[test]
    fn test_embedded_field_name() {
        assert_eq!(embedded_name("*pkg.Base"), "Base");
        assert_eq!(embedded_name("Base"), "Base");
        assert_eq!(embedded_name("List[int]"), "List");
    }

    #[test]
    fn test_doc_comment_collected() {
        let parser = GoParser::new().unwrap();
        let src = "// Fixture is a table\n// @url: https://example.com\ntype Fixture struct {\n\tA string `hSel:\"td\"`\n}\n";
        let decls = parser.struct_decls(src).unwrap();
        assert_eq!(
            decls[0].doc,
            vec!["// Fixture is a table", "// @url: https://example.com"]
        );
    }

    #[test]
    fn test_syntax_error_reported_in_fragment_lines() {
        let parser = GoParser::new().unwrap();
        let err = parser
            .struct_decls("type T struct {\n\tA string `json:\"a\"`\n")
            .unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }
}
