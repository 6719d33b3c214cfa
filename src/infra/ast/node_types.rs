//! Tree-sitter Node Type Names
//!
//! Verified against tree-sitter-go/src/node-types.json.

pub mod kinds {
    pub const STRUCT_TYPE: &str = "struct_type";
    pub const FIELD_DECLARATION_LIST: &str = "field_declaration_list";
    pub const FIELD_DECLARATION: &str = "field_declaration";
    pub const TYPE_SPEC: &str = "type_spec";
    pub const TYPE_DECLARATION: &str = "type_declaration";
    pub const COMMENT: &str = "comment";
    pub const RAW_STRING_LITERAL: &str = "raw_string_literal";
    pub const INTERPRETED_STRING_LITERAL: &str = "interpreted_string_literal";
}

/// Whether a node kind can carry a struct tag.
pub fn is_tag_literal(kind: &str) -> bool {
    matches!(
        kind,
        kinds::RAW_STRING_LITERAL | kinds::INTERPRETED_STRING_LITERAL
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_literal_kinds() {
        assert!(is_tag_literal("raw_string_literal"));
        assert!(is_tag_literal("interpreted_string_literal"));
        assert!(!is_tag_literal(kinds::COMMENT));
    }
}
