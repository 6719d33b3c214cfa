//! The seltabl tag dialect
//!
//! Closed catalogue of tag keys and `ctl` tokens, plus the configurable
//! required-key set used for linting.

use crate::models::config::LintConfig;
use crate::models::structure::{Structure, Tags};

/// A recognized tag key with its documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagKey {
    pub name: &'static str,
    pub detail: &'static str,
    pub doc: &'static str,
    /// Value inserted by the missing-tags code action
    pub default_value: &'static str,
}

pub const CONTROL_KEY: &str = "ctl";

pub const TAG_KEYS: &[TagKey] = &[
    TagKey {
        name: "seltabl",
        detail: "column name",
        doc: "Name of the table column this field is decoded from.",
        default_value: "",
    },
    TagKey {
        name: "hSel",
        detail: "header selector",
        doc: "CSS selector matching the column's header cell.",
        default_value: "",
    },
    TagKey {
        name: "dSel",
        detail: "data selector",
        doc: "CSS selector matching the column's data cells, one per row.",
        default_value: "",
    },
    TagKey {
        name: "qSel",
        detail: "query selector",
        doc: "Selector or attribute evaluated on each data cell when `ctl:\"query\"` is set.",
        default_value: "",
    },
    TagKey {
        name: CONTROL_KEY,
        detail: "control",
        doc: "How a matched cell becomes a value: `text` or `query`.",
        default_value: "text",
    },
    TagKey {
        name: "must",
        detail: "required header text",
        doc: "Text the header cell must contain for the table to be accepted.",
        default_value: "",
    },
];

/// A recognized `ctl` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlToken {
    pub name: &'static str,
    pub doc: &'static str,
}

pub const CONTROL_TOKENS: &[ControlToken] = &[
    ControlToken {
        name: "text",
        doc: "Use the cell's inner text.",
    },
    ControlToken {
        name: "query",
        doc: "Evaluate the field's `qSel` against the cell.",
    },
];

pub fn tag_key(name: &str) -> Option<&'static TagKey> {
    TAG_KEYS.iter().find(|k| k.name == name)
}

pub fn control_token(name: &str) -> Option<&'static ControlToken> {
    CONTROL_TOKENS.iter().find(|t| t.name == name)
}

/// Linting rules derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    required: Vec<String>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self::from(&LintConfig::default())
    }
}

impl From<&LintConfig> for Dialect {
    fn from(config: &LintConfig) -> Self {
        Self {
            required: config.required_tags.clone(),
        }
    }
}

impl Dialect {
    /// Structs with only foreign tags (json, yaml, ...) are not linted.
    pub fn applies_to(&self, structure: &Structure) -> bool {
        structure
            .fields
            .iter()
            .any(|f| f.tags.iter().any(|t| tag_key(&t.key).is_some()))
    }

    /// Required keys absent from `tags`, in configured order.
    pub fn missing<'a>(&'a self, tags: &Tags) -> Vec<&'a str> {
        self.required
            .iter()
            .map(String::as_str)
            .filter(|key| !tags.contains_key(key))
            .collect()
    }

    /// `key:"value"` text for a missing key.
    pub fn insertion(&self, key: &str) -> String {
        let value = tag_key(key).map(|k| k.default_value).unwrap_or_default();
        format!("{}:\"{}\"", key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::structure::{Field, Tag};

    fn tags(keys: &[&str]) -> Tags {
        Tags::new(
            keys.iter()
                .map(|k| Tag {
                    key: k.to_string(),
                    name: String::new(),
                    options: Vec::new(),
                    line: 0,
                    start: 0,
                    end: 0,
                })
                .collect(),
        )
    }

    fn structure(keys: &[&str]) -> Structure {
        Structure {
            fields: vec![Field {
                name: "A".into(),
                type_name: "string".into(),
                line: 0,
                start: 0,
                end: 0,
                tag_start: 0,
                tags: tags(keys),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_catalogue_lookup() {
        assert_eq!(tag_key("hSel").map(|k| k.detail), Some("header selector"));
        assert!(tag_key("json").is_none());
        assert!(control_token("query").is_some());
        assert!(control_token("html").is_none());
    }

    #[test]
    fn test_missing_in_configured_order() {
        let dialect = Dialect::default();
        assert_eq!(dialect.missing(&tags(&["json", "hSel"])), vec!["dSel", "ctl"]);
        assert!(dialect.missing(&tags(&["ctl", "dSel", "hSel"])).is_empty());
    }

    #[test]
    fn test_applies_only_to_dialect_structs() {
        let dialect = Dialect::default();
        assert!(dialect.applies_to(&structure(&["json", "hSel"])));
        assert!(!dialect.applies_to(&structure(&["json", "yaml"])));
    }

    #[test]
    fn test_insertion_defaults() {
        let dialect = Dialect::default();
        assert_eq!(dialect.insertion("ctl"), r#"ctl:"text""#);
        assert_eq!(dialect.insertion("dSel"), r#"dSel:"""#);
        assert_eq!(dialect.insertion("custom"), r#"custom:"""#);
    }
}
