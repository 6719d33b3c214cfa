//! Parsed struct model
//!
//! One [`Structure`] per Go struct type; each tagged field becomes a
//! [`Field`] carrying its parsed [`Tags`].

use serde::{Deserialize, Serialize};

use crate::error::TagError;
use crate::infra::ast::literal::quote;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub fields: Vec<Field>,
    /// Page the struct scrapes (`@url:` annotation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Elements stripped before selector discovery (`@ignore-elements:`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignores: Vec<String>,
}

impl Structure {
    /// First field whose declaration span contains `offset`.
    pub fn field_at(&self, offset: usize) -> Option<&Field> {
        self.fields.iter().find(|f| f.contains(offset))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    /// 0-based line of the declaration
    pub line: u32,
    /// Byte span of the declaration, tag literal included
    pub start: usize,
    pub end: usize,
    /// Offset of the tag literal's opening delimiter
    pub tag_start: usize,
    pub tags: Tags,
}

impl Field {
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// Byte span of the tag literal's interior (delimiters excluded).
    pub fn tag_interior(&self) -> (usize, usize) {
        (self.tag_start + 1, self.end.saturating_sub(1).max(self.tag_start + 1))
    }
}

/// A single `key:"name,opt1,opt2"` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Position of the owning field, not of the tag itself
    pub line: u32,
    pub start: usize,
    pub end: usize,
}

impl Tag {
    pub fn has_option(&self, option: &str) -> bool {
        self.options.iter().any(|o| o == option)
    }

    /// The unquoted value: name and options joined by commas.
    pub fn value(&self) -> String {
        if self.options.is_empty() {
            return self.name.clone();
        }
        format!("{},{}", self.name, self.options.join(","))
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.key, quote(&self.value()))
    }
}

/// Ordered tag set of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<Tag>);

impl Tags {
    pub fn new(tags: Vec<Tag>) -> Self {
        Self(tags)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    /// First tag with `key`.
    pub fn get(&self, key: &str) -> Result<&Tag, TagError> {
        self.0.iter().find(|t| t.key == key).ok_or(TagError::NotExist)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|t| t.key == key)
    }

    /// Replace every tag sharing `tag.key`, or append when the key is new.
    pub fn set(&mut self, tag: Tag) -> Result<(), TagError> {
        if tag.key.is_empty() {
            return Err(TagError::KeyNotSet);
        }
        let mut replaced = false;
        for existing in self.0.iter_mut().filter(|t| t.key == tag.key) {
            *existing = tag.clone();
            replaced = true;
        }
        if !replaced {
            self.0.push(tag);
        }
        Ok(())
    }

    /// Append options to every tag with `key`, skipping ones already present.
    pub fn add_options<'a>(&mut self, key: &str, options: impl IntoIterator<Item = &'a str>) {
        let options: Vec<&str> = options.into_iter().collect();
        for tag in self.0.iter_mut().filter(|t| t.key == key) {
            for option in &options {
                if !tag.has_option(option) {
                    tag.options.push(option.to_string());
                }
            }
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|t| t.key.as_str()).collect()
    }

    /// Keys occurring more than once, each reported once in first-seen order.
    pub fn duplicate_keys(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dupes = Vec::new();
        for key in self.keys() {
            if !seen.insert(key) && !dupes.contains(&key) {
                dupes.push(key);
            }
        }
        dupes
    }

    /// Copy keeping only the first tag for each key.
    pub fn deduplicated(&self) -> Tags {
        let mut seen = std::collections::HashSet::new();
        Tags(
            self.0
                .iter()
                .filter(|t| seen.insert(t.key.as_str()))
                .cloned()
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for Tags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", tag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(key: &str, name: &str, options: &[&str]) -> Tag {
        Tag {
            key: key.into(),
            name: name.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            line: 0,
            start: 0,
            end: 0,
        }
    }

    #[test]
    fn test_get_and_set() {
        let mut tags = Tags::new(vec![tag("json", "a", &[])]);
        assert_eq!(tags.get("json").unwrap().name, "a");
        assert_eq!(tags.get("yaml"), Err(TagError::NotExist));

        tags.set(tag("json", "b", &["omitempty"])).unwrap();
        tags.set(tag("hSel", "td", &[])).unwrap();
        assert_eq!(tags.keys(), vec!["json", "hSel"]);
        assert_eq!(tags.get("json").unwrap().value(), "b,omitempty");

        assert_eq!(tags.set(tag("", "x", &[])), Err(TagError::KeyNotSet));
    }

    #[test]
    fn test_add_options_skips_existing() {
        let mut tags = Tags::new(vec![tag("json", "a", &["omitempty"])]);
        tags.add_options("json", ["omitempty", "string"]);
        tags.add_options("missing", ["x"]);
        assert_eq!(tags.get("json").unwrap().options, vec!["omitempty", "string"]);
        assert!(tags.get("json").unwrap().has_option("string"));
    }

    #[test]
    fn test_display_quotes_values() {
        let tags = Tags::new(vec![
            tag("json", "a", &["omitempty"]),
            tag("hSel", "tr td:nth-child(1)", &[]),
            tag("dSel", "say \"hi\"", &[]),
        ]);
        assert_eq!(
            tags.to_string(),
            r#"json:"a,omitempty" hSel:"tr td:nth-child(1)" dSel:"say \"hi\"""#
        );
        assert_eq!(Tags::default().to_string(), "");
    }

    #[test]
    fn test_duplicates() {
        let tags = Tags::new(vec![
            tag("hSel", "a", &[]),
            tag("dSel", "b", &[]),
            tag("hSel", "c", &[]),
            tag("hSel", "d", &[]),
        ]);
        assert_eq!(tags.duplicate_keys(), vec!["hSel"]);
        assert_eq!(tags.deduplicated().to_string(), r#"hSel:"a" dSel:"b""#);
    }

    #[test]
    fn test_field_serializes_type_key() {
        let field = Field {
            name: "A".into(),
            type_name: "string".into(),
            line: 1,
            start: 10,
            end: 30,
            tag_start: 19,
            tags: Tags::new(vec![tag("json", "a", &[])]),
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["tags"][0]["key"], "json");
        assert_eq!(field.tag_interior(), (20, 29));
        assert!(field.contains(30));
        assert!(!field.contains(31));
    }
}
