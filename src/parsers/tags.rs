//! Struct tag grammar
//!
//! Parses the interior of a field's tag literal (`json:"a,omitempty" hSel:"td"`)
//! into ordered [`Tag`]s. Pure: no I/O, no allocation beyond the result.

use crate::error::TagError;
use crate::infra::ast::literal::unquote;
use crate::models::structure::{Tag, Tags};

/// Where the owning field sits; copied onto every tag parsed from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSpan {
    pub line: u32,
    pub start: usize,
    pub end: usize,
}

/// Parse a tag literal interior. An empty or blank literal yields an empty set.
pub fn parse(literal: &str, span: FieldSpan) -> Result<Tags, TagError> {
    let mut rest = literal;
    let mut tags = Vec::new();

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        let bytes = rest.as_bytes();
        let key_len = bytes
            .iter()
            .position(|&b| b <= b' ' || b == b':' || b == b'"' || b == 0x7f)
            .unwrap_or(bytes.len());
        if key_len == 0 {
            return Err(TagError::KeySyntax);
        }
        if key_len + 1 >= bytes.len() || bytes[key_len] != b':' {
            return Err(TagError::Syntax);
        }
        if bytes[key_len + 1] != b'"' {
            return Err(TagError::ValueSyntax);
        }
        let key = &rest[..key_len];
        rest = &rest[key_len + 1..];

        let close = closing_quote(rest.as_bytes()).ok_or(TagError::ValueSyntax)?;
        let value = unquote(&rest[..=close]).ok_or(TagError::ValueSyntax)?;
        rest = &rest[close + 1..];

        let mut parts = value.split(',');
        let name = parts.next().unwrap_or_default().to_string();
        let options = parts.map(str::to_string).collect();

        tags.push(Tag {
            key: key.to_string(),
            name,
            options,
            line: span.line,
            start: span.start,
            end: span.end,
        });
    }

    Ok(Tags::new(tags))
}

/// Index of the quote closing the string that opens at `bytes[0]`.
fn closing_quote(bytes: &[u8]) -> Option<usize> {
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}
