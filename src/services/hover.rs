//! Field hover

use super::dialect;
use crate::infra::text::LineIndex;
use crate::models::lsp::{Hover, Position};
use crate::models::structure::{Field, Structure};

/// Markdown for the first field whose declaration contains `position`.
pub fn hover(text: &str, structures: &[Structure], position: Position) -> Option<Hover> {
    let index = LineIndex::new(text);
    let offset = index.offset(position);

    structures.iter().find_map(|structure| {
        structure
            .field_at(offset)
            .map(|field| Hover::markdown(render(structure, field), index.range(field.start, field.end)))
    })
}

fn render(structure: &Structure, field: &Field) -> String {
    let mut out = format!("**{}** `{}`\n", field.name, field.type_name);

    for tag in &field.tags {
        out.push_str(&format!("\n- `{}`: `{}`", tag.key, tag.name));
        if !tag.options.is_empty() {
            out.push_str(&format!(" (options: {})", tag.options.join(", ")));
        }
        if let Some(key) = dialect::tag_key(&tag.key) {
            out.push_str(&format!(" | {}: {}", key.detail, key.doc));
        }
        if tag.key == dialect::CONTROL_KEY
            && let Some(token) = dialect::control_token(&tag.name)
        {
            out.push_str(&format!(" `{}` = {}", token.name, token.doc));
        }
    }

    if let Some(url) = &structure.url {
        out.push_str(&format!("\n\nSource: <{}>", url));
    }
    out
}
