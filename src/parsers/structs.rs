//! Struct & field parser
//!
//! Locates every struct type in a Go fragment and parses each tagged field's
//! tag literal on its own task. Results land in index-addressed slots so the
//! field order always matches declaration order, whatever order tasks finish.

use std::sync::Arc;

use tokio::task::JoinSet;

use super::annotations;
use super::tags::{self, FieldSpan};
use crate::error::ParseError;
use crate::infra::ast::{FieldDecl, GoParser, StructDecl, TagLiteral};
use crate::models::structure::{Field, Structure};

#[derive(Clone)]
pub struct StructParser {
    go: Arc<GoParser>,
}

impl StructParser {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            go: Arc::new(GoParser::new()?),
        })
    }

    /// Parse every struct in `source`, in file order.
    ///
    /// Any malformed tag fails the whole call with [`ParseError::Tag`] naming
    /// the offending field.
    pub async fn parse(&self, source: &str) -> Result<Vec<Structure>, ParseError> {
        let decls = self.go.struct_decls(source)?;
        let mut structures = Vec::with_capacity(decls.len());
        for decl in decls {
            structures.push(parse_structure(decl).await?);
        }
        Ok(structures)
    }
}

async fn parse_structure(decl: StructDecl) -> Result<Structure, ParseError> {
    let annotations = annotations::extract(decl.doc.as_slice());
    let fields = parse_fields(decl.fields).await?;

    Ok(Structure {
        fields,
        url: annotations.url,
        ignores: annotations.ignores,
    })
}

/// Fan out one task per tagged field and join them all.
///
/// On failure every task is still awaited; the first error observed is
/// returned and the finished fields are dropped.
async fn parse_fields(decls: Vec<FieldDecl>) -> Result<Vec<Field>, ParseError> {
    let tagged: Vec<(FieldDecl, TagLiteral)> = decls
        .into_iter()
        .filter_map(|mut decl| decl.tag.take().map(|tag| (decl, tag)))
        .collect();

    let mut slots: Vec<Option<Field>> = vec![None; tagged.len()];
    let mut tasks = JoinSet::new();
    for (index, (decl, tag)) in tagged.into_iter().enumerate() {
        tasks.spawn(async move { (index, parse_field(decl, tag)) });
    }

    let mut first_error = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(field))) => slots[index] = Some(field),
            Ok((_, Err(e))) => {
                first_error.get_or_insert(e);
            }
            Err(e) => {
                first_error.get_or_insert(ParseError::Task(e.to_string()));
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    slots
        .into_iter()
        .map(|slot| slot.ok_or_else(|| ParseError::Task("field slot never filled".into())))
        .collect()
}

fn parse_field(decl: FieldDecl, tag: TagLiteral) -> Result<Field, ParseError> {
    let span = FieldSpan {
        line: decl.line,
        start: decl.start,
        end: decl.end,
    };
    let tags = tags::parse(&tag.raw, span).map_err(|source| ParseError::Tag {
        field: decl.name.clone(),
        line: decl.line,
        start: decl.start,
        end: decl.end,
        source,
    })?;

    Ok(Field {
        name: decl.name,
        type_name: decl.type_name,
        line: decl.line,
        start: decl.start,
        end: decl.end,
        tag_start: tag.start,
        tags,
    })
}
