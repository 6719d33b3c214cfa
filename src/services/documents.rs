//! Document store
//!
//! Authoritative text of every document the client has opened. Parse
//! results are never cached: each feature request re-parses the current
//! text.

use std::collections::HashMap;

use super::diagnostics;
use super::dialect::Dialect;
use crate::error::{DocumentError, ParseError};
use crate::models::diagnostic::Diagnostic;
use crate::models::structure::Structure;
use crate::parsers::StructParser;

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub text: String,
    pub version: Option<i32>,
}

/// A document's text together with the outcome of parsing it.
pub struct Snapshot<'a> {
    pub text: &'a str,
    pub parsed: Result<Vec<Structure>, ParseError>,
}

impl Snapshot<'_> {
    /// Parsed structures, or none when the text does not parse.
    pub fn structures(&self) -> &[Structure] {
        self.parsed.as_deref().unwrap_or(&[])
    }
}

pub struct DocumentStore {
    documents: HashMap<String, Document>,
    parser: StructParser,
    dialect: Dialect,
}

impl DocumentStore {
    pub fn new(parser: StructParser, dialect: Dialect) -> Self {
        Self {
            documents: HashMap::new(),
            parser,
            dialect,
        }
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Install or replace `uri` and diagnose the new text.
    pub async fn open(&mut self, uri: &str, text: String, version: Option<i32>) -> Vec<Diagnostic> {
        tracing::debug!("open {} ({} bytes)", uri, text.len());
        self.replace(uri, text, version).await
    }

    /// Full-text replacement for one content change.
    pub async fn update(
        &mut self,
        uri: &str,
        text: String,
        version: Option<i32>,
    ) -> Vec<Diagnostic> {
        if !self.documents.contains_key(uri) {
            tracing::debug!("update for unopened document {}", uri);
        }
        self.replace(uri, text, version).await
    }

    /// Clear the text but keep the entry; a closed document reads as empty.
    pub fn close(&mut self, uri: &str) {
        let doc = self.documents.entry(uri.to_string()).or_default();
        doc.text.clear();
        doc.version = None;
    }

    pub fn get(&self, uri: &str) -> Result<&str, DocumentError> {
        self.documents
            .get(uri)
            .map(|d| d.text.as_str())
            .ok_or_else(|| DocumentError::NotFound(uri.to_string()))
    }

    pub fn version(&self, uri: &str) -> Option<i32> {
        self.documents.get(uri).and_then(|d| d.version)
    }

    pub async fn snapshot<'a>(&'a self, uri: &'a str) -> Result<Snapshot<'a>, DocumentError> {
        let text = self.get(uri)?;
        let parsed = self.parser.parse(text).await;
        if let Err(e) = &parsed {
            tracing::debug!("{} does not parse: {}", uri, e);
        }
        Ok(Snapshot { text, parsed })
    }

    async fn replace(&mut self, uri: &str, text: String, version: Option<i32>) -> Vec<Diagnostic> {
        let parsed = self.parser.parse(&text).await;
        let diagnostics = diagnostics::diagnose(&text, &parsed, &self.dialect);
        self.documents
            .insert(uri.to_string(), Document { text, version });
        diagnostics
    }
}
