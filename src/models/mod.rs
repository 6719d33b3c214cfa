//! Data models for seltabls
//!
//! Contains core type definitions used throughout the application.

pub mod config;
pub mod diagnostic;
pub mod lsp;
pub mod structure;

// Re-export commonly used types
pub use config::SeltablsConfig;
pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticSeverity};
pub use lsp::{
    CodeAction, CodeActionKind, CompletionItem, CompletionItemKind, Hover, Position, Range,
    TextEdit, WorkspaceEdit,
};
pub use structure::{Field, Structure, Tag, Tags};
