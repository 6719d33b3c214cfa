//! Infrastructure layer for seltabls
//!
//! Contains low-level implementations and external integrations.

pub mod ast;
pub mod lsp;
pub mod text;
