//! Command implementations for seltabls
//!
//! Each command is implemented in its own module.

pub mod check;
pub mod lsp;
pub mod parse;
