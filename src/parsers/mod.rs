//! Parsers for the seltabl tag dialect
//!
//! - [`tags`]: tag literal grammar
//! - [`structs`]: struct and field extraction with per-field concurrency
//! - [`annotations`]: `@url:` / `@ignore-elements:` doc-comment lines

pub mod annotations;
pub mod structs;
pub mod tags;

pub use structs::StructParser;
