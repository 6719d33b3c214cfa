//! seltabls - language server for seltabl struct-tag selectors
//!
//! Parses Go struct declarations, reads the seltabl tag dialect out of their
//! field tags, and serves diagnostics, completion, hover and code actions
//! over the Language Server Protocol.

pub mod cli;
pub mod config;
pub mod error;
pub mod infra;
pub mod models;
pub mod parsers;
pub mod server;
pub mod services;

pub use error::{SeltablsError, SeltablsResult};
