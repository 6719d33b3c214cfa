//! Service layer for seltabls

pub mod code_action;
pub mod completion;
pub mod diagnostics;
pub mod dialect;
pub mod documents;
pub mod hover;
pub mod loader;

pub use dialect::Dialect;
pub use documents::{DocumentStore, Snapshot};
pub use loader::{ContentLoader, FsContentLoader};
