//! LSP wire infrastructure for seltabls
//!
//! - JSON-RPC 2.0 envelope types
//! - Content-Length framing with a stream splitter for chunked input

pub mod protocol;
pub mod transport;

pub use protocol::{Incoming, Notification, RequestId, Response, ResponseError};
pub use transport::{FrameReader, FrameWriter, decode, encode, split};
