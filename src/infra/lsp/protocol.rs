//! JSON-RPC 2.0 Protocol Implementation for LSP
//!
//! Envelope types for messages exchanged with the editor. LSP payload types
//! (Position, Range, Diagnostic, ...) live in models/lsp.rs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// JSON-RPC 2.0 Core Types
// ============================================================================

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: RequestId, error: ResponseError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 Notification (no id, no response expected)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Notification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
        }
    }
}

/// Request ID - can be number or string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Number(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ResponseError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl From<&crate::error::DispatchError> for ResponseError {
    fn from(error: &crate::error::DispatchError) -> Self {
        Self::new(error.error_code(), error.to_string())
    }
}

impl std::fmt::Display for ResponseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ResponseError {}

/// Standard JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // LSP-specific error codes
    pub const REQUEST_CANCELLED: i32 = -32800;
}

// ============================================================================
// Incoming messages
// ============================================================================

/// A decoded client message: its envelope fields plus the untouched JSON body.
///
/// The body is kept raw so each handler can decode it against its own
/// parameter schema.
#[derive(Debug, Clone)]
pub struct Incoming {
    pub id: Option<RequestId>,
    pub method: String,
    pub body: Vec<u8>,
}

#[derive(Deserialize)]
struct Envelope<P> {
    params: P,
}

#[derive(Deserialize)]
struct Header {
    #[serde(default)]
    id: Option<RequestId>,
    method: String,
}

impl Incoming {
    /// Read the envelope fields out of a JSON body.
    pub fn from_body(body: &[u8]) -> serde_json::Result<Self> {
        let header: Header = serde_json::from_slice(body)?;
        Ok(Self {
            id: header.id,
            method: header.method,
            body: body.to_vec(),
        })
    }

    pub fn is_request(&self) -> bool {
        self.id.is_some()
    }

    /// Decode `params` against a method-specific schema.
    pub fn params<P: DeserializeOwned>(&self) -> serde_json::Result<P> {
        serde_json::from_slice::<Envelope<P>>(&self.body).map(|e| e.params)
    }
}
