//! Error types for seltabls

use thiserror::Error;

use crate::infra::lsp::protocol::error_codes;

pub type SeltablsResult<T> = std::result::Result<T, SeltablsError>;

#[derive(Debug, Error)]
pub enum SeltablsError {
    #[error("{0}")]
    Framing(#[from] FramingError),

    #[error("{0}")]
    Parse(#[from] ParseError),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Wire-level failures of the Content-Length codec.
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    #[error("Malformed body: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FramingError {
    /// Transport I/O failures end the session; everything else drops one frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Struct tag grammar failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("bad syntax for struct tag pair")]
    Syntax,

    #[error("bad syntax for struct tag key")]
    KeySyntax,

    #[error("bad syntax for struct tag value")]
    ValueSyntax,

    #[error("tag key does not exist")]
    KeyNotSet,

    #[error("tag does not exist")]
    NotExist,
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Syntax error at {}:{}: {message}", line + 1, column + 1)]
    Syntax {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Invalid tags on field '{field}': {source}")]
    Tag {
        field: String,
        line: u32,
        start: usize,
        end: usize,
        #[source]
        source: TagError,
    },

    #[error("Go grammar unavailable: {0}")]
    Grammar(String),

    #[error("Field task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Failed to read {uri}: {source}")]
    Io {
        uri: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures raised while routing one message.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Failed to decode ({method}) params: {message}")]
    Decode { method: String, message: String },

    #[error("Server is shutting down; '{0}' rejected")]
    ShuttingDown(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DispatchError {
    pub fn error_code(&self) -> i32 {
        match self {
            Self::UnknownMethod(_) => error_codes::METHOD_NOT_FOUND,
            Self::Decode { .. } => error_codes::INVALID_PARAMS,
            Self::ShuttingDown(_) => error_codes::INVALID_REQUEST,
            Self::Cancelled => error_codes::REQUEST_CANCELLED,
            Self::Document(_) | Self::Internal(_) => error_codes::INTERNAL_ERROR,
        }
    }

    pub fn decode(method: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            method: method.to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_codes() {
        assert_eq!(
            DispatchError::UnknownMethod("foo/bar".into()).error_code(),
            -32601
        );
        assert_eq!(DispatchError::decode("hover", "missing field").error_code(), -32602);
        assert_eq!(
            DispatchError::ShuttingDown("hover".into()).error_code(),
            -32600
        );
        assert_eq!(DispatchError::Cancelled.error_code(), -32800);
        let missing = DispatchError::from(DocumentError::NotFound("file:///a.go".into()));
        assert_eq!(missing.error_code(), -32603);
    }

    #[test]
    fn test_framing_error_fatality() {
        assert!(!FramingError::MalformedHeader("x".into()).is_fatal());
        assert!(!FramingError::MalformedBody("x".into()).is_fatal());
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert!(FramingError::Io(io).is_fatal());
    }

    #[test]
    fn test_syntax_error_display_is_one_based() {
        let err = ParseError::Syntax {
            line: 0,
            column: 4,
            message: "unexpected '}'".into(),
        };
        assert_eq!(err.to_string(), "Syntax error at 1:5: unexpected '}'");
    }

    #[test]
    fn test_tag_error_messages() {
        assert_eq!(TagError::ValueSyntax.to_string(), "bad syntax for struct tag value");
        let err = ParseError::Tag {
            field: "A".into(),
            line: 2,
            start: 10,
            end: 20,
            source: TagError::KeySyntax,
        };
        assert!(err.to_string().contains("field 'A'"));
    }
}
