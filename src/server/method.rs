//! Method table
//!
//! Every LSP method the server understands, as a closed enum so dispatch
//! is checked for exhaustiveness.

pub mod names {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "initialized";
    pub const DID_OPEN: &str = "textDocument/didOpen";
    pub const DID_CHANGE: &str = "textDocument/didChange";
    pub const DID_CLOSE: &str = "textDocument/didClose";
    pub const DID_SAVE: &str = "textDocument/didSave";
    pub const COMPLETION: &str = "textDocument/completion";
    pub const HOVER: &str = "textDocument/hover";
    pub const CODE_ACTION: &str = "textDocument/codeAction";
    pub const CANCEL_REQUEST: &str = "$/cancelRequest";
    pub const SHUTDOWN: &str = "shutdown";
    pub const EXIT: &str = "exit";

    // Server -> client
    pub const PUBLISH_DIAGNOSTICS: &str = "textDocument/publishDiagnostics";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Initialize,
    Initialized,
    DidOpen,
    DidChange,
    DidClose,
    DidSave,
    Completion,
    Hover,
    CodeAction,
    CancelRequest,
    Shutdown,
    Exit,
}

impl Method {
    pub const ALL: [Method; 12] = [
        Method::Initialize,
        Method::Initialized,
        Method::DidOpen,
        Method::DidChange,
        Method::DidClose,
        Method::DidSave,
        Method::Completion,
        Method::Hover,
        Method::CodeAction,
        Method::CancelRequest,
        Method::Shutdown,
        Method::Exit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialize => names::INITIALIZE,
            Self::Initialized => names::INITIALIZED,
            Self::DidOpen => names::DID_OPEN,
            Self::DidChange => names::DID_CHANGE,
            Self::DidClose => names::DID_CLOSE,
            Self::DidSave => names::DID_SAVE,
            Self::Completion => names::COMPLETION,
            Self::Hover => names::HOVER,
            Self::CodeAction => names::CODE_ACTION,
            Self::CancelRequest => names::CANCEL_REQUEST,
            Self::Shutdown => names::SHUTDOWN,
            Self::Exit => names::EXIT,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    /// Methods still honored once shutdown has been requested.
    pub fn allowed_after_shutdown(self) -> bool {
        matches!(self, Self::Shutdown | Self::Exit | Self::CancelRequest)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for method in Method::ALL {
            assert_eq!(Method::from_name(method.as_str()), Some(method));
        }
        assert_eq!(Method::from_name("textDocument/rename"), None);
    }

    #[test]
    fn test_after_shutdown() {
        assert!(Method::Exit.allowed_after_shutdown());
        assert!(!Method::Hover.allowed_after_shutdown());
        assert!(!Method::DidOpen.allowed_after_shutdown());
    }
}
