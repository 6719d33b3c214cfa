//! Session state machine
//!
//! `Uninitialized --initialize--> Initialized --shutdown--> ShuttingDown --exit--> Exited`
//!
//! The session owns the document store and answers one decoded message at a
//! time. It never touches the transport: handlers return a [`Reply`] and the
//! server decides what goes on the wire.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::method::{Method, names};
use super::pending::PendingRequests;
use crate::error::DispatchError;
use crate::infra::lsp::protocol::{Incoming, Notification};
use crate::models::diagnostic::Diagnostic;
use crate::models::lsp::{
    CancelParams, CodeActionParams, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, DidSaveTextDocumentParams, InitializeParams, InitializeResult,
    PublishDiagnosticsParams, TextDocumentPositionParams,
};
use crate::services::documents::DocumentStore;
use crate::services::loader::ContentLoader;
use crate::services::{code_action, completion, hover};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    ShuttingDown,
    Exited,
}

/// What the server should emit for one handled message.
#[derive(Debug)]
pub enum Reply {
    /// Result of a request
    Result(Value),
    /// Server-initiated notification (publishDiagnostics)
    Notify(Notification),
    Nothing,
    Exit,
}

pub struct Session {
    state: SessionState,
    documents: DocumentStore,
    loader: Arc<dyn ContentLoader>,
    pending: PendingRequests,
}

impl Session {
    pub fn new(
        documents: DocumentStore,
        loader: Arc<dyn ContentLoader>,
        pending: PendingRequests,
    ) -> Self {
        Self {
            state: SessionState::Uninitialized,
            documents,
            loader,
            pending,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    pub async fn handle(&mut self, method: Method, msg: &Incoming) -> Result<Reply, DispatchError> {
        if self.state == SessionState::ShuttingDown && !method.allowed_after_shutdown() {
            return Err(DispatchError::ShuttingDown(method.to_string()));
        }

        match method {
            Method::Initialize => self.initialize(msg),
            Method::Initialized => Ok(Reply::Nothing),
            Method::DidOpen => self.did_open(msg).await,
            Method::DidChange => self.did_change(msg).await,
            Method::DidClose => self.did_close(msg),
            Method::DidSave => self.did_save(msg).await,
            Method::Completion => self.completion(msg).await,
            Method::Hover => self.hover(msg).await,
            Method::CodeAction => self.code_action(msg).await,
            Method::CancelRequest => self.cancel(msg),
            Method::Shutdown => self.shutdown(),
            Method::Exit => {
                tracing::info!("Exit requested in state {:?}", self.state);
                self.state = SessionState::Exited;
                Ok(Reply::Exit)
            }
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn initialize(&mut self, msg: &Incoming) -> Result<Reply, DispatchError> {
        let params: InitializeParams = params(msg)?;
        if let Some(client) = &params.client_info {
            tracing::info!(
                "Client: {} {}",
                client.name,
                client.version.as_deref().unwrap_or("")
            );
        }

        match self.state {
            SessionState::Uninitialized => self.state = SessionState::Initialized,
            state => tracing::debug!("initialize repeated in state {:?}", state),
        }
        result(&InitializeResult::default())
    }

    fn shutdown(&mut self) -> Result<Reply, DispatchError> {
        if self.state != SessionState::Initialized {
            tracing::debug!("shutdown received in state {:?}", self.state);
        }
        self.state = SessionState::ShuttingDown;
        Ok(Reply::Result(Value::Null))
    }

    fn cancel(&mut self, msg: &Incoming) -> Result<Reply, DispatchError> {
        let params: CancelParams = params(msg)?;
        if !self.pending.cancel(&params.id) {
            tracing::debug!("Cancel for {} ignored: not pending", params.id);
        }
        Ok(Reply::Nothing)
    }

    // ========================================================================
    // Document Sync
    // ========================================================================

    async fn did_open(&mut self, msg: &Incoming) -> Result<Reply, DispatchError> {
        let params: DidOpenTextDocumentParams = params(msg)?;
        let doc = params.text_document;
        let diagnostics = self
            .documents
            .open(&doc.uri, doc.text, Some(doc.version))
            .await;
        Ok(publish(doc.uri, Some(doc.version), diagnostics))
    }

    async fn did_change(&mut self, msg: &Incoming) -> Result<Reply, DispatchError> {
        let params: DidChangeTextDocumentParams = params(msg)?;
        let uri = params.text_document.uri;
        let version = params.text_document.version;

        let mut diagnostics = Vec::new();
        for change in params.content_changes {
            diagnostics.extend(self.documents.update(&uri, change.text, version).await);
        }
        Ok(publish(uri, version, diagnostics))
    }

    fn did_close(&mut self, msg: &Incoming) -> Result<Reply, DispatchError> {
        let params: DidCloseTextDocumentParams = params(msg)?;
        self.documents.close(&params.text_document.uri);
        Ok(Reply::Nothing)
    }

    async fn did_save(&mut self, msg: &Incoming) -> Result<Reply, DispatchError> {
        let params: DidSaveTextDocumentParams = params(msg)?;
        let uri = params.text_document.uri;
        let text = match params.text {
            Some(text) => text,
            None => self.loader.load(&uri).await?,
        };

        let version = self.documents.version(&uri);
        let diagnostics = self.documents.update(&uri, text, version).await;
        Ok(publish(uri, version, diagnostics))
    }

    // ========================================================================
    // Features
    // ========================================================================

    async fn completion(&self, msg: &Incoming) -> Result<Reply, DispatchError> {
        let params: TextDocumentPositionParams = params(msg)?;
        let uri = params.text_document.uri;
        let Ok(snapshot) = self.documents.snapshot(&uri).await else {
            tracing::debug!("completion on unknown document {}", uri);
            return result(&Vec::<Value>::new());
        };
        let items = completion::complete(snapshot.text, snapshot.structures(), params.position);
        result(&items)
    }

    async fn hover(&self, msg: &Incoming) -> Result<Reply, DispatchError> {
        let params: TextDocumentPositionParams = params(msg)?;
        let uri = params.text_document.uri;
        let Ok(snapshot) = self.documents.snapshot(&uri).await else {
            tracing::debug!("hover on unknown document {}", uri);
            return Ok(Reply::Result(Value::Null));
        };
        result(&hover::hover(
            snapshot.text,
            snapshot.structures(),
            params.position,
        ))
    }

    async fn code_action(&self, msg: &Incoming) -> Result<Reply, DispatchError> {
        let params: CodeActionParams = params(msg)?;
        let uri = params.text_document.uri;
        let Ok(snapshot) = self.documents.snapshot(&uri).await else {
            tracing::debug!("codeAction on unknown document {}", uri);
            return result(&Vec::<Value>::new());
        };
        let actions = code_action::code_actions(
            &uri,
            snapshot.text,
            snapshot.structures(),
            params.range,
            self.documents.dialect(),
        );
        result(&actions)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn params<P: DeserializeOwned>(msg: &Incoming) -> Result<P, DispatchError> {
    msg.params().map_err(|e| DispatchError::decode(&msg.method, e))
}

fn result<T: Serialize>(value: &T) -> Result<Reply, DispatchError> {
    serde_json::to_value(value)
        .map(Reply::Result)
        .map_err(|e| DispatchError::Internal(e.to_string()))
}

fn publish(uri: String, version: Option<i32>, diagnostics: Vec<Diagnostic>) -> Reply {
    let params = PublishDiagnosticsParams {
        uri,
        version,
        diagnostics,
    };
    match serde_json::to_value(&params) {
        Ok(value) => Reply::Notify(Notification::new(names::PUBLISH_DIAGNOSTICS, Some(value))),
        Err(e) => {
            tracing::warn!("Failed to serialize diagnostics for {}: {}", params.uri, e);
            Reply::Nothing
        }
    }
}
