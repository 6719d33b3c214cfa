//! Language server loop
//!
//! A reader task decodes frames off the input stream into a bounded queue
//! and applies `$/cancelRequest` as soon as it arrives. The dispatcher drains
//! the queue strictly in order: one message is fully handled and its reply
//! written before the next is looked at, so document mutations are never
//! reordered against the requests that read them.

pub mod log;
pub mod method;
pub mod pending;
pub mod session;

use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{DispatchError, FramingError, ParseError};
use crate::infra::lsp::protocol::{Incoming, Notification, Response, ResponseError};
use crate::infra::lsp::transport::{self, FrameReader, FrameWriter};
use crate::models::config::SeltablsConfig;
use crate::models::lsp::CancelParams;
use crate::parsers::StructParser;
use crate::services::{ContentLoader, Dialect, DocumentStore, FsContentLoader};

pub use log::{LogEntry, MemoryLog, MessageLog, TracingLog};
pub use method::Method;
pub use pending::PendingRequests;
pub use session::{Reply, Session, SessionState};

/// Exit code when the client goes away without a shutdown handshake.
const EXIT_WITHOUT_SHUTDOWN: i32 = 1;

enum Inbound {
    Message(Incoming, Option<CancellationToken>),
    Failed(FramingError),
}

#[derive(Serialize)]
#[serde(untagged)]
enum Outgoing {
    Response(Response),
    Notification(Notification),
}

pub struct Server {
    session: Session,
    pending: PendingRequests,
    log: Arc<dyn MessageLog>,
    queue_capacity: usize,
}

impl Server {
    pub fn new(
        documents: DocumentStore,
        loader: Arc<dyn ContentLoader>,
        log: Arc<dyn MessageLog>,
        queue_capacity: usize,
    ) -> Self {
        let pending = PendingRequests::new();
        Self {
            session: Session::new(documents, loader, pending.clone()),
            pending,
            log,
            queue_capacity: queue_capacity.max(1),
        }
    }

    pub fn from_config(
        config: &SeltablsConfig,
        log: Arc<dyn MessageLog>,
    ) -> Result<Self, ParseError> {
        let documents = DocumentStore::new(StructParser::new()?, Dialect::from(&config.lint));
        Ok(Self::new(
            documents,
            Arc::new(FsContentLoader),
            log,
            config.server.queue_capacity,
        ))
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Serve until `exit`, end of input, or a transport failure.
    ///
    /// Returns the process exit code: 0 after `exit` or after end of input
    /// following `shutdown`, 1 when the input ends without `shutdown`.
    pub async fn run<R, W>(&mut self, input: R, output: W) -> Result<i32, FramingError>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let (tx, mut rx) = mpsc::channel(self.queue_capacity);
        let reader = tokio::spawn(read_frames(
            FrameReader::new(input),
            self.pending.clone(),
            tx,
        ));
        let mut writer = FrameWriter::new(output);

        tracing::info!("Language server started");
        let outcome = loop {
            let Some(inbound) = rx.recv().await else {
                let code = match self.state() {
                    SessionState::ShuttingDown => 0,
                    state => {
                        tracing::warn!("Input closed in state {:?}", state);
                        EXIT_WITHOUT_SHUTDOWN
                    }
                };
                break Ok(code);
            };

            match inbound {
                Inbound::Message(msg, token) => match self.dispatch(msg, token, &mut writer).await {
                    Ok(Some(code)) => break Ok(code),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::error!("Write failed: {}", e);
                        break Err(e);
                    }
                },
                Inbound::Failed(e) => {
                    tracing::error!("Read failed: {}", e);
                    break Err(e);
                }
            }
        };

        reader.abort();
        tracing::info!("Language server stopped");
        outcome
    }

    /// Handle one message and write its reply. `Some(code)` ends the loop.
    async fn dispatch<W: AsyncWrite + Unpin>(
        &mut self,
        msg: Incoming,
        token: Option<CancellationToken>,
        writer: &mut FrameWriter<W>,
    ) -> Result<Option<i32>, FramingError> {
        let outcome = match Method::from_name(&msg.method) {
            Some(method) => execute(&mut self.session, method, &msg, token).await,
            None => Err(DispatchError::UnknownMethod(msg.method.clone())),
        };
        if let Some(id) = &msg.id {
            self.pending.complete(id);
        }

        let mut entry = LogEntry::new(msg.method.as_str());
        let mut exit = None;
        let outgoing = match outcome {
            Ok(Reply::Result(value)) => msg.id.map(|id| {
                entry.response = Some(value.to_string());
                Outgoing::Response(Response::success(id, value))
            }),
            Ok(Reply::Notify(notification)) => {
                entry.response = serde_json::to_string(&notification).ok();
                Some(Outgoing::Notification(notification))
            }
            Ok(Reply::Nothing) => None,
            Ok(Reply::Exit) => {
                exit = Some(0);
                None
            }
            // A cancelled request gets no response at all
            Err(DispatchError::Cancelled) => {
                entry.error = Some(DispatchError::Cancelled.to_string());
                None
            }
            Err(e) => {
                entry.error = Some(e.to_string());
                msg.id
                    .map(|id| Outgoing::Response(Response::error(id, ResponseError::from(&e))))
            }
        };
        self.log.record(entry);

        if let Some(message) = outgoing {
            writer.write_message(&message).await?;
        }
        Ok(exit)
    }
}

/// Run one handler, abandoning it if its request is cancelled first.
async fn execute(
    session: &mut Session,
    method: Method,
    msg: &Incoming,
    token: Option<CancellationToken>,
) -> Result<Reply, DispatchError> {
    let Some(token) = token else {
        return session.handle(method, msg).await;
    };

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(DispatchError::Cancelled),
        reply = session.handle(method, msg) => reply,
    }
}

async fn read_frames<R: AsyncRead + Unpin>(
    mut reader: FrameReader<R>,
    pending: PendingRequests,
    tx: mpsc::Sender<Inbound>,
) {
    loop {
        let inbound = match reader.read_frame().await {
            Ok(Some(frame)) => match transport::decode(&frame) {
                Ok(msg) => {
                    tracing::debug!("LSP <- {} (id {:?})", msg.method, msg.id);
                    if msg.method == method::names::CANCEL_REQUEST {
                        match msg.params::<CancelParams>() {
                            Ok(params) => {
                                pending.cancel(&params.id);
                            }
                            Err(e) => tracing::debug!("Unreadable cancel request: {}", e),
                        }
                    }
                    let token = msg.id.clone().map(|id| pending.register(id));
                    Inbound::Message(msg, token)
                }
                Err(e) => {
                    tracing::warn!("Dropping frame: {}", e);
                    continue;
                }
            },
            Ok(None) => {
                tracing::debug!("Input closed");
                return;
            }
            Err(e) if e.is_fatal() => Inbound::Failed(e),
            Err(e) => {
                tracing::warn!("Dropping frame: {}", e);
                continue;
            }
        };

        let fatal = matches!(inbound, Inbound::Failed(_));
        if tx.send(inbound).await.is_err() || fatal {
            return;
        }
    }
}
