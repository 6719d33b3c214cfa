//! Pending-request registry
//!
//! Maps in-flight request ids to cancellation tokens. Shared between the
//! frame reader (which registers requests and applies `$/cancelRequest` as
//! soon as it is decoded) and the dispatcher (which deregisters on completion).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;

use crate::infra::lsp::protocol::RequestId;

#[derive(Debug, Clone, Default)]
pub struct PendingRequests {
    inner: Arc<Mutex<HashMap<RequestId, CancellationToken>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestId, CancellationToken>> {
        // The map stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register `id` and return the token its unit of work must observe.
    pub fn register(&self, id: RequestId) -> CancellationToken {
        let token = CancellationToken::new();
        if self.lock().insert(id.clone(), token.clone()).is_some() {
            tracing::warn!("Request id {} reused while still pending", id);
        }
        token
    }

    /// Cancel and remove `id`. Unknown or finished ids are a no-op.
    pub fn cancel(&self, id: &RequestId) -> bool {
        match self.lock().remove(id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn complete(&self, id: &RequestId) {
        self.lock().remove(id);
    }
}
