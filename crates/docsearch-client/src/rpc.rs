//! Request/response correlation over a worker channel.
//!
//! Every request gets a fresh id and waits on a oneshot registered in the
//! pending map. A single dispatcher task owns the worker's event stream and
//! resolves pending requests whose `type` and `id` both match the response.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use docsearch_worker::{Envelope, WorkerChannel, WorkerEvent};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex, mpsc, oneshot};
use tracing::{debug, warn};

use crate::{ClientError, Result};

struct PendingRequest {
    kind: String,
    reply: oneshot::Sender<Result<Value>>,
}

#[derive(Default)]
struct Dispatch {
    pending: HashMap<u64, PendingRequest>,
    closed: bool,
}

impl Dispatch {
    fn fail_all(&mut self, error: &ClientError) {
        for (_, request) in self.pending.drain() {
            let _ = request.reply.send(Err(error.clone()));
        }
    }
}

/// A handle for sending requests to a worker. Cheap to clone.
#[derive(Clone)]
pub struct WorkerClient {
    requests: mpsc::UnboundedSender<Envelope>,
    dispatch: Arc<Mutex<Dispatch>>,
    next_id: Arc<AtomicU64>,
}

impl WorkerClient {
    /// Take over a worker channel and start dispatching its events.
    pub fn connect(channel: WorkerChannel) -> Self {
        let dispatch = Arc::new(Mutex::new(Dispatch::default()));
        Self::spawn_dispatcher(channel.events, dispatch.clone());

        Self {
            requests: channel.requests,
            dispatch,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn spawn_dispatcher(
        mut events: mpsc::UnboundedReceiver<WorkerEvent>,
        dispatch: Arc<Mutex<Dispatch>>,
    ) {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    WorkerEvent::Message(envelope) => {
                        Self::handle_response(&dispatch, envelope).await;
                    }
                    WorkerEvent::Error(message) => {
                        warn!(error = %message, "Search worker reported an error");
                        dispatch
                            .lock()
                            .await
                            .fail_all(&ClientError::Worker(message));
                    }
                }
            }

            debug!("Search worker channel closed");
            let mut dispatch = dispatch.lock().await;
            dispatch.closed = true;
            dispatch.fail_all(&ClientError::Disconnected);
        });
    }

    async fn handle_response(dispatch: &Mutex<Dispatch>, envelope: Envelope) {
        let mut dispatch = dispatch.lock().await;

        let matches = dispatch
            .pending
            .get(&envelope.id)
            .is_some_and(|request| request.kind == envelope.kind);
        if !matches {
            debug!(kind = %envelope.kind, id = envelope.id, "Ignoring uncorrelated response");
            return;
        }

        if let Some(request) = dispatch.pending.remove(&envelope.id) {
            let result = match envelope.error() {
                Some(error) => Err(ClientError::Rejected(error.to_string())),
                None => Ok(envelope.payload),
            };
            let _ = request.reply.send(result);
        }
    }

    /// Send a request and wait for the matching response payload.
    pub async fn request(&self, kind: &str, payload: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = oneshot::channel();

        {
            let mut dispatch = self.dispatch.lock().await;
            if dispatch.closed {
                return Err(ClientError::Disconnected);
            }
            dispatch.pending.insert(
                id,
                PendingRequest {
                    kind: kind.to_string(),
                    reply: tx,
                },
            );
        }

        debug!(%kind, id, "Sending worker request");
        let envelope = Envelope::new(kind, id, payload);
        if self.requests.send(envelope).is_err() {
            self.dispatch.lock().await.pending.remove(&id);
            return Err(ClientError::Disconnected);
        }

        rx.await.map_err(|_| ClientError::Disconnected)?
    }

    /// Send a request and decode the response payload.
    pub async fn call<R: DeserializeOwned>(&self, kind: &str, payload: Value) -> Result<R> {
        let value = self.request(kind, payload).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Payload(e.to_string()))
    }

    /// Number of requests still waiting for a response.
    pub async fn pending_count(&self) -> usize {
        self.dispatch.lock().await.pending.len()
    }
}
