//! The search worker task.

use std::sync::Arc;

use docsearch_core::FieldBoosts;
use docsearch_index::{EncodedPages, QueryEngine, build_index};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    Result,
    protocol::{Envelope, ErrorPayload, QueryResponse, Request},
    source::CorpusSource,
};

/// Something the worker emits back to its client.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerEvent {
    /// A response envelope.
    Message(Envelope),
    /// A failure not attributable to any single request.
    Error(String),
}

/// Client-side ends of a running worker.
#[derive(Debug)]
pub struct WorkerChannel {
    pub requests: mpsc::UnboundedSender<Envelope>,
    pub events: mpsc::UnboundedReceiver<WorkerEvent>,
}

impl WorkerChannel {
    /// Create a channel pair, returning the client ends and the worker ends.
    pub fn pair() -> (
        Self,
        mpsc::UnboundedReceiver<Envelope>,
        mpsc::UnboundedSender<WorkerEvent>,
    ) {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (
            Self {
                requests: request_tx,
                events: event_rx,
            },
            request_rx,
            event_tx,
        )
    }
}

/// Owns the search index and answers protocol messages.
pub struct SearchWorker {
    source: Arc<dyn CorpusSource>,
    boosts: FieldBoosts,
    engine: Option<QueryEngine>,
}

impl SearchWorker {
    pub fn new(source: Arc<dyn CorpusSource>, boosts: FieldBoosts) -> Self {
        Self {
            source,
            boosts,
            engine: None,
        }
    }

    /// Whether the index has been built.
    pub fn is_loaded(&self) -> bool {
        self.engine.is_some()
    }

    /// Run the worker on its own task.
    pub fn spawn(self) -> WorkerChannel {
        let (channel, requests, events) = WorkerChannel::pair();
        tokio::spawn(self.run(requests, events));
        channel
    }

    async fn run(
        mut self,
        mut requests: mpsc::UnboundedReceiver<Envelope>,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) {
        info!(source = %self.source.describe(), "Search worker started");

        while let Some(envelope) = requests.recv().await {
            let event = self.handle(envelope).await;
            if events.send(event).is_err() {
                break;
            }
        }

        debug!("Search worker stopped");
    }

    /// Answer one message.
    pub async fn handle(&mut self, envelope: Envelope) -> WorkerEvent {
        debug!(kind = %envelope.kind, id = envelope.id, "Worker received message");

        let request = match Request::parse(&envelope) {
            Ok(request) => request,
            Err(err) => {
                warn!(id = envelope.id, error = %err, "Rejected message payload");
                let payload = ErrorPayload::new(err.to_string()).to_value();
                return WorkerEvent::Message(envelope.reply(payload));
            }
        };

        match request {
            Request::LoadIndex => match self.load().await {
                Ok(()) => WorkerEvent::Message(envelope.reply(Value::Bool(true))),
                Err(err) => {
                    error!(
                        source = %self.source.describe(),
                        error = %err,
                        "Failed to load search index"
                    );
                    WorkerEvent::Error(err.to_string())
                }
            },
            Request::QueryIndex(text) => WorkerEvent::Message(envelope.reply(self.query(text))),
            Request::Unknown(kind) => {
                warn!(%kind, id = envelope.id, "Unknown message type");
                WorkerEvent::Message(
                    envelope.reply(ErrorPayload::invalid_message_type().to_value()),
                )
            }
        }
    }

    async fn load(&mut self) -> Result<()> {
        if self.engine.is_some() {
            debug!("Search index already loaded");
            return Ok(());
        }

        let json = self.source.fetch().await?;
        let corpus = EncodedPages::from_json(&json)?;
        self.engine = Some(QueryEngine::new(build_index(&corpus, &self.boosts)));
        Ok(())
    }

    fn query(&self, text: String) -> Value {
        let results = match &self.engine {
            Some(engine) => engine.query(&text),
            None => {
                warn!(query = %text, "Query received before the index was loaded");
                Vec::new()
            }
        };

        let response = QueryResponse {
            query: text,
            results,
        };
        serde_json::to_value(&response)
            .unwrap_or_else(|err| ErrorPayload::new(err.to_string()).to_value())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::{
        WorkerError,
        protocol::{INVALID_MESSAGE_TYPE, LOAD_INDEX, QUERY_INDEX},
        source::StaticCorpusSource,
    };

    const CORPUS: &str = r#"{"dictionary": "foo bar baz", "pages": [
        {"path": "a/b", "title": "Foo Guide", "headings": [0], "keywords": [1, 2],
         "members": [], "topics": "intro", "type": "guide"}
    ]}"#;

    /// Fails a fixed number of times before serving the corpus.
    struct FlakySource {
        failures: AtomicUsize,
        fetches: AtomicUsize,
    }

    impl FlakySource {
        fn new(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CorpusSource for FlakySource {
        async fn fetch(&self) -> Result<String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(WorkerError::Status {
                    url: "test".to_string(),
                    status: 503,
                });
            }
            Ok(CORPUS.to_string())
        }

        fn describe(&self) -> String {
            "flaky".to_string()
        }
    }

    fn worker() -> SearchWorker {
        SearchWorker::new(
            Arc::new(StaticCorpusSource::new(CORPUS)),
            FieldBoosts::default(),
        )
    }

    fn load(id: u64) -> Envelope {
        Envelope::new(LOAD_INDEX, id, Value::Null)
    }

    fn query(id: u64, payload: Value) -> Envelope {
        Envelope::new(QUERY_INDEX, id, payload)
    }

    fn message(event: WorkerEvent) -> Envelope {
        match event {
            WorkerEvent::Message(envelope) => envelope,
            WorkerEvent::Error(err) => panic!("unexpected worker error: {err}"),
        }
    }

    #[tokio::test]
    async fn test_load_then_query() {
        let mut worker = worker();

        let loaded = message(worker.handle(load(1)).await);
        assert_eq!(loaded.id, 1);
        assert_eq!(loaded.payload, json!(true));

        let reply = message(worker.handle(query(2, json!("foo"))).await);
        assert_eq!(reply.kind, QUERY_INDEX);
        assert_eq!(reply.id, 2);
        assert_eq!(reply.payload["query"], "foo");
        assert_eq!(reply.payload["results"][0]["path"], "a/b");
        assert_eq!(reply.payload["results"][0]["keywords"], "bar baz");
    }

    #[tokio::test]
    async fn test_query_before_load_is_empty() {
        let mut worker = worker();
        let reply = message(worker.handle(query(1, json!("foo"))).await);
        assert_eq!(reply.payload, json!({"query": "foo", "results": []}));
        assert!(!worker.is_loaded());
    }

    #[tokio::test]
    async fn test_unknown_type_answered_in_band() {
        let mut worker = worker();
        let reply = message(worker.handle(Envelope::new("ping", 9, Value::Null)).await);
        assert_eq!(reply.kind, "ping");
        assert_eq!(reply.id, 9);
        assert_eq!(reply.payload, json!({"error": INVALID_MESSAGE_TYPE}));
    }

    #[tokio::test]
    async fn test_non_text_query_answered_in_band() {
        let mut worker = worker();
        let reply = message(worker.handle(query(3, json!(42))).await);
        assert!(reply.error().is_some());
    }

    #[tokio::test]
    async fn test_malformed_corpus_reports_error() {
        let mut worker = SearchWorker::new(
            Arc::new(StaticCorpusSource::new("not json")),
            FieldBoosts::default(),
        );
        let event = worker.handle(load(1)).await;
        assert!(matches!(event, WorkerEvent::Error(ref msg) if msg.contains("Malformed corpus")));
        assert!(!worker.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_load_can_retry() {
        let source = Arc::new(FlakySource::new(1));
        let mut worker = SearchWorker::new(source.clone(), FieldBoosts::default());

        let first = worker.handle(load(1)).await;
        assert!(matches!(first, WorkerEvent::Error(ref msg) if msg.contains("503")));

        let second = message(worker.handle(load(2)).await);
        assert_eq!(second.payload, json!(true));
        assert!(worker.is_loaded());
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_index_built_once() {
        let source = Arc::new(FlakySource::new(0));
        let mut worker = SearchWorker::new(source.clone(), FieldBoosts::default());

        for id in 1..=3 {
            let reply = message(worker.handle(load(id)).await);
            assert_eq!(reply.payload, json!(true));
        }
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_spawned_worker_round_trip() {
        let mut channel = worker().spawn();

        channel
            .requests
            .send(Envelope::new(LOAD_INDEX, 1, Value::Null))
            .unwrap();
        channel
            .requests
            .send(Envelope::new(QUERY_INDEX, 2, json!("zzzznotfound")))
            .unwrap();

        let loaded = message(channel.events.recv().await.unwrap());
        assert_eq!(loaded.id, 1);
        let reply = message(channel.events.recv().await.unwrap());
        assert_eq!(reply.id, 2);
        assert_eq!(reply.payload["results"], json!([]));
    }

    #[tokio::test]
    async fn test_worker_stops_when_client_drops() {
        let WorkerChannel { requests, events } = worker().spawn();
        drop(events);
        // the send succeeds, the worker exits once it fails to deliver the reply
        requests
            .send(Envelope::new(LOAD_INDEX, 1, Value::Null))
            .unwrap();
        requests.closed().await;
    }
}
