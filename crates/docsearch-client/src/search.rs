//! The search client: lazy worker startup plus query dispatch.

use std::{
    future::Future,
    path::PathBuf,
    sync::{Arc, OnceLock},
    time::Duration,
};

use docsearch_core::{Config, FieldBoosts};
use docsearch_index::SearchResults;
use docsearch_worker::{
    LOAD_INDEX, QUERY_INDEX, SearchWorker, WorkerChannel, corpus_source_for,
};
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use serde_json::Value;
use tokio::sync::Notify;
use tracing::{debug, info};

use crate::{ClientError, Result, rpc::WorkerClient};

type Initialization = Shared<BoxFuture<'static, Result<WorkerClient>>>;

/// Starts a fresh worker.
pub trait WorkerFactory: Send + Sync {
    fn create(&self) -> WorkerChannel;
}

impl<F> WorkerFactory for F
where
    F: Fn() -> WorkerChannel + Send + Sync,
{
    fn create(&self) -> WorkerChannel {
        self()
    }
}

struct Inner {
    factory: Arc<dyn WorkerFactory>,
    init_delay: Duration,
    search_requested: Arc<Notify>,
    initialization: OnceLock<Initialization>,
}

/// Owns one worker and mediates access to it.
///
/// The worker is started either when the initialization delay elapses or
/// when the first search arrives, whichever comes first. It is started at
/// most once; every caller observes the same initialization outcome.
#[derive(Clone)]
pub struct SearchClient {
    inner: Arc<Inner>,
}

impl SearchClient {
    /// Create a client. `init_delay` applies when [`SearchClient::search`] is
    /// called before [`SearchClient::initialize`].
    pub fn new(factory: impl WorkerFactory + 'static, init_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                factory: Arc::new(factory),
                init_delay,
                search_requested: Arc::new(Notify::new()),
                initialization: OnceLock::new(),
            }),
        }
    }

    /// Create a client whose worker loads the configured corpus.
    pub fn from_config(config: &Config, root: impl Into<PathBuf>) -> Self {
        let source = corpus_source_for(&config.search.data_url, &root.into());
        let boosts: FieldBoosts = config.search.boosts;
        Self::new(
            move || SearchWorker::new(source.clone(), boosts).spawn(),
            config.search.init_delay(),
        )
    }

    /// Arm worker startup and return a future resolving once the index is
    /// loaded.
    ///
    /// Startup proceeds in the background whether or not the returned future
    /// is polled. Only the first call's `delay` is honoured. Must be called
    /// from within a tokio runtime.
    pub fn initialize(
        &self,
        delay: Duration,
    ) -> impl Future<Output = Result<bool>> + Send + 'static {
        let initialization = self.initialization(delay);
        async move { initialization.await.map(|_| true) }
    }

    /// Whether a worker start has been armed.
    pub fn is_started(&self) -> bool {
        self.inner.initialization.get().is_some()
    }

    /// Search the index, starting the worker immediately if needed.
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        self.inner.search_requested.notify_one();

        let client = self.initialization(self.inner.init_delay).await?;
        let response: SearchResults = client
            .call(QUERY_INDEX, Value::String(query.to_string()))
            .await?;

        Ok(SearchResults {
            query: query.to_string(),
            results: response.results,
        })
    }

    fn initialization(&self, delay: Duration) -> Initialization {
        self.inner
            .initialization
            .get_or_init(|| {
                let factory = Arc::clone(&self.inner.factory);
                let search_requested = Arc::clone(&self.inner.search_requested);

                let initialization = async move {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {
                            debug!(?delay, "Search initialization delay elapsed");
                        }
                        _ = search_requested.notified() => {
                            debug!("Search requested before initialization delay");
                        }
                    }

                    let client = WorkerClient::connect(factory.create());
                    let loaded: Value = client.request(LOAD_INDEX, Value::Null).await?;
                    if loaded != Value::Bool(true) {
                        return Err(ClientError::Payload(format!(
                            "expected true from {LOAD_INDEX}, found {loaded}"
                        )));
                    }

                    info!("Search worker ready");
                    Ok(client)
                }
                .boxed()
                .shared();

                tokio::spawn(initialization.clone().map(|_| ()));
                initialization
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use docsearch_worker::{StaticCorpusSource, WorkerEvent};
    use serde_json::json;

    use super::*;

    const CORPUS: &str = r#"{"dictionary": "foo bar baz", "pages": [
        {"path": "a/b", "title": "Foo Guide", "headings": [0], "keywords": [1, 2],
         "members": [], "topics": "intro", "type": "guide"}
    ]}"#;

    /// Builds real workers over a static corpus and counts them.
    fn counting_client(corpus: &'static str, delay: Duration) -> (SearchClient, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let client = SearchClient::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                SearchWorker::new(
                    Arc::new(StaticCorpusSource::new(corpus)),
                    FieldBoosts::default(),
                )
                .spawn()
            },
            delay,
        );
        (client, created)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_waits_for_delay() {
        let (client, created) = counting_client(CORPUS, Duration::from_secs(2));
        let ready = client.initialize(Duration::from_secs(2));

        tokio::time::sleep(Duration::from_millis(1_999)).await;
        assert_eq!(created.load(Ordering::SeqCst), 0);

        assert_eq!(ready.await, Ok(true));
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_starts_worker_early() {
        let (client, created) = counting_client(CORPUS, Duration::from_secs(60));
        let _ready = client.initialize(Duration::from_secs(60));

        let start = tokio::time::Instant::now();
        let results = client.search("foo").await.unwrap();

        assert!(start.elapsed() < Duration::from_secs(60));
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(results.query, "foo");
        assert_eq!(results.results[0].path, "a/b");
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_without_initialize() {
        let (client, created) = counting_client(CORPUS, Duration::from_secs(2));
        assert!(!client.is_started());

        let results = client.search("zzzznotfound").await.unwrap();
        assert!(results.results.is_empty());
        assert!(client.is_started());
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_created_once() {
        let (client, created) = counting_client(CORPUS, Duration::from_millis(10));

        let first = client.initialize(Duration::from_millis(10));
        let second = client.initialize(Duration::from_secs(100));
        let (a, b) = tokio::join!(first, second);
        assert_eq!((a, b), (Ok(true), Ok(true)));

        // late callers replay the same outcome
        assert_eq!(client.initialize(Duration::ZERO).await, Ok(true));
        for query in ["foo", "intro", "bar"] {
            assert_eq!(client.search(query).await.unwrap().results.len(), 1);
        }
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_corpus_fails_initialization() {
        let (client, created) = counting_client("not json", Duration::ZERO);

        let outcome = client.initialize(Duration::ZERO).await;
        assert!(matches!(outcome, Err(ClientError::Worker(ref msg)) if msg.contains("Malformed")));

        // the failure is replayed, never retried with a new worker
        assert!(matches!(
            client.search("foo").await,
            Err(ClientError::Worker(_))
        ));
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_searches_reverse_responses() {
        let (channel, mut requests, events) = WorkerChannel::pair();
        let channel = std::sync::Mutex::new(Some(channel));
        let client = SearchClient::new(
            move || {
                channel
                    .lock()
                    .unwrap()
                    .take()
                    .unwrap_or_else(|| WorkerChannel::pair().0)
            },
            Duration::from_secs(60),
        );

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.search("first").await }
        });

        let load = requests.recv().await.unwrap();
        assert_eq!(load.kind, LOAD_INDEX);
        events
            .send(WorkerEvent::Message(load.reply(json!(true))))
            .unwrap();

        let second = tokio::spawn({
            let client = client.clone();
            async move { client.search("second").await }
        });

        let a = requests.recv().await.unwrap();
        let b = requests.recv().await.unwrap();
        assert_ne!(a.id, b.id);

        for request in [&b, &a] {
            let query = request.payload.as_str().unwrap().to_string();
            let payload = json!({
                "query": query,
                "results": [{"path": format!("guide/{query}"), "title": query, "type": "guide"}],
            });
            events
                .send(WorkerEvent::Message(request.reply(payload)))
                .unwrap();
        }

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();
        assert_eq!(first.query, "first");
        assert_eq!(first.results[0].path, "guide/first");
        assert_eq!(second.query, "second");
        assert_eq!(second.results[0].path, "guide/second");
    }
}
