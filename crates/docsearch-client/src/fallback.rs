//! Queries derived from somewhere other than the search box.

use docsearch_index::SearchResults;
use futures::{Stream, StreamExt};

use crate::{Result, search::SearchClient};

/// Turn a path that matched no page into a query from its words.
///
/// `guide/http-client` becomes `guide http client`.
pub fn query_from_path(path: &str) -> String {
    path.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode a query carried in a `?search=` URL parameter, where spaces are
/// encoded as `+`.
pub fn decode_search_param(text: &str) -> String {
    text.replace('+', " ")
}

/// Search for pages related to each path in a stream of unmatched paths.
///
/// One search runs per path, in order.
pub fn related_pages<S>(client: SearchClient, paths: S) -> impl Stream<Item = Result<SearchResults>>
where
    S: Stream<Item = String>,
{
    paths.then(move |path| {
        let client = client.clone();
        async move { client.search(&query_from_path(&path)).await }
    })
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use docsearch_core::FieldBoosts;
    use docsearch_worker::{SearchWorker, StaticCorpusSource};
    use tokio::sync::watch;
    use tokio_stream::wrappers::WatchStream;

    use super::*;

    #[test]
    fn test_query_from_path() {
        assert_eq!(query_from_path("guide/http-client"), "guide http client");
        assert_eq!(query_from_path("/api/core/NgZone/"), "api core NgZone");
        assert_eq!(query_from_path("start"), "start");
        assert_eq!(query_from_path("///"), "");
        assert_eq!(query_from_path("snake_case.html"), "snake_case html");
    }

    #[test]
    fn test_decode_search_param() {
        assert_eq!(decode_search_param("router+outlet"), "router outlet");
        assert_eq!(decode_search_param("plain"), "plain");
    }

    #[tokio::test]
    async fn test_related_pages_follow_location() {
        let corpus = r#"{"dictionary": "client interceptors", "pages": [
            {"path": "guide/http", "title": "HTTP client", "headings": [0, 1], "topics": "http"},
            {"path": "guide/forms", "title": "Forms", "topics": "forms"}
        ]}"#;
        let client = SearchClient::new(
            move || {
                SearchWorker::new(
                    Arc::new(StaticCorpusSource::new(corpus)),
                    FieldBoosts::default(),
                )
                .spawn()
            },
            Duration::from_secs(60),
        );

        let (location, current_path) = watch::channel("guide/htttp-client".to_string());
        let mut related = Box::pin(related_pages(client, WatchStream::new(current_path)));

        let first = related.next().await.unwrap().unwrap();
        assert_eq!(first.query, "guide htttp client");
        assert_eq!(first.results[0].path, "guide/http");

        location.send("forms/".to_string()).unwrap();
        let second = related.next().await.unwrap().unwrap();
        assert_eq!(second.query, "forms");
        assert_eq!(second.results[0].path, "guide/forms");
    }
}
