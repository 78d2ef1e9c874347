//! End-to-end tests for the search index.
//!
//! These tests encode a small documentation corpus, ship it through JSON and
//! query the rebuilt index.

use docsearch_core::FieldBoosts;
use docsearch_index::{EncodedPages, PageInfo, QueryEngine, SearchInfo, build_index};

fn page(path: &str, title: &str, headings: &str, members: &str, topics: &str) -> PageInfo {
    PageInfo {
        path: path.to_string(),
        page_type: path.split('/').next().unwrap_or_default().to_string(),
        title: title.to_string(),
        headings: headings.to_string(),
        members: members.to_string(),
        topics: topics.to_string(),
        title_words: title.to_lowercase(),
        ..Default::default()
    }
}

fn sample_engine() -> QueryEngine {
    let mut info = SearchInfo::new();
    for page in [
        page(
            "api/common/http/HttpClient",
            "HttpClient",
            "Usage notes",
            "get post put delete request",
            "http",
        ),
        page(
            "guide/http",
            "Communicating with backend services using HTTP",
            "Setup for server communication Requesting data",
            "",
            "http guide",
        ),
        page(
            "guide/content-projection",
            "Content projection",
            "ng-content Multi-slot projection",
            "",
            "components",
        ),
        page(
            "tutorial/tour-of-heroes",
            "Tour of Heroes",
            "Create a project",
            "",
            "tutorial",
        ),
    ] {
        info.insert(page.path.clone(), page);
    }

    let json = EncodedPages::encode_info(&info).to_json().unwrap();
    let corpus = EncodedPages::from_json(&json).unwrap();
    QueryEngine::new(build_index(&corpus, &FieldBoosts::default()))
}

fn paths(engine: &QueryEngine, query: &str) -> Vec<String> {
    engine
        .query(query)
        .iter()
        .map(|page| page.path.clone())
        .collect()
}

#[test]
fn test_round_trip_corpus_is_searchable() {
    let engine = sample_engine();
    assert_eq!(engine.page_count(), 4);
    assert_eq!(paths(&engine, "heroes"), vec!["tutorial/tour-of-heroes"]);
}

#[test]
fn test_all_terms_preferred() {
    let engine = sample_engine();
    assert_eq!(paths(&engine, "http backend"), vec!["guide/http"]);
}

#[test]
fn test_topic_weight_ranks_first() {
    let engine = sample_engine();
    let found = paths(&engine, "http");
    assert_eq!(found.len(), 2);
    assert!(found.contains(&"api/common/http/HttpClient".to_string()));
    assert!(found.contains(&"guide/http".to_string()));
}

#[test]
fn test_punctuated_term() {
    let engine = sample_engine();
    assert_eq!(
        paths(&engine, "ng-content"),
        vec!["guide/content-projection"]
    );
}

#[test]
fn test_quoted_query() {
    let engine = sample_engine();
    assert_eq!(
        paths(&engine, "\"projection\""),
        vec!["guide/content-projection"]
    );
}

#[test]
fn test_title_prefix_fallback() {
    let engine = sample_engine();
    assert_eq!(
        paths(&engine, "httpcli"),
        vec!["api/common/http/HttpClient"]
    );
}

#[test]
fn test_member_search() {
    let engine = sample_engine();
    assert_eq!(paths(&engine, "delete"), vec!["api/common/http/HttpClient"]);
}

#[test]
fn test_no_match() {
    let engine = sample_engine();
    assert!(paths(&engine, "zzzznotfound").is_empty());
}

#[test]
fn test_excluded_term_is_not_required() {
    let engine = sample_engine();
    assert_eq!(
        paths(&engine, "http -backend"),
        vec!["api/common/http/HttpClient"]
    );

    let found = paths(&engine, "-backend");
    assert_eq!(found.len(), 3);
    assert!(!found.contains(&"guide/http".to_string()));
}
