//! Grouping of flat result lists into display areas.

use std::collections::BTreeMap;

use docsearch_index::{SearchResult, SearchResults};
use serde::Serialize;

/// Number of priority pages per area.
pub const DEFAULT_PRIORITY_LIMIT: usize = 5;

/// Area for paths whose first segment is not mapped.
pub const OTHER_AREA: &str = "other";

const FOLDER_AREAS: &[(&str, &str)] = &[
    ("api", "api"),
    ("cli", "cli"),
    ("docs", "guides"),
    ("errors", "errors"),
    ("guide", "guides"),
    ("start", "tutorials"),
    ("tutorial", "tutorials"),
];

/// One named group of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultArea<'a> {
    pub name: &'static str,

    /// Remaining pages sorted by title, then leftover deprecated pages.
    pub pages: Vec<&'a SearchResult>,

    /// The top-ranked pages, in rank order.
    pub priority_pages: Vec<&'a SearchResult>,
}

/// Progress of a search as seen by a results view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchState {
    InProgress,
    HasResult,
    HasNoResult,
}

impl SearchState {
    pub fn of(results: Option<&SearchResults>) -> Self {
        match results {
            None => SearchState::InProgress,
            Some(results) if results.results.is_empty() => SearchState::HasNoResult,
            Some(_) => SearchState::HasResult,
        }
    }
}

/// Map a page path to its area by its first path segment.
pub fn area_for_path(path: &str) -> &'static str {
    let folder = path.split('/').next().unwrap_or_default();
    FOLDER_AREAS
        .iter()
        .find(|&&(name, _)| name == folder)
        .map_or(OTHER_AREA, |&(_, area)| area)
}

/// Group results by area, areas sorted by name.
///
/// Results without a title are skipped. Each area keeps its first
/// `priority_limit` non-deprecated results as priority pages, backfilled
/// from the remaining pages and then from deprecated pages when short.
pub fn group_results(results: &[SearchResult], priority_limit: usize) -> Vec<SearchResultArea<'_>> {
    let mut areas: BTreeMap<&'static str, Vec<&SearchResult>> = BTreeMap::new();
    for result in results.iter().filter(|r| !r.title.is_empty()) {
        areas
            .entry(area_for_path(&result.path))
            .or_default()
            .push(result);
    }

    areas
        .into_iter()
        .map(|(name, results)| split_pages(name, results, priority_limit))
        .collect()
}

fn split_pages<'a>(
    name: &'static str,
    results: Vec<&'a SearchResult>,
    limit: usize,
) -> SearchResultArea<'a> {
    let mut priority_pages = Vec::with_capacity(limit);
    let mut pages = Vec::new();
    let mut deprecated = Vec::new();

    for result in results {
        if result.deprecated {
            deprecated.push(result);
        } else if priority_pages.len() < limit {
            priority_pages.push(result);
        } else {
            pages.push(result);
        }
    }

    let shortfall = limit.saturating_sub(priority_pages.len());
    let from_pages = shortfall.min(pages.len());
    priority_pages.extend(pages.drain(..from_pages));

    let shortfall = limit.saturating_sub(priority_pages.len());
    let from_deprecated = shortfall.min(deprecated.len());
    priority_pages.extend(deprecated.drain(..from_deprecated));

    pages.sort_by_cached_key(|page| page.title.to_uppercase());
    pages.extend(deprecated);

    SearchResultArea {
        name,
        pages,
        priority_pages,
    }
}
