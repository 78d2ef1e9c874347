//! Index construction and staged query execution.

use std::sync::Arc;

use docsearch_core::FieldBoosts;
use tracing::{debug, error, info, warn};

use crate::{
    Result,
    corpus::{DecodedPage, DecodedPageMap, EncodedPages},
    index::{Hit, IndexBuilder, InvertedIndex, Searchable},
    results::{SearchResult, SearchResults},
};

/// The built index together with the page map used to hydrate its hits.
#[derive(Debug, Clone)]
pub struct BuiltIndex {
    pub index: InvertedIndex,
    pub decoded_page_map: DecodedPageMap,
}

/// Decode every page of a corpus and index it under its path.
///
/// When two pages share a path the first one wins, so the index and the page
/// map always hold the same set of paths.
pub fn build_index(encoded: &EncodedPages, boosts: &FieldBoosts) -> BuiltIndex {
    let dictionary = encoded.dictionary();
    let mut builder = IndexBuilder::new(*boosts);
    let mut decoded_page_map = DecodedPageMap::with_capacity(encoded.pages.len());

    for page in &encoded.pages {
        let decoded = page.decode(&dictionary);
        if decoded_page_map.contains_key(&decoded.path) {
            warn!(path = %decoded.path, "Skipping page with duplicate path");
            continue;
        }
        builder.add(&decoded);
        decoded_page_map.insert(decoded.path.clone(), Arc::new(decoded));
    }

    let index = builder.build();
    info!(
        pages = index.len(),
        terms = index.term_count(),
        dictionary = dictionary.len(),
        "Search index built"
    );

    BuiltIndex {
        index,
        decoded_page_map,
    }
}

/// Strip one leading and one trailing quote character, single or double.
pub fn strip_quotes(text: &str) -> &str {
    let text = text.strip_prefix(['"', '\'']).unwrap_or(text);
    text.strip_suffix(['"', '\'']).unwrap_or(text)
}

/// Search stages, tried in order until one produces hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    AllTerms,
    AnyTerm,
    TitleWildcard,
}

impl Stage {
    const ORDER: [Stage; 3] = [Stage::AllTerms, Stage::AnyTerm, Stage::TitleWildcard];

    fn query_text(self, text: &str) -> String {
        match self {
            Stage::AllTerms => text
                .split_whitespace()
                .map(|term| {
                    if term.starts_with(['+', '-']) {
                        term.to_string()
                    } else {
                        format!("+{term}")
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            Stage::AnyTerm => text.to_string(),
            Stage::TitleWildcard => {
                let first = text.split_whitespace().next().unwrap_or_default();
                format!("{text} title:*{first}*")
            }
        }
    }
}

/// Answers text queries against a built index.
#[derive(Debug)]
pub struct QueryEngine<I = InvertedIndex> {
    index: I,
    pages: DecodedPageMap,
}

impl QueryEngine<InvertedIndex> {
    /// Create an engine over a freshly built index.
    pub fn new(built: BuiltIndex) -> Self {
        Self {
            index: built.index,
            pages: built.decoded_page_map,
        }
    }
}

impl<I: Searchable> QueryEngine<I> {
    /// Create an engine over any searchable index and its page map.
    pub fn with_index(index: I, pages: DecodedPageMap) -> Self {
        Self { index, pages }
    }

    /// Number of pages available for hydration.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Run a query through the staged fallback and hydrate the hits.
    ///
    /// Never fails: a query the index rejects is logged and yields no results.
    pub fn query(&self, text: &str) -> Vec<Arc<DecodedPage>> {
        let text = strip_quotes(text);
        if text.trim().is_empty() {
            return Vec::new();
        }

        match self.staged_search(text) {
            Ok(hits) => self.hydrate(hits),
            Err(err) => {
                error!(query = %text, error = %err, "Search query failed");
                Vec::new()
            }
        }
    }

    /// Run a query and package the hits as public result records.
    pub fn results(&self, text: &str) -> SearchResults {
        SearchResults {
            query: text.to_string(),
            results: self
                .query(text)
                .iter()
                .map(|page| SearchResult::from(page.as_ref()))
                .collect(),
        }
    }

    fn staged_search(&self, text: &str) -> Result<Vec<Hit>> {
        for stage in Stage::ORDER {
            let query = stage.query_text(text);
            let hits = self.index.search(&query)?;
            debug!(?stage, query = %query, hits = hits.len(), "Search stage finished");
            if !hits.is_empty() {
                return Ok(hits);
            }
        }
        Ok(Vec::new())
    }

    fn hydrate(&self, hits: Vec<Hit>) -> Vec<Arc<DecodedPage>> {
        hits.into_iter()
            .filter_map(|hit| match self.pages.get(&hit.reference) {
                Some(page) => Some(Arc::clone(page)),
                None => {
                    warn!(reference = %hit.reference, "Index hit has no decoded page");
                    None
                }
            })
            .collect()
    }
}
