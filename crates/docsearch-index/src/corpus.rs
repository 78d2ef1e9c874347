//! Encoded corpus format.
//!
//! The corpus ships every page's `headings`, `keywords` and `members` as
//! integer indices into a single space-separated dictionary, so that common
//! tokens are transmitted once per corpus rather than once per page.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::CorpusError;

/// One corpus entry as transmitted over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedPage {
    /// Unique page path, used as the index reference.
    pub path: String,

    /// Page category.
    #[serde(rename = "type", default)]
    pub page_type: String,

    /// Page title.
    #[serde(default)]
    pub title: String,

    /// Dictionary indices of the heading tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headings: Option<Vec<i64>>,

    /// Dictionary indices of the keyword tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<i64>>,

    /// Dictionary indices of the member tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<i64>>,

    /// Plain-text topics.
    #[serde(default)]
    pub topics: String,

    /// Title split into searchable words.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title_words: String,

    /// Whether the page documents a deprecated API.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
}

/// Corpus envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedPages {
    /// Space-separated token list shared by all pages.
    pub dictionary: String,

    /// Encoded pages.
    pub pages: Vec<EncodedPage>,
}

/// An [`EncodedPage`] with its dictionary fields expanded back to text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPage {
    pub path: String,

    #[serde(rename = "type")]
    pub page_type: String,

    pub title: String,

    pub headings: String,

    pub keywords: String,

    pub members: String,

    pub topics: String,

    #[serde(default)]
    pub title_words: String,

    #[serde(default)]
    pub deprecated: bool,
}

/// Page path to decoded page, used to hydrate index hits.
pub type DecodedPageMap = HashMap<String, Arc<DecodedPage>>;

/// Plain-text page metadata produced by the documentation build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub path: String,

    #[serde(rename = "type", default)]
    pub page_type: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub headings: String,

    #[serde(default)]
    pub keywords: String,

    #[serde(default)]
    pub members: String,

    #[serde(default)]
    pub topics: String,

    #[serde(default)]
    pub title_words: String,

    #[serde(default)]
    pub deprecated: bool,
}

/// Page metadata keyed by path.
pub type SearchInfo = BTreeMap<String, PageInfo>;

/// The shared token dictionary of a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    tokens: Vec<String>,
}

impl Dictionary {
    /// Split a dictionary string on single spaces.
    pub fn parse(dictionary: &str) -> Self {
        Self {
            tokens: dictionary.split(' ').map(str::to_string).collect(),
        }
    }

    /// Resolve one index. Out-of-range and negative indices resolve to `""`.
    pub fn token(&self, index: i64) -> &str {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.tokens.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Expand a list of indices to space-joined text. An absent list
    /// expands to `""`.
    pub fn expand(&self, indices: Option<&[i64]>) -> String {
        match indices {
            Some(indices) => indices
                .iter()
                .map(|&i| self.token(i))
                .collect::<Vec<_>>()
                .join(" "),
            None => String::new(),
        }
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the dictionary holds no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl EncodedPage {
    /// Expand the dictionary-encoded fields of this page.
    pub fn decode(&self, dictionary: &Dictionary) -> DecodedPage {
        DecodedPage {
            path: self.path.clone(),
            page_type: self.page_type.clone(),
            title: self.title.clone(),
            headings: dictionary.expand(self.headings.as_deref()),
            keywords: dictionary.expand(self.keywords.as_deref()),
            members: dictionary.expand(self.members.as_deref()),
            topics: self.topics.clone(),
            title_words: self.title_words.clone(),
            deprecated: self.deprecated,
        }
    }
}

impl EncodedPages {
    /// Parse a corpus from JSON text.
    pub fn from_json(json: &str) -> Result<Self, CorpusError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the corpus to JSON.
    pub fn to_json(&self) -> Result<String, CorpusError> {
        Ok(serde_json::to_string(self)?)
    }

    /// The parsed dictionary of this corpus.
    pub fn dictionary(&self) -> Dictionary {
        Dictionary::parse(&self.dictionary)
    }

    /// Decode every page against the corpus dictionary.
    pub fn decode_all(&self) -> Vec<DecodedPage> {
        let dictionary = self.dictionary();
        self.pages
            .iter()
            .map(|page| page.decode(&dictionary))
            .collect()
    }

    /// Encode plain-text pages, assigning dictionary indices to
    /// `headings`, `keywords` and `members` tokens in order of first
    /// appearance.
    pub fn encode<'a>(pages: impl IntoIterator<Item = &'a PageInfo>) -> Self {
        let mut encoder = DictionaryEncoder::default();

        let pages: Vec<EncodedPage> = pages
            .into_iter()
            .map(|page| EncodedPage {
                path: page.path.clone(),
                page_type: page.page_type.clone(),
                title: page.title.clone(),
                headings: Some(encoder.encode(&page.headings)),
                keywords: Some(encoder.encode(&page.keywords)),
                members: Some(encoder.encode(&page.members)),
                topics: page.topics.clone(),
                title_words: page.title_words.clone(),
                deprecated: page.deprecated,
            })
            .collect();

        debug!(
            pages = pages.len(),
            tokens = encoder.tokens.len(),
            "Encoded corpus"
        );

        Self {
            dictionary: encoder.tokens.join(" "),
            pages,
        }
    }

    /// Encode a path-keyed page map, in path order.
    pub fn encode_info(info: &SearchInfo) -> Self {
        Self::encode(info.values())
    }
}

#[derive(Default)]
struct DictionaryEncoder {
    tokens: Vec<String>,
    positions: HashMap<String, i64>,
}

impl DictionaryEncoder {
    fn encode(&mut self, text: &str) -> Vec<i64> {
        text.split_whitespace()
            .map(|token| {
                if let Some(&index) = self.positions.get(token) {
                    return index;
                }
                let index = self.tokens.len() as i64;
                self.tokens.push(token.to_string());
                self.positions.insert(token.to_string(), index);
                index
            })
            .collect()
    }
}
