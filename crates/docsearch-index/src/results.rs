//! Public result records.

use serde::{Deserialize, Serialize};

use crate::corpus::DecodedPage;

/// One search hit as handed to consumers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub path: String,

    #[serde(default)]
    pub title: String,

    #[serde(rename = "type", default)]
    pub page_type: String,

    #[serde(default)]
    pub title_words: String,

    #[serde(default)]
    pub keywords: String,

    #[serde(default)]
    pub topics: String,

    #[serde(default)]
    pub deprecated: bool,
}

impl From<&DecodedPage> for SearchResult {
    fn from(page: &DecodedPage) -> Self {
        Self {
            path: page.path.clone(),
            title: page.title.clone(),
            page_type: page.page_type.clone(),
            title_words: page.title_words.clone(),
            keywords: page.keywords.clone(),
            topics: page.topics.clone(),
            deprecated: page.deprecated,
        }
    }
}

/// The results of one completed query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_from_decoded_page_json() {
        // worker responses carry full decoded pages; extra fields are ignored
        let results: SearchResults = serde_json::from_str(
            r#"{"query": "http", "results": [
                {"path": "api/common/http", "type": "package", "title": "HttpClient",
                 "headings": "Usage", "members": "get post", "keywords": "",
                 "topics": "", "titleWords": "http client", "deprecated": false}
            ]}"#,
        )
        .unwrap();

        assert_eq!(results.results[0].page_type, "package");
        assert_eq!(results.results[0].title_words, "http client");
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = SearchResult {
            path: "guide/forms".to_string(),
            title: "Forms".to_string(),
            page_type: "content".to_string(),
            title_words: "forms".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "content");
        assert_eq!(json["titleWords"], "forms");
        assert_eq!(json["deprecated"], false);
    }
}
