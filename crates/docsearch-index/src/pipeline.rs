//! Text processing applied to indexed fields and query terms.
//!
//! Fields are split on whitespace only, so tokens such as `ng-content` stay
//! whole. Tokens are lowercased, trimmed of surrounding punctuation and
//! filtered against an English stop-word list. No stemming is performed.

/// English stop words removed at index time.
const STOP_WORDS: &[&str] = &[
    "a", "able", "about", "across", "after", "all", "almost", "also", "am", "among", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "but", "by", "can", "cannot", "could",
    "dear", "did", "do", "does", "either", "else", "ever", "every", "for", "from", "get", "got",
    "had", "has", "have", "he", "her", "hers", "him", "his", "how", "however", "i", "if", "in",
    "into", "is", "it", "its", "just", "least", "let", "like", "likely", "may", "me", "might",
    "most", "must", "my", "neither", "no", "nor", "not", "of", "off", "often", "on", "only", "or",
    "other", "our", "own", "rather", "said", "say", "says", "she", "should", "since", "so", "some",
    "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "tis", "to",
    "too", "twas", "us", "wants", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "would", "yet", "you", "your",
];

/// Split text into lowercase whitespace-delimited tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Strip leading and trailing non-word characters from a token.
pub fn trim_token(token: &str) -> &str {
    token.trim_matches(|c: char| !is_word_char(c))
}

/// Whether a token is an English stop word.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.binary_search(&token).is_ok()
}

/// Run the full index-time pipeline over a field value.
pub fn index_terms(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter_map(|token| {
            let trimmed = trim_token(&token);
            if trimmed.is_empty() || is_stop_word(trimmed) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}

/// Normalise a single query term the way indexed tokens are normalised,
/// minus stop-word removal.
pub fn query_term(term: &str) -> String {
    trim_token(&term.to_lowercase()).to_string()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_sorted() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
    }

    #[test]
    fn test_tokenize_whitespace_only() {
        let tokens = tokenize("Use ng-content\tWITH  @Component");
        assert_eq!(tokens, vec!["use", "ng-content", "with", "@component"]);
    }

    #[test]
    fn test_trim_token() {
        assert_eq!(trim_token("@component"), "component");
        assert_eq!(trim_token("(ngmodel)"), "ngmodel");
        assert_eq!(trim_token("ng-content"), "ng-content");
        assert_eq!(trim_token("..."), "");
    }

    #[test]
    fn test_index_terms_drop_stop_words() {
        let terms = index_terms("How to use the Router");
        assert_eq!(terms, vec!["use", "router"]);
    }

    #[test]
    fn test_index_terms_keep_unicode() {
        assert_eq!(index_terms("路由 配置"), vec!["路由", "配置"]);
    }

    #[test]
    fn test_no_stemming() {
        assert_eq!(index_terms("routing routes"), vec!["routing", "routes"]);
    }

    #[test]
    fn test_query_term() {
        assert_eq!(query_term("HttpClient,"), "httpclient");
        assert_eq!(query_term("\"quoted\""), "quoted");
    }
}
