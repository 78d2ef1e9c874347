//! In-memory inverted index with per-field BM25 weights.

use std::collections::{BTreeMap, HashMap, HashSet};

use docsearch_core::FieldBoosts;
use tracing::{debug, warn};

use crate::{
    Result,
    corpus::DecodedPage,
    pipeline,
    query::{Clause, Presence, Query},
};

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// Indexed page fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Topics,
    Title,
    Headings,
    Members,
    Keywords,
}

impl Field {
    /// Every indexed field.
    pub const ALL: [Field; 5] = [
        Field::Topics,
        Field::Title,
        Field::Headings,
        Field::Members,
        Field::Keywords,
    ];

    /// Field name as used in `field:term` clauses.
    pub fn name(self) -> &'static str {
        match self {
            Field::Topics => "topics",
            Field::Title => "title",
            Field::Headings => "headings",
            Field::Members => "members",
            Field::Keywords => "keywords",
        }
    }

    /// Look a field up by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    fn boost(self, boosts: &FieldBoosts) -> f64 {
        match self {
            Field::Topics => boosts.topics,
            Field::Title => boosts.title,
            Field::Headings => boosts.headings,
            Field::Members => boosts.members,
            Field::Keywords => boosts.keywords,
        }
    }

    fn value(self, page: &DecodedPage) -> &str {
        match self {
            Field::Topics => &page.topics,
            Field::Title => &page.title,
            Field::Headings => &page.headings,
            Field::Members => &page.members,
            Field::Keywords => &page.keywords,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// A matching document reference and its score.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    /// The page path the document was indexed under.
    pub reference: String,

    pub score: f64,
}

/// Something a query string can be executed against.
pub trait Searchable {
    /// Execute a query string, returning hits ordered by descending score.
    fn search(&self, query: &str) -> Result<Vec<Hit>>;
}

#[derive(Debug, Clone)]
struct Posting {
    doc: usize,
    field: Field,
    weight: f64,
}

/// Builds an [`InvertedIndex`] from decoded pages.
#[derive(Debug)]
pub struct IndexBuilder {
    boosts: FieldBoosts,
    refs: Vec<String>,
    seen: HashSet<String>,
    term_frequencies: Vec<[HashMap<String, usize>; 5]>,
    field_lengths: Vec<[usize; 5]>,
}

impl IndexBuilder {
    /// Create a builder with the given field boosts.
    pub fn new(boosts: FieldBoosts) -> Self {
        Self {
            boosts,
            refs: Vec::new(),
            seen: HashSet::new(),
            term_frequencies: Vec::new(),
            field_lengths: Vec::new(),
        }
    }

    /// Add a page under its path. Returns `false` if the path was already
    /// indexed, in which case the page is ignored.
    pub fn add(&mut self, page: &DecodedPage) -> bool {
        if !self.seen.insert(page.path.clone()) {
            warn!(path = %page.path, "Duplicate page path, keeping the first");
            return false;
        }

        let mut frequencies: [HashMap<String, usize>; 5] = Default::default();
        let mut lengths = [0; 5];

        for field in Field::ALL {
            let terms = pipeline::index_terms(field.value(page));
            lengths[field.slot()] = terms.len();
            for term in terms {
                *frequencies[field.slot()].entry(term).or_default() += 1;
            }
        }

        self.refs.push(page.path.clone());
        self.term_frequencies.push(frequencies);
        self.field_lengths.push(lengths);
        true
    }

    /// Compute field weights and freeze the index.
    pub fn build(self) -> InvertedIndex {
        let doc_count = self.refs.len();

        let mut average_lengths = [0.0; 5];
        for lengths in &self.field_lengths {
            for (slot, &length) in lengths.iter().enumerate() {
                average_lengths[slot] += length as f64;
            }
        }
        if doc_count > 0 {
            for average in &mut average_lengths {
                *average /= doc_count as f64;
            }
        }

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for frequencies in &self.term_frequencies {
            let terms: HashSet<&str> = frequencies
                .iter()
                .flat_map(|field| field.keys().map(String::as_str))
                .collect();
            for term in terms {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        let mut postings: BTreeMap<String, Vec<Posting>> = BTreeMap::new();

        for (doc, frequencies) in self.term_frequencies.iter().enumerate() {
            for field in Field::ALL {
                let slot = field.slot();
                let length_ratio = if average_lengths[slot] > 0.0 {
                    self.field_lengths[doc][slot] as f64 / average_lengths[slot]
                } else {
                    1.0
                };

                for (term, &tf) in &frequencies[slot] {
                    let df = document_frequency.get(term.as_str()).copied().unwrap_or(1);
                    let tf = tf as f64;
                    let score = idf(df, doc_count) * ((K1 + 1.0) * tf)
                        / (K1 * (1.0 - B + B * length_ratio) + tf);
                    let weight = (score * 1000.0).round() / 1000.0 * field.boost(&self.boosts);

                    let posting = Posting { doc, field, weight };
                    postings.entry(term.clone()).or_default().push(posting);
                }
            }
        }

        debug!(
            documents = doc_count,
            terms = postings.len(),
            "Inverted index built"
        );

        InvertedIndex {
            refs: self.refs,
            postings,
        }
    }
}

/// An immutable inverted index keyed by page path.
#[derive(Debug, Clone)]
pub struct InvertedIndex {
    refs: Vec<String>,
    postings: BTreeMap<String, Vec<Posting>>,
}

impl InvertedIndex {
    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    /// Whether the index holds no documents.
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Number of distinct indexed terms.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Document references in insertion order.
    pub fn refs(&self) -> &[String] {
        &self.refs
    }

    /// Whether a term is present in any field.
    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Execute a parsed query.
    ///
    /// A document's score sums, per field, the dot product of the query and
    /// document term weights divided by the magnitude of the query's vector
    /// for that field.
    pub fn search_query(&self, query: &Query) -> Vec<Hit> {
        let mut dots: HashMap<usize, [f64; 5]> = HashMap::new();
        let mut query_norms = [0.0; 5];
        let mut required: Option<HashSet<usize>> = None;
        let mut optional = HashSet::new();
        let mut prohibited = HashSet::new();

        for clause in &query.clauses {
            let mut clause_docs = HashSet::new();

            for postings in self.expand(clause) {
                let mut fields_hit = [false; 5];

                for posting in postings {
                    if clause.field.is_some_and(|field| field != posting.field) {
                        continue;
                    }
                    clause_docs.insert(posting.doc);

                    if clause.presence == Presence::Prohibited {
                        continue;
                    }
                    let slot = posting.field.slot();
                    fields_hit[slot] = true;
                    dots.entry(posting.doc).or_insert([0.0; 5])[slot] +=
                        clause.boost * posting.weight;
                }

                for (norm, hit) in query_norms.iter_mut().zip(fields_hit) {
                    if hit {
                        *norm += clause.boost * clause.boost;
                    }
                }
            }

            match clause.presence {
                Presence::Required => {
                    required = Some(match required {
                        Some(docs) => docs.intersection(&clause_docs).copied().collect(),
                        None => clause_docs,
                    });
                }
                Presence::Prohibited => prohibited.extend(clause_docs),
                Presence::Optional => optional.extend(clause_docs),
            }
        }

        let candidates: Vec<usize> = match required {
            Some(docs) => docs.into_iter().collect(),
            None if query.is_negated() => (0..self.refs.len()).collect(),
            None => optional.into_iter().collect(),
        };

        let score = |doc: usize| -> f64 {
            dots.get(&doc).map_or(0.0, |fields| {
                fields
                    .iter()
                    .zip(query_norms)
                    .filter(|&(_, norm)| norm > 0.0)
                    .map(|(dot, norm)| dot / norm.sqrt())
                    .sum()
            })
        };

        let mut ranked: Vec<(usize, f64)> = candidates
            .into_iter()
            .filter(|doc| !prohibited.contains(doc))
            .map(|doc| (doc, score(doc)))
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .map(|(doc, score)| Hit {
                reference: self.refs[doc].clone(),
                score,
            })
            .collect()
    }

    /// Posting lists of every vocabulary term a clause matches.
    fn expand<'a>(&'a self, clause: &Clause) -> Vec<&'a Vec<Posting>> {
        if clause.wildcard {
            let prefix = clause.term.split('*').next().unwrap_or("");
            return self
                .postings
                .range(prefix.to_string()..)
                .take_while(|(term, _)| term.starts_with(prefix))
                .filter(|(term, _)| glob_match(&clause.term, term))
                .map(|(_, postings)| postings)
                .collect();
        }

        if clause.edit_distance > 0 {
            let max = clause.edit_distance as usize;
            return self
                .postings
                .iter()
                .filter(|(term, _)| levenshtein_within(&clause.term, term, max))
                .map(|(_, postings)| postings)
                .collect();
        }

        self.postings.get(&clause.term).into_iter().collect()
    }
}

impl Searchable for InvertedIndex {
    fn search(&self, query: &str) -> Result<Vec<Hit>> {
        let query = Query::parse(query)?;
        Ok(self.search_query(&query))
    }
}

fn idf(document_frequency: usize, document_count: usize) -> f64 {
    let df = document_frequency as f64;
    let n = document_count as f64;
    (1.0 + ((n - df + 0.5) / (df + 0.5)).abs()).ln()
}

/// Match `text` against a pattern in which `*` stands for any run of
/// characters.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Whether two strings are within `max` single-character edits.
fn levenshtein_within(a: &str, b: &str, max: usize) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return false;
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()] <= max
}
