//! Query string parsing.
//!
//! Supported syntax, one clause per whitespace-delimited token:
//!
//! - `+term` requires the term, `-term` prohibits it
//! - `title:term` restricts the clause to one field
//! - `*` inside a term is a wildcard over the vocabulary
//! - `term^10` boosts the clause, `term~1` allows one edit

use crate::{QueryError, Result, index::Field, pipeline};

/// How a clause constrains the matching documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Contributes to the score; at least one optional clause must match
    /// when no clause is required.
    Optional,
    /// Every matching document must contain the term.
    Required,
    /// No matching document may contain the term.
    Prohibited,
}

/// A single parsed query clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    /// Normalised term, or the lowercased pattern for wildcard clauses.
    pub term: String,

    /// Field restriction; `None` searches every field.
    pub field: Option<Field>,

    pub presence: Presence,

    pub boost: f64,

    pub edit_distance: u32,

    pub wildcard: bool,
}

/// A parsed query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub clauses: Vec<Clause>,
}

impl Query {
    /// Parse a query string.
    ///
    /// Clauses whose term normalises to nothing (for example a bare `"`) are
    /// dropped rather than rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let clauses = text
            .split_whitespace()
            .map(parse_clause)
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { clauses })
    }

    /// Check if the query has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Whether every clause is prohibited.
    pub fn is_negated(&self) -> bool {
        !self.clauses.is_empty()
            && self
                .clauses
                .iter()
                .all(|clause| clause.presence == Presence::Prohibited)
    }
}

fn parse_clause(token: &str) -> Result<Option<Clause>> {
    let (presence, rest) = if let Some(rest) = token.strip_prefix('+') {
        (Presence::Required, rest)
    } else if let Some(rest) = token.strip_prefix('-') {
        (Presence::Prohibited, rest)
    } else {
        (Presence::Optional, token)
    };

    if rest.is_empty() {
        return Err(QueryError::MissingTerm(token.to_string()));
    }

    let (field, rest) = match rest.split_once(':') {
        Some((name, term)) => {
            let field = Field::from_name(name).ok_or_else(|| QueryError::UnknownField {
                field: name.to_string(),
                available: Field::ALL.map(Field::name).join(", "),
            })?;
            if term.is_empty() {
                return Err(QueryError::MissingTerm(format!("{name}:")));
            }
            (Some(field), term)
        }
        None => (None, rest),
    };

    let modifier_start = rest.find(is_modifier).unwrap_or(rest.len());
    let (term, mut modifiers) = rest.split_at(modifier_start);
    if term.is_empty() {
        return Err(QueryError::MissingTerm(token.to_string()));
    }

    let mut boost = 1.0;
    let mut edit_distance = 0;
    while let Some(marker) = modifiers.chars().next() {
        let body = &modifiers[marker.len_utf8()..];
        let end = body.find(is_modifier).unwrap_or(body.len());
        let (value, next) = body.split_at(end);

        if marker == '^' {
            boost = value
                .parse::<f64>()
                .ok()
                .filter(|b| b.is_finite())
                .ok_or_else(|| QueryError::InvalidBoost(value.to_string()))?;
        } else {
            edit_distance = value
                .parse::<u32>()
                .map_err(|_| QueryError::InvalidEditDistance(value.to_string()))?;
        }

        modifiers = next;
    }

    let wildcard = term.contains('*');
    let term = if wildcard {
        term.to_lowercase()
    } else {
        pipeline::query_term(term)
    };

    if term.is_empty() {
        return Ok(None);
    }

    Ok(Some(Clause {
        term,
        field,
        presence,
        boost,
        edit_distance,
        wildcard,
    }))
}

fn is_modifier(c: char) -> bool {
    c == '^' || c == '~'
}
