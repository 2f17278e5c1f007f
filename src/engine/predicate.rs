//! Predicate engine: free-text matching over a record's fields.
//!
//! The default [`MatchMode::Substring`] is a literal, case-insensitive
//! substring test against the canonical string of every field. Matching is a
//! pure function of `(record, query)`; there is no incremental narrowing
//! state carried between keystrokes.
//!
//! [`MatchMode::Fuzzy`] is an opt-in alternative backed by the Skim algorithm
//! from `fuzzy-matcher`: the query is tokenized on whitespace and every token
//! has to fuzzy-match at least one field.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::rows::Row;
use crate::domain::Record;

/// Matching algorithm used for the free-text query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Case-insensitive substring of any field.
    #[default]
    Substring,
    /// Every whitespace-separated token fuzzy-matches some field.
    Fuzzy,
}

/// A query prepared once per filter pass.
///
/// Lowercasing and tokenizing happen here instead of once per record.
pub struct Query {
    raw: String,
    lowered: String,
    tokens: Vec<String>,
    mode: MatchMode,
    matcher: Option<SkimMatcherV2>,
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("raw", &self.raw)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl Query {
    /// Prepares `raw` for matching under `mode`.
    #[must_use]
    pub fn new(raw: &str, mode: MatchMode) -> Self {
        let lowered = raw.to_lowercase();
        let (tokens, matcher) = match mode {
            MatchMode::Substring => (Vec::new(), None),
            MatchMode::Fuzzy => (
                lowered.split_whitespace().map(str::to_string).collect(),
                Some(SkimMatcherV2::default()),
            ),
        };

        Self {
            raw: raw.to_string(),
            lowered,
            tokens,
            mode,
            matcher,
        }
    }

    /// The query as typed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The matching algorithm this query was prepared for.
    #[must_use]
    pub const fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Whether this query matches everything without inspecting records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.mode {
            MatchMode::Substring => self.raw.is_empty(),
            MatchMode::Fuzzy => self.tokens.is_empty(),
        }
    }

    /// Tests `record` against the query.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if self.is_empty() {
            return true;
        }

        let texts: Vec<String> = record
            .fields()
            .iter()
            .filter_map(|value| value.canonical_string().map(|text| text.to_lowercase()))
            .collect();

        match (&self.mode, &self.matcher) {
            (MatchMode::Fuzzy, Some(matcher)) => self.tokens.iter().all(|token| {
                texts
                    .iter()
                    .any(|text| matcher.fuzzy_match(text, token).is_some())
            }),
            _ => texts.iter().any(|text| text.contains(&self.lowered)),
        }
    }

    /// Returns the byte ranges of `text` to highlight for this query.
    ///
    /// Ranges are `(start, end)` with exclusive end, sorted and non-overlapping.
    /// Substring mode reports every non-overlapping occurrence; fuzzy mode
    /// reports coalesced runs of matched characters.
    #[must_use]
    pub fn highlight_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        if self.is_empty() {
            return Vec::new();
        }

        match (&self.mode, &self.matcher) {
            (MatchMode::Fuzzy, Some(matcher)) => self.fuzzy_ranges(matcher, text),
            _ => substring_ranges(text, &self.lowered),
        }
    }

    fn fuzzy_ranges(&self, matcher: &SkimMatcherV2, text: &str) -> Vec<(usize, usize)> {
        let mut matched_chars = BTreeSet::new();
        for token in &self.tokens {
            if let Some((_score, indices)) = matcher.fuzzy_indices(text, token) {
                matched_chars.extend(indices);
            }
        }

        if matched_chars.is_empty() {
            return Vec::new();
        }

        let mut ranges: Vec<(usize, usize)> = Vec::new();
        for (char_idx, (byte_idx, ch)) in text.char_indices().enumerate() {
            if !matched_chars.contains(&char_idx) {
                continue;
            }
            let end = byte_idx + ch.len_utf8();
            match ranges.last_mut() {
                Some(last) if last.1 == byte_idx => last.1 = end,
                _ => ranges.push((byte_idx, end)),
            }
        }
        ranges
    }
}

/// Case-insensitive substring test of `query` against every field of `record`.
///
/// An empty query matches every record.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use virtgrid::domain::JsonRecord;
/// use virtgrid::engine::matches;
///
/// let record = JsonRecord::from_value(json!({"id": 1, "name": "Apple", "qty": 120}), "id", 0)?;
/// assert!(matches(&record, "APP"));
/// assert!(matches(&record, "12"));
/// assert!(matches(&record, ""));
/// assert!(!matches(&record, "pear"));
/// # Ok::<(), virtgrid::GridError>(())
/// ```
pub fn matches<R: Record>(record: &R, query: &str) -> bool {
    Query::new(query, MatchMode::Substring).matches(record)
}

/// Returns the base positions of every row matching `query`, in base order.
pub fn filter_indices<R: Record>(rows: &[Row<R>], query: &Query) -> Vec<usize> {
    if query.is_empty() {
        return (0..rows.len()).collect();
    }

    rows.iter()
        .enumerate()
        .filter(|(_, row)| query.matches(row.record()))
        .map(|(idx, _)| idx)
        .collect()
}

/// Finds non-overlapping occurrences of an already-lowercased `needle` in
/// `text`, reported as byte ranges of the original `text`.
fn substring_ranges(text: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }

    // Lowercasing can change byte lengths, so keep a map from each byte of
    // the lowered text back to the original char it came from.
    let mut lowered = String::with_capacity(text.len());
    let mut origin = Vec::with_capacity(text.len() + 1);
    for (byte_idx, ch) in text.char_indices() {
        for lower in ch.to_lowercase() {
            for _ in 0..lower.len_utf8() {
                origin.push(byte_idx);
            }
            lowered.push(lower);
        }
    }
    origin.push(text.len());

    let original_end = |lowered_end: usize| -> usize {
        if lowered_end >= lowered.len() {
            return text.len();
        }
        let start = origin[lowered_end];
        if origin[lowered_end - 1] == start {
            // Match ended inside one original char's expansion; include it.
            start + text[start..].chars().next().map_or(0, char::len_utf8)
        } else {
            start
        }
    };

    lowered
        .match_indices(needle)
        .map(|(start, matched)| (origin[start], original_end(start + matched.len())))
        .collect()
}
