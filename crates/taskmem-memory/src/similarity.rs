//! Token-overlap similarity between task descriptions.
//!
//! Tokens are lower-cased, whitespace-separated words with no stemming,
//! punctuation stripping or stop-word removal. Two descriptions score
//! `|A ∩ B| / |A ∪ B|` over their token sets.

use crate::model::MemoryRecord;
use std::collections::HashSet;

/// Minimum score a candidate needs when no threshold is given.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.5;

/// A borrowed record and the score it earned against a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRecord<'a> {
    /// Position of the record in the scanned slice.
    pub index: usize,
    /// The matched record.
    pub record: &'a MemoryRecord,
    /// Jaccard score in `[0, 1]`.
    pub score: f64,
}

/// Split text into its set of lower-cased whitespace tokens.
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of two token sets; `None` when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> Option<f64> {
    let union = a.union(b).count();
    if union == 0 {
        return None;
    }
    let intersection = a.intersection(b).count();
    Some(intersection as f64 / union as f64)
}

/// Find the record whose task best matches `query`.
///
/// Records with an empty token union are skipped. Ties keep the earliest
/// record. Returns `None` when nothing scores at least `threshold`.
pub fn find_best_match<'a>(
    query: &str,
    records: &'a [MemoryRecord],
    threshold: f64,
) -> Option<ScoredRecord<'a>> {
    let query_tokens = tokenize(query);
    let mut best: Option<ScoredRecord<'a>> = None;

    for (index, record) in records.iter().enumerate() {
        let Some(score) = jaccard(&query_tokens, &tokenize(&record.task)) else {
            continue;
        };
        let replace = match &best {
            Some(current) => score > current.score,
            None => true,
        };
        if replace {
            best = Some(ScoredRecord {
                index,
                record,
                score,
            });
        }
    }

    best.filter(|candidate| candidate.score >= threshold)
}
