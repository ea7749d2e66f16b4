//! Search matching for Riffle.
//!
//! A query matches a record when at least one field value, case-folded,
//! contains the case-folded query as a substring (OR across fields).
//! Filtering is stateless, deterministic, and order-preserving: the output
//! is always a subsequence of the input in original row order.
//!
//! Simple `to_lowercase` folding is used; locale-specific case folding is
//! out of scope.
//!
//! ## Performance
//!
//! Record sets above a threshold are matched in parallel via Rayon.
//! Parallel collection preserves input order, so both paths produce
//! identical output.

use crate::types::{Record, RecordSet};
use rayon::prelude::*;

/// Record count above which matching switches to parallel iteration
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// A compiled search query ready for matching.
///
/// The query text is lowercased once at construction and reused for every
/// record. Leading and trailing whitespace is significant: the query is
/// matched as a literal substring, never trimmed.
#[derive(Debug, Clone)]
pub struct Query {
    /// Original query text, as typed
    text: String,

    /// Pre-lowered needle for case-insensitive matching
    needle_lower: String,
}

impl Query {
    /// Compile a query from its text.
    ///
    /// # Example
    /// ```
    /// use riffle_core::Query;
    /// let query = Query::new("JOHN");
    /// ```
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let needle_lower = text.to_lowercase();
        Query { text, needle_lower }
    }

    /// The query text as typed.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Check if a record matches this query.
    ///
    /// True when any field value contains the needle, case-insensitively.
    /// The empty query matches every record.
    pub fn matches(&self, record: &Record) -> bool {
        if self.needle_lower.is_empty() {
            return true;
        }
        record
            .values_lower
            .iter()
            .any(|v| v.contains(&self.needle_lower))
    }

    /// Returns true if this query would match everything (empty text).
    pub fn matches_all(&self) -> bool {
        self.needle_lower.is_empty()
    }
}

/// Filter a record set by a query, preserving row order.
///
/// The empty query passes the full set through unchanged (it is not
/// "no results"). Matched records keep their original ids.
pub fn filter(query: &Query, set: &RecordSet) -> RecordSet {
    filter_with(query, set, DEFAULT_PARALLEL_THRESHOLD)
}

/// Filter with an explicit parallelism threshold.
///
/// Sets with more records than `parallel_threshold` are matched via Rayon;
/// smaller sets sequentially. Output is identical either way.
pub fn filter_with(query: &Query, set: &RecordSet, parallel_threshold: usize) -> RecordSet {
    if query.matches_all() {
        return set.clone();
    }

    let matched: Vec<Record> = if set.len() > parallel_threshold {
        set.records
            .par_iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect()
    } else {
        set.records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect()
    };

    let mut out = RecordSet::new(set.fields.clone(), matched);
    out.stats.loaded_at = set.stats.loaded_at;
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv;

    fn people() -> RecordSet {
        csv::parse(
            "name,city\njohn doe,NYC\nJane Roe,Boston\nMark Twain,Hartford",
            ',',
        )
        .unwrap()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let set = people();
        let result = filter(&Query::new(""), &set);

        assert_eq!(result, set);
    }

    #[test]
    fn test_case_insensitive_match() {
        let set = people();
        let result = filter(&Query::new("JOHN"), &set);

        assert_eq!(result.len(), 1);
        assert_eq!(result.records[0].values[0], "john doe");
    }

    #[test]
    fn test_or_across_fields() {
        // Query matches only the second field of a record
        let set = csv::parse("a,b\nxyz,match\nxyz,other", ',').unwrap();
        let result = filter(&Query::new("match"), &set);

        assert_eq!(result.len(), 1);
        assert_eq!(result.records[0].values, vec!["xyz", "match"]);
    }

    #[test]
    fn test_filter_is_subset_and_order_preserving() {
        let set = people();
        let result = filter(&Query::new("o"), &set);

        // Every result record exists in the input, in input order
        let mut last_id = None;
        for record in &result.records {
            assert!(set.get(record.id).is_some());
            if let Some(prev) = last_id {
                assert!(record.id.as_u64() > prev);
            }
            last_id = Some(record.id.as_u64());
        }
    }

    #[test]
    fn test_no_match_yields_empty_set() {
        let set = people();
        let result = filter(&Query::new("zzz"), &set);

        assert!(result.is_empty());
        assert_eq!(result.fields, set.fields);
    }

    #[test]
    fn test_deterministic() {
        let set = people();
        let first = filter(&Query::new("an"), &set);
        let second = filter(&Query::new("an"), &set);

        assert_eq!(first, second);
    }

    #[test]
    fn test_whitespace_is_significant() {
        let set = csv::parse("name\njohn doe\njohnny", ',').unwrap();

        // " doe" only matches where the space is literally present
        let result = filter(&Query::new(" doe"), &set);
        assert_eq!(result.len(), 1);
        assert_eq!(result.records[0].values, vec!["john doe"]);

        // Trailing whitespace is not trimmed either
        let result = filter(&Query::new("johnny "), &set);
        assert!(result.is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows: String = (0..100)
            .map(|i| format!("row{},val{}\n", i, i % 10))
            .collect();
        let set = csv::parse(&format!("a,b\n{}", rows), ',').unwrap();

        let query = Query::new("val3");
        let sequential = filter_with(&query, &set, usize::MAX);
        let parallel = filter_with(&query, &set, 0);

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_matched_records_keep_ids() {
        let set = people();
        let result = filter(&Query::new("twain"), &set);

        assert_eq!(result.len(), 1);
        assert_eq!(result.records[0].id.as_u64(), 2);
    }
}
