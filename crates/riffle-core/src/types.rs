//! Core data types for Riffle.
//!
//! This module defines the fundamental data structures used throughout the
//! ingestion and search system. These types are designed to be:
//!
//! - **Serializable**: For JSON output at the CLI boundary
//! - **Uniform**: Every record in a set shares the set's header, in order
//! - **Efficient**: Lowercased field values are cached for search

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Synthetic unique identifier for a record within one upload.
///
/// Ids are assigned sequentially in CSV row order and exist for stable list
/// rendering. They are scoped to a single record set: a re-upload assigns
/// fresh ids starting from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl RecordId {
    /// Create a new record ID
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single CSV row: an ordered mapping from field name to field value.
///
/// ## Design Notes
///
/// - Field *names* are not stored here; they live once on the owning
///   [`RecordSet`], which makes the uniform-shape invariant structural:
///   a record holds exactly one value per header field, in header order.
/// - `values_lower` is pre-computed for fast case-insensitive matching and
///   excluded from serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    /// Synthetic identifier, stable within one upload
    pub id: RecordId,

    /// Field values in header order
    pub values: Vec<String>,

    /// Pre-computed lowercase values for fast case-insensitive search
    #[serde(skip)]
    pub values_lower: Vec<String>,
}

impl Record {
    /// Create a new record with the given values.
    ///
    /// The `values_lower` cache is automatically computed from `values`.
    pub fn new(id: RecordId, values: Vec<String>) -> Self {
        let values_lower = values.iter().map(|v| v.to_lowercase()).collect();
        Record {
            id,
            values,
            values_lower,
        }
    }

    /// Initialize the lowercase value cache after deserialization
    pub fn init_cache(&mut self) {
        if self.values_lower.len() != self.values.len() {
            self.values_lower = self.values.iter().map(|v| v.to_lowercase()).collect();
        }
    }

    /// Get the value at a field position, if present
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

/// An ordered collection of uniformly-shaped records from one CSV upload.
///
/// Insertion order equals CSV row order. Invariant: every record holds
/// exactly `fields.len()` values, positionally aligned with `fields`.
/// The parser establishes this by padding short rows and truncating long
/// ones; nothing mutates records after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSet {
    /// Field names from the header line, in order
    pub fields: Vec<String>,

    /// Records in CSV row order
    pub records: Vec<Record>,

    /// Statistics about this set
    pub stats: SetStats,
}

impl RecordSet {
    /// Create a record set from a header and records.
    pub fn new(fields: Vec<String>, records: Vec<Record>) -> Self {
        debug_assert!(records.iter().all(|r| r.values.len() == fields.len()));
        let stats = SetStats {
            record_count: records.len() as u64,
            field_count: fields.len() as u64,
            loaded_at: None,
        };
        RecordSet {
            fields,
            records,
            stats,
        }
    }

    /// Create an empty record set (no fields, no records).
    ///
    /// This is what a store holds before any upload has occurred.
    pub fn empty() -> Self {
        RecordSet::new(Vec::new(), Vec::new())
    }

    /// Get the number of records in the set.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the set has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get the number of fields per record.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over a record's `(field name, value)` pairs in header order.
    pub fn entries<'a>(
        &'a self,
        record: &'a Record,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.fields
            .iter()
            .map(String::as_str)
            .zip(record.values.iter().map(String::as_str))
    }

    /// Get a record by its synthetic ID.
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Initialize lowercase caches on all records after deserialization.
    pub fn init_cache(&mut self) {
        for record in &mut self.records {
            record.init_cache();
        }
    }
}

impl Default for RecordSet {
    fn default() -> Self {
        RecordSet::empty()
    }
}

impl PartialEq for RecordSet {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
            && self.records.len() == other.records.len()
            && self
                .records
                .iter()
                .zip(&other.records)
                .all(|(a, b)| a.id == b.id && a.values == b.values)
    }
}

impl Eq for RecordSet {}

/// Statistics about a record set
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetStats {
    /// Number of records in the set
    pub record_count: u64,

    /// Number of fields per record
    pub field_count: u64,

    /// When the set was ingested (None for sets built outside ingest)
    pub loaded_at: Option<DateTime<Utc>>,
}
