//! Transport-independent ingest and search boundary.
//!
//! [`SearchService`] is the contract consumed by whatever transport sits in
//! front of the core (CLI today, an HTTP handler tomorrow): ingest a payload
//! with a declared content type, search with an optional query parameter.
//! Every failure is recoverable and leaves the previously stored record set
//! intact.
//!
//! ## Empty vs. absent query
//!
//! The two are deliberately distinguished at every layer: an *absent* query
//! parameter is a caller error ([`RiffleError::MissingQuery`]); an *empty*
//! query is valid and returns the full current set.

use crate::config::Config;
use crate::csv::{self, DEFAULT_DELIMITER};
use crate::error::{Result, RiffleError};
use crate::search::{self, Query, DEFAULT_PARALLEL_THRESHOLD};
use crate::store::RecordStore;
use crate::types::RecordSet;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Content types accepted as CSV uploads.
///
/// Matched case-insensitively against the media type, ignoring parameters
/// such as `;charset=utf-8`.
pub const CSV_CONTENT_TYPES: &[&str] = &["text/csv", "application/csv"];

/// Outcome of a successful ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// Number of records in the new set
    pub records: u64,

    /// Number of fields per record
    pub fields: u64,
}

/// The ingest/search boundary over an injectable record store.
pub struct SearchService {
    store: Arc<RecordStore>,
    delimiter: char,
    parallel_threshold: usize,
}

impl SearchService {
    /// Create a service with default delimiter and parallelism settings.
    pub fn new(store: Arc<RecordStore>) -> Self {
        SearchService {
            store,
            delimiter: DEFAULT_DELIMITER,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Create a service configured from a [`Config`].
    pub fn with_config(store: Arc<RecordStore>, config: &Config) -> Result<Self> {
        Ok(SearchService {
            store,
            delimiter: config.delimiter()?,
            parallel_threshold: config.parallel_threshold(),
        })
    }

    /// Handle an ingest request: payload plus declared content type.
    ///
    /// On success the parsed set replaces the stored one atomically. On any
    /// failure the store is untouched: parsing happens entirely before the
    /// replacement.
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    pub fn ingest(&self, payload: &[u8], content_type: &str) -> Result<IngestOutcome> {
        if !is_csv_content_type(content_type) {
            warn!(content_type, "Rejecting upload with non-CSV content type");
            return Err(RiffleError::UnsupportedMediaType {
                content_type: content_type.to_string(),
            });
        }

        if payload.is_empty() {
            return Err(RiffleError::EmptyUpload);
        }

        let text = std::str::from_utf8(payload).map_err(|_| RiffleError::InvalidEncoding)?;

        let mut set = csv::parse(text, self.delimiter)?;
        set.stats.loaded_at = Some(chrono::Utc::now());

        let outcome = IngestOutcome {
            records: set.stats.record_count,
            fields: set.stats.field_count,
        };

        self.store.replace(set);

        info!(
            records = outcome.records,
            fields = outcome.fields,
            "Ingest complete"
        );

        Ok(outcome)
    }

    /// Handle a search request.
    ///
    /// `None` means the query parameter was absent and is an error. An empty
    /// query returns the full current set without running the matcher.
    pub fn search(&self, query: Option<&str>) -> Result<Arc<RecordSet>> {
        let Some(text) = query else {
            return Err(RiffleError::MissingQuery);
        };

        let current = self.store.current();
        if text.is_empty() {
            return Ok(current);
        }

        let query = Query::new(text);
        let matched = search::filter_with(&query, &current, self.parallel_threshold);
        Ok(Arc::new(matched))
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }
}

/// Check whether a declared content type denotes CSV.
fn is_csv_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();

    CSV_CONTENT_TYPES
        .iter()
        .any(|accepted| media_type.eq_ignore_ascii_case(accepted))
}
