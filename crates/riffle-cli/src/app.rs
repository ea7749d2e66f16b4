//! Application state management.

use riffle_core::{Config, IngestOutcome, RecordStore, SearchService};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Shared application state.
pub struct App {
    /// Configuration
    pub config: Config,

    /// The record store
    pub store: Arc<RecordStore>,

    /// Ingest/search boundary over the store
    pub service: SearchService,
}

impl App {
    /// Create a new application instance.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(RecordStore::new());
        let service = SearchService::with_config(Arc::clone(&store), &config)?;

        Ok(App {
            config,
            store,
            service,
        })
    }

    /// Load a CSV file through the ingest boundary.
    ///
    /// The declared content type is derived from the file extension, so a
    /// non-CSV file is rejected the same way a bad upload would be.
    pub fn load_file(&self, path: &Path) -> anyhow::Result<IngestOutcome> {
        let payload = fs::read(path)?;
        let content_type = content_type_for(path);

        let outcome = self.service.ingest(&payload, content_type)?;

        info!(
            file = %path.display(),
            records = outcome.records,
            fields = outcome.fields,
            "File loaded"
        );

        Ok(outcome)
    }
}

/// Declared content type for a file path, by extension.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => "text/csv",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("data.csv")), "text/csv");
        assert_eq!(content_type_for(Path::new("DATA.CSV")), "text/csv");
        assert_eq!(
            content_type_for(Path::new("data.json")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(Path::new("noextension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        write!(file, "name,age\nAlice,30\nBob,25").unwrap();

        let app = App::new(Config::default()).unwrap();
        let outcome = app.load_file(file.path()).unwrap();

        assert_eq!(outcome.records, 2);
        assert_eq!(app.store.len(), 2);
    }

    #[test]
    fn test_load_rejects_non_csv_extension() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "name\nAlice").unwrap();

        let app = App::new(Config::default()).unwrap();
        assert!(app.load_file(file.path()).is_err());
        assert!(app.store.is_empty());
    }
}
