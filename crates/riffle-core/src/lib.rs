//! # Riffle Core Library
//!
//! This crate provides the parsing, storage, matching, and query-state
//! logic for the Riffle CSV search tool. It is transport-agnostic: HTTP
//! routing, form rendering, and terminal UI live in front of this crate
//! and consume the boundary in `service` and `sync`.
//!
//! ## Architecture
//!
//! - **Types** (`types`): records, record sets, synthetic ids
//! - **CSV** (`csv`): naive delimiter-split parsing into record sets
//! - **Store** (`store`): in-memory record store, atomic wholesale replace
//! - **Search** (`search`): case-insensitive substring matching
//! - **Sync** (`sync`): debounce, location state, last-write-wins sessions
//! - **Service** (`service`): ingest/search boundary contract
//! - **Config** (`config`): configuration management
//!
//! ## Example
//!
//! ```rust
//! use riffle_core::{RecordStore, SearchService};
//! use std::sync::Arc;
//!
//! let store = Arc::new(RecordStore::new());
//! let service = SearchService::new(Arc::clone(&store));
//!
//! service.ingest(b"name,age\nAlice,30\nBob,25", "text/csv").unwrap();
//! let matched = service.search(Some("bo")).unwrap();
//! assert_eq!(matched.len(), 1);
//! ```

pub mod config;
pub mod csv;
pub mod error;
pub mod search;
pub mod service;
pub mod store;
pub mod sync;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, RiffleError};
pub use search::Query;
pub use service::{IngestOutcome, SearchService};
pub use store::RecordStore;
pub use sync::{Debouncer, Location, MatchDispatch, QuerySession};
pub use types::{Record, RecordId, RecordSet, SetStats};
