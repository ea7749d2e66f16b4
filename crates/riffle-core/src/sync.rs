//! Client-visible query state synchronization.
//!
//! Keystrokes update the raw query immediately, but matching only fires
//! after the query has been stable for a quiescence window. The settled
//! query is then reflected into a navigable [`Location`] (replace-in-place,
//! never a new history entry), and a match is dispatched with a sequence
//! number so that stale in-flight responses can be discarded.
//!
//! The debounce is modeled as an explicit timer-armed state machine with
//! states `Idle` and `Pending { value, deadline }`:
//!
//! - new input transitions to `Pending`, resetting the deadline and
//!   cancelling any previously pending fire;
//! - deadline expiry fires exactly one dispatch and returns to `Idle`.
//!
//! All transitions take the current time as a parameter, so the machine is
//! fully deterministic under test.

use crate::search::Query;
use crate::store::RecordStore;
use crate::types::RecordSet;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default quiescence window before a query value is considered settled
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Query-string parameter carrying the active query
pub const QUERY_PARAM: &str = "q";

/// Timer-armed debounce state machine.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    state: DebounceState,
}

#[derive(Debug, Clone)]
enum DebounceState {
    Idle,
    Pending { value: String, deadline: Instant },
}

impl Debouncer {
    /// Create a debouncer with the given quiescence window.
    pub fn new(window: Duration) -> Self {
        Debouncer {
            window,
            state: DebounceState::Idle,
        }
    }

    /// Record a new input value at time `now`.
    ///
    /// Arms (or re-arms) the deadline at `now + window`. Any previously
    /// pending fire is cancelled; only one trigger is alive at a time.
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.state = DebounceState::Pending {
            value: value.into(),
            deadline: now + self.window,
        };
    }

    /// Arm the machine so the value fires on the very next poll.
    ///
    /// Used to seed an initial query (e.g., from a location parameter on
    /// load) without waiting out the quiescence window.
    pub fn prime(&mut self, value: impl Into<String>, now: Instant) {
        self.state = DebounceState::Pending {
            value: value.into(),
            deadline: now,
        };
    }

    /// Fire the pending value if its deadline has passed.
    ///
    /// Returns `Some(value)` exactly once per settled input, transitioning
    /// back to `Idle`.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let expired = matches!(&self.state, DebounceState::Pending { deadline, .. } if now >= *deadline);
        if !expired {
            return None;
        }

        match std::mem::replace(&mut self.state, DebounceState::Idle) {
            DebounceState::Pending { value, .. } => Some(value),
            DebounceState::Idle => None,
        }
    }

    /// Whether a trigger is currently armed.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// The configured quiescence window.
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Debouncer::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}

/// Navigable location state: a path plus an optional query parameter.
///
/// Updates are replace-in-place; the type holds exactly one location and
/// never accumulates history. The query value is kept literal (no percent
/// escaping), matching the naive query-string handling of the upload client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Option<String>,
}

impl Location {
    /// Create a location with no query parameter.
    pub fn new(path: impl Into<String>) -> Self {
        Location {
            path: path.into(),
            query: None,
        }
    }

    /// Parse a location string such as `/search?q=bob`.
    ///
    /// Only the [`QUERY_PARAM`] parameter is recognized; other parameters
    /// are dropped.
    pub fn parse(raw: &str) -> Self {
        let (path, query_string) = match raw.split_once('?') {
            Some((p, qs)) => (p, Some(qs)),
            None => (raw, None),
        };

        let prefix = format!("{}=", QUERY_PARAM);
        let query = query_string.and_then(|qs| {
            qs.split('&')
                .find_map(|param| param.strip_prefix(prefix.as_str()))
                .map(str::to_string)
        });

        Location {
            path: path.to_string(),
            query,
        }
    }

    /// Reflect a settled query value into this location.
    ///
    /// An empty value removes the parameter; anything else sets it to the
    /// literal value.
    pub fn apply(&mut self, settled: &str) {
        if settled.is_empty() {
            self.query = None;
        } else {
            self.query = Some(settled.to_string());
        }
    }

    /// The active query parameter, if any.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The path component.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(q) => write!(f, "{}?{}={}", self.path, QUERY_PARAM, q),
            None => write!(f, "{}", self.path),
        }
    }
}

/// A match dispatch produced when a query settles.
#[derive(Debug, Clone)]
pub struct MatchDispatch {
    /// Sequence number for last-write-wins response application
    pub id: u64,

    /// The compiled query to run
    pub query: Query,
}

/// Ties together raw input, debounce, location, and response application
/// for one search-as-you-type session.
///
/// The session does not run matches itself; [`poll`](Self::poll) hands out
/// a [`MatchDispatch`] and the caller runs it wherever it likes (inline or
/// on a worker thread), feeding the outcome back through
/// [`apply_response`](Self::apply_response). Responses carry the dispatch
/// id and are applied last-write-wins, so a stale response arriving after
/// a newer one is discarded.
pub struct QuerySession {
    store: Arc<RecordStore>,
    debouncer: Debouncer,
    location: Location,

    /// Raw input value, updated on every keystroke
    input: String,

    /// Records currently visible to the client
    visible: Arc<RecordSet>,

    next_request_id: u64,
    latest_applied_id: u64,
}

impl QuerySession {
    /// Create a session over a store.
    ///
    /// If `location` carries a query parameter it seeds the initial input
    /// and the next [`poll`](Self::poll) dispatches an initial match.
    pub fn new(
        store: Arc<RecordStore>,
        window: Duration,
        location: Location,
        now: Instant,
    ) -> Self {
        let visible = store.current();
        let mut debouncer = Debouncer::new(window);
        let mut input = String::new();

        if let Some(q) = location.query() {
            if !q.is_empty() {
                input = q.to_string();
                debouncer.prime(q, now);
            }
        }

        QuerySession {
            store,
            debouncer,
            location,
            input,
            visible,
            next_request_id: 0,
            latest_applied_id: 0,
        }
    }

    /// Record a keystroke: the raw input updates immediately, the debounce
    /// deadline resets.
    pub fn on_input(&mut self, value: impl Into<String>, now: Instant) {
        self.input = value.into();
        self.debouncer.input(self.input.clone(), now);
    }

    /// Advance the state machine.
    ///
    /// When a query has settled, the location is updated and either a
    /// dispatch is returned (non-empty query) or the visible set resets
    /// locally to the full currently held set (empty query, no round trip).
    pub fn poll(&mut self, now: Instant) -> Option<MatchDispatch> {
        let settled = self.debouncer.poll(now)?;
        self.location.apply(&settled);

        if settled.is_empty() {
            debug!("Query cleared, resetting to full set locally");
            // The clear is the newest state in the sequence: take an id for
            // it so any response still in flight is discarded as stale.
            self.next_request_id += 1;
            self.latest_applied_id = self.next_request_id;
            self.visible = self.store.current();
            return None;
        }

        self.next_request_id += 1;
        debug!(
            id = self.next_request_id,
            query = %settled,
            "Dispatching match"
        );
        Some(MatchDispatch {
            id: self.next_request_id,
            query: Query::new(settled),
        })
    }

    /// Apply a match response.
    ///
    /// Returns true if the response was applied; false if it was stale
    /// (a response with a newer id has already been applied).
    pub fn apply_response(&mut self, id: u64, results: RecordSet) -> bool {
        if id < self.latest_applied_id {
            debug!(id, latest = self.latest_applied_id, "Discarding stale response");
            return false;
        }
        self.latest_applied_id = id;
        self.visible = Arc::new(results);
        true
    }

    /// The records currently visible to the client.
    pub fn visible(&self) -> &Arc<RecordSet> {
        &self.visible
    }

    /// The raw input value as typed.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The current navigable location.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Whether a debounce trigger is armed.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv;
    use crate::search;

    const WINDOW: Duration = Duration::from_millis(500);

    fn store_with(csv_text: &str) -> Arc<RecordStore> {
        let store = Arc::new(RecordStore::new());
        store.replace(csv::parse(csv_text, ',').unwrap());
        store
    }

    #[test]
    fn test_debouncer_waits_for_window() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        debouncer.input("bo", t0);
        assert_eq!(debouncer.poll(t0), None);
        assert_eq!(debouncer.poll(t0 + WINDOW / 2), None);
        assert_eq!(debouncer.poll(t0 + WINDOW), Some("bo".to_string()));
    }

    #[test]
    fn test_debouncer_fires_exactly_once() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        debouncer.input("bo", t0);
        assert!(debouncer.poll(t0 + WINDOW).is_some());
        assert_eq!(debouncer.poll(t0 + WINDOW * 2), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_new_input_resets_deadline() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);

        debouncer.input("b", t0);
        debouncer.input("bo", t0 + WINDOW / 2);

        // Old deadline has passed but was cancelled by the second input
        assert_eq!(debouncer.poll(t0 + WINDOW), None);
        assert_eq!(
            debouncer.poll(t0 + WINDOW / 2 + WINDOW),
            Some("bo".to_string())
        );
    }

    #[test]
    fn test_location_parse_and_display() {
        let loc = Location::parse("/search?q=bob");
        assert_eq!(loc.path(), "/search");
        assert_eq!(loc.query(), Some("bob"));
        assert_eq!(loc.to_string(), "/search?q=bob");

        let loc = Location::parse("/search");
        assert_eq!(loc.query(), None);
        assert_eq!(loc.to_string(), "/search");
    }

    #[test]
    fn test_location_apply_sets_and_removes_param() {
        let mut loc = Location::new("/");
        loc.apply("alice");
        assert_eq!(loc.to_string(), "/?q=alice");

        loc.apply("");
        assert_eq!(loc.query(), None);
        assert_eq!(loc.to_string(), "/");
    }

    #[test]
    fn test_session_dispatch_after_quiescence() {
        let t0 = Instant::now();
        let store = store_with("name\nAlice\nBob");
        let mut session = QuerySession::new(Arc::clone(&store), WINDOW, Location::new("/"), t0);

        session.on_input("bo", t0);
        assert!(session.poll(t0).is_none());

        let dispatch = session.poll(t0 + WINDOW).expect("query should settle");
        assert_eq!(dispatch.id, 1);
        assert_eq!(dispatch.query.text(), "bo");
        assert_eq!(session.location().to_string(), "/?q=bo");

        // Only one dispatch per settled input
        assert!(session.poll(t0 + WINDOW * 2).is_none());
    }

    #[test]
    fn test_session_empty_query_resets_locally() {
        let t0 = Instant::now();
        let store = store_with("name\nAlice\nBob");
        let mut session = QuerySession::new(Arc::clone(&store), WINDOW, Location::new("/"), t0);

        // Narrow down first
        session.on_input("alice", t0);
        let dispatch = session.poll(t0 + WINDOW).unwrap();
        let results = search::filter(&dispatch.query, &store.current());
        session.apply_response(dispatch.id, results);
        assert_eq!(session.visible().len(), 1);

        // Clearing the query resets to the full held set without a dispatch
        session.on_input("", t0 + WINDOW);
        assert!(session.poll(t0 + WINDOW * 2).is_none());
        assert_eq!(session.visible().len(), 2);
        assert_eq!(session.location().query(), None);
    }

    #[test]
    fn test_session_seeds_from_location() {
        let t0 = Instant::now();
        let store = store_with("name\nAlice\nBob");
        let mut session = QuerySession::new(
            Arc::clone(&store),
            WINDOW,
            Location::parse("/?q=bob"),
            t0,
        );

        assert_eq!(session.input(), "bob");

        // Initial match dispatches on the first poll, without waiting
        let dispatch = session.poll(t0).expect("seeded query should dispatch");
        assert_eq!(dispatch.query.text(), "bob");
    }

    #[test]
    fn test_stale_response_discarded() {
        let t0 = Instant::now();
        let store = store_with("name\nAlice\nBob");
        let mut session = QuerySession::new(Arc::clone(&store), WINDOW, Location::new("/"), t0);

        session.on_input("a", t0);
        let first = session.poll(t0 + WINDOW).unwrap();

        session.on_input("bo", t0 + WINDOW);
        let second = session.poll(t0 + WINDOW * 2).unwrap();
        assert!(second.id > first.id);

        // Newer response lands first
        let newer = search::filter(&second.query, &store.current());
        assert!(session.apply_response(second.id, newer));
        assert_eq!(session.visible().records[0].values, vec!["Bob"]);

        // Stale response arrives late and is discarded
        let stale = search::filter(&first.query, &store.current());
        assert!(!session.apply_response(first.id, stale));
        assert_eq!(session.visible().records[0].values, vec!["Bob"]);
    }

    #[test]
    fn test_stale_response_discarded_after_clear() {
        let t0 = Instant::now();
        let store = store_with("name\nAlice\nBob");
        let mut session = QuerySession::new(Arc::clone(&store), WINDOW, Location::new("/"), t0);

        session.on_input("alice", t0);
        let dispatch = session.poll(t0 + WINDOW).unwrap();

        // Query is cleared while the match is still in flight
        session.on_input("", t0 + WINDOW);
        assert!(session.poll(t0 + WINDOW * 2).is_none());
        assert_eq!(session.visible().len(), 2);

        // The in-flight response arrives after the clear and is discarded
        let stale = search::filter(&dispatch.query, &store.current());
        assert!(!session.apply_response(dispatch.id, stale));
        assert_eq!(session.visible().len(), 2);
    }

    #[test]
    fn test_dispatch_after_clear_still_applies() {
        let t0 = Instant::now();
        let store = store_with("name\nAlice\nBob");
        let mut session = QuerySession::new(Arc::clone(&store), WINDOW, Location::new("/"), t0);

        // Clear first, then type a fresh query
        session.on_input("", t0);
        assert!(session.poll(t0 + WINDOW).is_none());

        session.on_input("bob", t0 + WINDOW);
        let dispatch = session.poll(t0 + WINDOW * 2).unwrap();

        let results = search::filter(&dispatch.query, &store.current());
        assert!(session.apply_response(dispatch.id, results));
        assert_eq!(session.visible().len(), 1);
    }

    #[test]
    fn test_session_input_is_immediate() {
        let t0 = Instant::now();
        let store = store_with("name\nAlice");
        let mut session = QuerySession::new(store, WINDOW, Location::new("/"), t0);

        session.on_input("al", t0);
        assert_eq!(session.input(), "al");
        assert!(session.is_pending());
    }
}
