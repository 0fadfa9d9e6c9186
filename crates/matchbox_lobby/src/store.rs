//! Keyed storage for match records.
//!
//! The lobby only needs load/save/remove by id; the backend is pluggable.

use crate::MatchId;
use crate::match_state::Match;
use crate::sync::lock;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

/// Storage capability for match records.
///
/// Implementations only need per-call atomicity; the lobby serializes
/// transitions on the same match itself.
pub trait MatchStore: Send + Sync {
    /// Loads a copy of the match with `id`.
    fn load(&self, id: &str) -> Option<Match>;

    /// Inserts or replaces a match.
    fn save(&self, record: Match);

    /// Deletes a match, returning it if it existed.
    fn remove(&self, id: &str) -> Option<Match>;

    /// Ids of every stored match.
    fn ids(&self) -> Vec<MatchId>;
}

/// Process-local store backed by a hash map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<HashMap<MatchId, Match>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        debug!("Creating in-memory match store");
        Self::default()
    }

    /// Number of stored matches.
    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    /// True when no match is stored.
    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }
}

impl MatchStore for InMemoryStore {
    fn load(&self, id: &str) -> Option<Match> {
        lock(&self.records).get(id).cloned()
    }

    fn save(&self, record: Match) {
        lock(&self.records).insert(record.id().clone(), record);
    }

    fn remove(&self, id: &str) -> Option<Match> {
        lock(&self.records).remove(id)
    }

    fn ids(&self) -> Vec<MatchId> {
        lock(&self.records).keys().cloned().collect()
    }
}
