use super::job::RankingOutcome;
use super::types::{RankingEntry, RankingKey};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Proof that a key is being computed. The claim lasts until this token is
/// dropped, the outcome is stored, or the cache is invalidated.
#[derive(Debug)]
pub struct RankingClaim {
    _token: Arc<()>,
}

/// Memoized rankings for the current baseline.
///
/// Changing the baseline bumps `generation` and clears everything; results
/// computed for an older generation are refused on arrival.
#[derive(Debug, Default)]
pub struct RankingCache {
    generation: u64,
    entries: HashMap<RankingKey, Arc<[RankingEntry]>>,
    in_progress: HashMap<RankingKey, Weak<()>>,
}

impl RankingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, key: &RankingKey) -> Option<Arc<[RankingEntry]>> {
        self.entries.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_in_progress(&self, key: &RankingKey) -> bool {
        self.in_progress
            .get(key)
            .is_some_and(|claim| claim.strong_count() > 0)
    }

    /// Drop every entry and start a new generation.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.entries.clear();
        self.in_progress.clear();
        debug!(generation = self.generation, "ranking cache invalidated");
    }

    /// Claim `key` for computation. `None` when it is cached or a live claim
    /// already exists.
    pub fn begin(&mut self, key: RankingKey) -> Option<RankingClaim> {
        if self.entries.contains_key(&key) || self.is_in_progress(&key) {
            return None;
        }
        let token = Arc::new(());
        self.in_progress.insert(key, Arc::downgrade(&token));
        Some(RankingClaim { _token: token })
    }

    /// Release a claim without storing anything.
    pub fn abandon(&mut self, key: &RankingKey) {
        self.in_progress.remove(key);
    }

    /// Store a finished ranking if it belongs to the current generation.
    /// Returns the cached list, or `None` when the outcome was stale.
    pub fn store(&mut self, outcome: RankingOutcome) -> Option<Arc<[RankingEntry]>> {
        if outcome.generation != self.generation {
            warn!(
                position = ?outcome.key.0,
                tier = ?outcome.key.1,
                outcome_generation = outcome.generation,
                current_generation = self.generation,
                "discarding stale ranking"
            );
            return None;
        }
        self.in_progress.remove(&outcome.key);
        let entries: Arc<[RankingEntry]> = outcome.entries.into();
        self.entries.insert(outcome.key, Arc::clone(&entries));
        Some(entries)
    }
}
