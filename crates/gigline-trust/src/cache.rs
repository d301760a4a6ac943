//! Snapshot-keyed memoisation of trust assessments.
//!
//! Keys are the BLAKE3 hash of the snapshot's canonical JSON encoding, so a
//! changed signal always misses. [`CachedEngine::invalidate`] drops an entry
//! explicitly when a collaborator reports a signal-affecting mutation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use gigline_types::{SignalSnapshot, TrustAssessment};
use serde::Serialize;

use crate::engine;

/// Default number of assessments kept.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Hash key for a snapshot, `None` if it cannot be encoded.
pub fn snapshot_key(snapshot: &SignalSnapshot) -> Option<[u8; 32]> {
    let bytes = serde_json::to_vec(snapshot).ok()?;
    Some(*blake3::hash(&bytes).as_bytes())
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<[u8; 32], TrustAssessment>,
    /// Insertion order for FIFO eviction.
    order: VecDeque<[u8; 32]>,
    hits: u64,
    misses: u64,
}

/// Hit/miss counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// The trust engine behind a bounded memo table. Safe to share across
/// threads; scoring itself happens outside the lock.
pub struct CachedEngine {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl CachedEngine {
    /// A capacity of zero disables memoisation.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // Entries are always valid assessments, so a poisoned table is usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Assess a snapshot, reusing a prior result for an identical snapshot.
    pub fn assess(&self, snapshot: &SignalSnapshot) -> TrustAssessment {
        if self.capacity == 0 {
            return engine::assess(snapshot);
        }
        let Some(key) = snapshot_key(snapshot) else {
            return engine::assess(snapshot);
        };

        {
            let mut state = self.lock();
            if let Some(hit) = state.entries.get(&key).cloned() {
                state.hits += 1;
                return hit;
            }
            state.misses += 1;
        }

        let assessment = engine::assess(snapshot);

        let mut state = self.lock();
        if !state.entries.contains_key(&key) {
            while state.entries.len() >= self.capacity {
                match state.order.pop_front() {
                    Some(oldest) => {
                        state.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            state.order.push_back(key);
            state.entries.insert(key, assessment.clone());
        }
        tracing::trace!(score = assessment.score, "trust assessment computed");
        assessment
    }

    /// Drop the memoised assessment for `snapshot`, if any.
    pub fn invalidate(&self, snapshot: &SignalSnapshot) -> bool {
        let Some(key) = snapshot_key(snapshot) else {
            return false;
        };
        let mut state = self.lock();
        state.order.retain(|k| k != &key);
        state.entries.remove(&key).is_some()
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entries: state.entries.len(),
        }
    }
}

impl Default for CachedEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(followers: u32) -> SignalSnapshot {
        let mut s = SignalSnapshot::default();
        s.profile.has_email = true;
        s.social.followers = followers;
        s
    }

    #[test]
    fn test_cached_matches_engine() {
        let cache = CachedEngine::new(8);
        let s = snapshot(60);
        assert_eq!(cache.assess(&s), engine::assess(&s));
        assert_eq!(cache.assess(&s), engine::assess(&s));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_changed_snapshot_misses() {
        let cache = CachedEngine::new(8);
        let first = cache.assess(&snapshot(0));
        let second = cache.assess(&snapshot(200));
        assert!(second.score > first.score);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_fifo_eviction() {
        let cache = CachedEngine::new(2);
        cache.assess(&snapshot(1));
        cache.assess(&snapshot(2));
        cache.assess(&snapshot(3));
        assert_eq!(cache.stats().entries, 2);
        // Oldest entry was evicted; assessing it again is a miss.
        cache.assess(&snapshot(1));
        assert_eq!(cache.stats().misses, 4);
    }

    #[test]
    fn test_invalidate() {
        let cache = CachedEngine::new(8);
        let s = snapshot(10);
        cache.assess(&s);
        assert!(cache.invalidate(&s));
        assert!(!cache.invalidate(&s));
        assert_eq!(cache.stats().entries, 0);
        cache.assess(&s);
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_zero_capacity_disables() {
        let cache = CachedEngine::new(0);
        let s = snapshot(10);
        assert_eq!(cache.assess(&s), engine::assess(&s));
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_key_is_stable() {
        assert_eq!(snapshot_key(&snapshot(5)), snapshot_key(&snapshot(5)));
        assert_ne!(snapshot_key(&snapshot(5)), snapshot_key(&snapshot(6)));
    }

    #[test]
    fn test_concurrent_assess() {
        let cache = std::sync::Arc::new(CachedEngine::new(16));
        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.assess(&snapshot(i * 100)).score)
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let score = handle.join().expect("thread");
            let expected = engine::assess(&snapshot(i as u32 * 100)).score;
            assert_eq!(score, expected);
        }
    }
}
