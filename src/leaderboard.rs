//! Time-boxed cache in front of a [`ScoreStore`].

use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::debug;

use crate::storage::{SaveOutcome, ScoreRecord, ScoreStore};

/// Source of "now" for cache expiry.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Cached {
    fetched_at: Instant,
    entries: Vec<ScoreRecord>,
}

/// Holds the top `capacity` scores for `ttl`. Saving through the cache
/// invalidates it.
pub struct LeaderboardCache<S, C = SystemClock> {
    store: S,
    clock: C,
    ttl: Duration,
    capacity: usize,
    cached: Option<Cached>,
}

impl<S: ScoreStore> LeaderboardCache<S, SystemClock> {
    pub fn new(store: S, ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(store, SystemClock, ttl, capacity)
    }
}

impl<S: ScoreStore, C: Clock> LeaderboardCache<S, C> {
    pub fn with_clock(store: S, clock: C, ttl: Duration, capacity: usize) -> Self {
        Self {
            store,
            clock,
            ttl,
            capacity: capacity.max(1),
            cached: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_fresh(&self) -> bool {
        self.cached
            .as_ref()
            .is_some_and(|cached| self.clock.now().duration_since(cached.fetched_at) < self.ttl)
    }

    /// Top `limit` scores. Requests beyond capacity bypass the cache.
    pub fn top(&mut self, limit: usize) -> Result<Vec<ScoreRecord>> {
        if limit > self.capacity {
            return self.store.top_scores(limit);
        }

        if !self.is_fresh() {
            debug!(capacity = self.capacity, "refreshing leaderboard cache");
            let entries = self.store.top_scores(self.capacity)?;
            self.cached = Some(Cached {
                fetched_at: self.clock.now(),
                entries,
            });
        }

        Ok(self
            .cached
            .as_ref()
            .map(|cached| cached.entries.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    pub fn save_score(&mut self, username: &str, score: u64, level: u32) -> Result<SaveOutcome> {
        let outcome = self.store.save_score(username, score, level)?;
        self.invalidate();
        Ok(outcome)
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use uuid::Uuid;

    #[derive(Clone)]
    struct ManualClock {
        base: Instant,
        offset: Rc<Cell<Duration>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                base: Instant::now(),
                offset: Rc::new(Cell::new(Duration::ZERO)),
            }
        }

        fn advance(&self, by: Duration) {
            self.offset.set(self.offset.get() + by);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.base + self.offset.get()
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        records: RefCell<Vec<ScoreRecord>>,
        fetches: Cell<usize>,
    }

    impl ScoreStore for MemoryStore {
        fn save_score(&self, username: &str, score: u64, level: u32) -> Result<SaveOutcome> {
            let mut records = self.records.borrow_mut();
            records.push(ScoreRecord {
                id: Uuid::new_v4(),
                username: username.to_string(),
                score,
                level,
                recorded_at: Utc::now(),
            });
            records.sort_by(|a, b| b.score.cmp(&a.score));
            let rank = records.iter().position(|r| r.score == score).unwrap_or(0) + 1;
            Ok(SaveOutcome {
                rank,
                is_top_ten: rank <= 10,
            })
        }

        fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(self.records.borrow().iter().take(limit).cloned().collect())
        }
    }

    fn cache(clock: &ManualClock) -> LeaderboardCache<MemoryStore, ManualClock> {
        LeaderboardCache::with_clock(
            MemoryStore::default(),
            clock.clone(),
            Duration::from_secs(60),
            10,
        )
    }

    #[test]
    fn test_reads_within_ttl_hit_cache() {
        let clock = ManualClock::new();
        let mut cache = cache(&clock);
        cache.store().save_score("ada", 100, 1).unwrap();

        assert_eq!(cache.top(10).unwrap().len(), 1);
        clock.advance(Duration::from_secs(59));
        assert_eq!(cache.top(5).unwrap().len(), 1);
        assert_eq!(cache.store().fetches.get(), 1);
        assert!(cache.is_fresh());
    }

    #[test]
    fn test_expired_entries_are_refetched() {
        let clock = ManualClock::new();
        let mut cache = cache(&clock);
        cache.top(10).unwrap();

        // Written behind the cache's back.
        cache.store().save_score("ada", 100, 1).unwrap();
        assert!(cache.top(10).unwrap().is_empty());

        clock.advance(Duration::from_secs(60));
        assert!(!cache.is_fresh());
        assert_eq!(cache.top(10).unwrap().len(), 1);
        assert_eq!(cache.store().fetches.get(), 2);
    }

    #[test]
    fn test_save_through_cache_invalidates() {
        let clock = ManualClock::new();
        let mut cache = cache(&clock);
        cache.top(10).unwrap();

        let outcome = cache.save_score("ada", 300, 3).unwrap();
        assert_eq!(outcome.rank, 1);
        assert!(!cache.is_fresh());

        let top = cache.top(10).unwrap();
        assert_eq!(top[0].score, 300);
        assert_eq!(cache.store().fetches.get(), 2);
    }

    #[test]
    fn test_limit_beyond_capacity_goes_to_store() {
        let clock = ManualClock::new();
        let mut cache = cache(&clock);
        for score in 0..15 {
            cache.save_score("ada", score, 1).unwrap();
        }

        assert_eq!(cache.top(10).unwrap().len(), 10);
        assert_eq!(cache.top(15).unwrap().len(), 15);
        assert_eq!(cache.top(3).unwrap().len(), 3);
        assert_eq!(cache.store().fetches.get(), 2);
    }
}
