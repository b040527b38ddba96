//! In-memory exercise cache.
//!
//! Bounded, least-recently-used cache keyed by exercise identifier. All
//! access goes through a mutex so the cache can be shared between tasks.

use crate::exercisedb::Exercise;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Cached record with its insertion time.
#[derive(Debug, Clone)]
struct CacheEntry {
    exercise: Exercise,
    cached_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// Keys from least to most recently used
    recency: VecDeque<String>,
}

impl Inner {
    fn touch(&mut self, id: &str) {
        if let Some(pos) = self.recency.iter().position(|k| k == id) {
            self.recency.remove(pos);
        }
        self.recency.push_back(id.to_string());
    }

    fn remove(&mut self, id: &str) {
        self.entries.remove(id);
        if let Some(pos) = self.recency.iter().position(|k| k == id) {
            self.recency.remove(pos);
        }
    }
}

/// Bounded exercise cache with LRU eviction and optional expiry.
#[derive(Debug)]
pub struct ExerciseCache {
    inner: Mutex<Inner>,
    capacity: usize,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ExerciseCache {
    /// Create a cache.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries (at least 1)
    /// * `ttl_secs` - Entry lifetime; `None` keeps entries until evicted
    ///
    /// # Details
    /// A lifetime too large to represent is treated as no lifetime.
    pub fn new(capacity: usize, ttl_secs: Option<u64>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
            ttl: ttl_secs.and_then(ttl_from_secs),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up an exercise, marking it as recently used.
    pub fn get(&self, id: &str) -> Option<Exercise> {
        self.get_at(id, Utc::now())
    }

    fn get_at(&self, id: &str, now: DateTime<Utc>) -> Option<Exercise> {
        let mut inner = self.lock();
        let expired = match inner.entries.get(id) {
            Some(entry) => self.ttl.is_some_and(|ttl| now - entry.cached_at >= ttl),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        if expired {
            debug!(exercise_id = %id, "Cache entry expired");
            inner.remove(id);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        inner.touch(id);
        self.hits.fetch_add(1, Ordering::Relaxed);
        inner.entries.get(id).map(|entry| entry.exercise.clone())
    }

    /// Store an exercise under the identifier it was looked up by, evicting
    /// the least recently used entry when full.
    pub fn insert(&self, id: &str, exercise: Exercise) {
        self.insert_at(id, exercise, Utc::now());
    }

    fn insert_at(&self, id: &str, exercise: Exercise, now: DateTime<Utc>) {
        let mut inner = self.lock();

        if !inner.entries.contains_key(id)
            && inner.entries.len() >= self.capacity
            && let Some(oldest) = inner.recency.pop_front()
        {
            debug!(exercise_id = %oldest, "Evicting least recently used exercise");
            inner.entries.remove(&oldest);
        }

        inner.entries.insert(
            id.to_string(),
            CacheEntry {
                exercise,
                cached_at: now,
            },
        );
        inner.touch(id);
    }

    /// Number of cached exercises.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.recency.clear();
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that found nothing usable.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Entries are replaced whole, so a poisoned lock still holds valid data
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn ttl_from_secs(secs: u64) -> Option<Duration> {
    let ttl = i64::try_from(secs).ok().and_then(Duration::try_seconds);
    if ttl.is_none() {
        warn!(ttl_secs = secs, "Cache TTL out of range, entries will not expire");
    }
    ttl
}
