//! In-process cache backend with Redis-like semantics.

use super::{CacheBackend, CacheError, CacheResult};
use async_trait::async_trait;
use globset::{Glob, GlobMatcher};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
    seq: u64,
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, Entry>,
    next_seq: u64,
}

/// Cache backend kept in process memory.
///
/// Expiry follows `tokio::time`, so paused-clock tests can step past a TTL.
/// Every write stamps the entry with a sequence number; a scan cursor is the
/// lowest sequence number still to examine, so deleting keys mid-scan never
/// makes the scan skip others.
#[derive(Debug, Default)]
pub struct InMemoryCacheBackend {
    state: Mutex<State>,
    failing: AtomicBool,
    unavailable: AtomicBool,
}

impl InMemoryCacheBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every operation fails with `BackendUnavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// When set, the backend reports itself unavailable.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Live keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.lock()
            .entries
            .iter()
            .filter(|(_, entry)| entry.expires_at > now)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Whether a live entry exists at `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.live_value(key).is_some()
    }

    /// The raw stored value at `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.live_value(key)
    }

    /// Remaining time to live of `key`.
    #[must_use]
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.lock()
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.expires_at - now)
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// Whether there are no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores a value directly, bypassing the failure switch.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let mut state = self.lock();
        state.next_seq += 1;
        let seq = state.next_seq;
        state.entries.insert(
            key.into(),
            Entry {
                value: value.into(),
                expires_at: Instant::now() + ttl,
                seq,
            },
        );
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.lock()
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.value.clone())
    }

    fn check(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::unavailable("in-memory backend set to fail"));
        }
        Ok(())
    }

    fn purge_expired(entries: &mut BTreeMap<String, Entry>) {
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
    }
}

fn matcher(pattern: &str) -> CacheResult<GlobMatcher> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| CacheError::unavailable(format!("Invalid scan pattern '{}': {}", pattern, e)))
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check()?;
        Ok(self.live_value(key))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.insert(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<u64> {
        self.check()?;
        let mut state = self.lock();
        Self::purge_expired(&mut state.entries);
        Ok(u64::from(state.entries.remove(key).is_some()))
    }

    async fn scan(&self, cursor: u64, pattern: &str, count: u32) -> CacheResult<(u64, Vec<String>)> {
        self.check()?;
        let matcher = matcher(pattern)?;

        let mut state = self.lock();
        Self::purge_expired(&mut state.entries);

        let mut remaining: Vec<(u64, &String)> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.seq >= cursor)
            .map(|(key, entry)| (entry.seq, key))
            .collect();
        remaining.sort_unstable_by_key(|(seq, _)| *seq);

        let step = usize::try_from(count.max(1)).unwrap_or(usize::MAX);
        let window = &remaining[..step.min(remaining.len())];
        let matched = window
            .iter()
            .filter(|(_, key)| matcher.is_match(key.as_str()))
            .map(|(_, key)| (*key).clone())
            .collect();

        let next_cursor = match remaining.get(window.len()) {
            Some((seq, _)) => *seq,
            None => 0,
        };
        Ok((next_cursor, matched))
    }

    async fn ping(&self) -> CacheResult<()> {
        self.check()
    }

    fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}
