//! Time-bounded lookup cache.
//!
//! [`TimedLookupCache::get`] returns a stored value while it is younger than
//! the caller's freshness window and otherwise runs the caller's fetch
//! function. At most one fetch per key is in flight; concurrent callers for
//! that key await the same shared result.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace, warn};

use depot_core::constants::DEFAULT_FETCH_TIMEOUT_SECS;
use depot_core::error::{DepotError, Result};

use crate::clock::{Clock, SystemClock};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// What a lookup returns when a refresh of an existing entry fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshFailurePolicy {
    /// Surface the failure. The stale entry stays in the cache untouched.
    #[default]
    Propagate,
    /// Return the last-known value, marked [`LookupSource::Stale`].
    ServeStale,
}

/// What a lookup does when another caller is already refreshing the key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrentRefreshPolicy {
    /// Await the in-flight refresh and share its result.
    #[default]
    Wait,
    /// Return the last-known value immediately if there is one.
    ServeStale,
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries; least-recently-used entries are evicted
    /// beyond it. `None` means unbounded.
    pub max_entries: Option<usize>,
    /// Default fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,
    /// Behaviour when refreshing a stale entry fails
    pub on_refresh_failure: RefreshFailurePolicy,
    /// Behaviour for callers that find a refresh already in flight
    pub while_refreshing: ConcurrentRefreshPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_SECS * 1000,
            on_refresh_failure: RefreshFailurePolicy::Propagate,
            while_refreshing: ConcurrentRefreshPolicy::Wait,
        }
    }
}

impl CacheConfig {
    /// Bounds the cache to `max_entries` with LRU eviction.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    /// Sets the default fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Serves the last-known value when a refresh fails.
    pub fn serve_stale_on_failure(mut self) -> Self {
        self.on_refresh_failure = RefreshFailurePolicy::ServeStale;
        self
    }

    /// Serves the last-known value to callers that find a refresh in flight.
    pub fn serve_stale_while_refreshing(mut self) -> Self {
        self.while_refreshing = ConcurrentRefreshPolicy::ServeStale;
        self
    }

    /// Default fetch timeout as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRIES AND LOOKUP RESULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// A cached value and the time its fetch completed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacheEntry<V> {
    /// The cached payload
    pub value: V,
    /// When the fetch that produced `value` completed
    pub fetched_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    /// Creates an entry stamped at `fetched_at`.
    pub fn new(value: V, fetched_at: DateTime<Utc>) -> Self {
        Self { value, fetched_at }
    }

    /// Age of the entry at `now`. A clock that moved backwards reads as zero.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// True while the entry's age is strictly below `window`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.age(now) < window
    }
}

/// Where a lookup's value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    /// A fresh stored entry; no fetch ran.
    Cached,
    /// The fetch function ran for this lookup (or one it coalesced with).
    Fetched,
    /// A stale entry returned by policy.
    Stale,
}

/// Result of [`TimedLookupCache::lookup`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CacheLookup<V> {
    /// The value
    pub value: V,
    /// When the value was fetched
    pub fetched_at: DateTime<Utc>,
    /// How the value was obtained
    pub source: LookupSource,
}

impl<V> CacheLookup<V> {
    fn from_entry(entry: CacheEntry<V>, source: LookupSource) -> Self {
        Self {
            value: entry.value,
            fetched_at: entry.fetched_at,
            source,
        }
    }

    /// True if the value is past its freshness window.
    pub fn is_stale(&self) -> bool {
        self.source == LookupSource::Stale
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CacheStats {
    /// Stored entries (fresh or stale)
    pub entries: usize,
    /// Fetches currently running
    pub in_flight: usize,
    /// Maximum entries, if bounded
    pub capacity: Option<usize>,
    /// Lookups answered from a fresh entry
    pub hits: u64,
    /// Lookups for keys with no entry
    pub misses: u64,
    /// Fetches started for stale entries
    pub refreshes: u64,
    /// Fetches that failed or timed out
    pub failures: u64,
    /// Lookups answered with a stale value by policy
    pub stale_served: u64,
    /// Lookups that joined an in-flight fetch
    pub coalesced: u64,
    /// Entries evicted by the size bound
    pub evictions: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Why a fetch produced no value. Cloned to every coalesced caller.
#[derive(Clone, Debug)]
enum FetchFailure {
    Failed(Arc<DepotError>),
    TimedOut(Duration),
    Aborted(String),
}

impl FetchFailure {
    fn into_error(self, key: &impl Display) -> DepotError {
        match self {
            FetchFailure::Failed(source) => DepotError::FetchFailed {
                key: key.to_string(),
                source,
            },
            FetchFailure::TimedOut(timeout) => DepotError::FetchTimeout {
                key: key.to_string(),
                timeout,
            },
            FetchFailure::Aborted(reason) => DepotError::FetchFailed {
                key: key.to_string(),
                source: Arc::new(DepotError::InternalError(format!(
                    "fetch task aborted: {reason}"
                ))),
            },
        }
    }
}

type FetchOutcome<V> = std::result::Result<CacheEntry<V>, FetchFailure>;
type InFlight<V> = Shared<BoxFuture<'static, FetchOutcome<V>>>;

struct State<K: Hash + Eq, V> {
    entries: LruCache<K, CacheEntry<V>>,
    in_flight: HashMap<K, InFlight<V>>,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    failures: AtomicU64,
    stale_served: AtomicU64,
    coalesced: AtomicU64,
    evictions: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

struct Inner<K: Hash + Eq, V> {
    state: Mutex<State<K, V>>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
    counters: Counters,
}

impl<K, V> Inner<K, V>
where
    K: Hash + Eq + Clone + Display,
    V: Clone,
{
    /// Clears the in-flight slot and stores a successful result.
    fn complete(&self, key: &K, outcome: &FetchOutcome<V>) {
        let mut state = self.state.lock();
        state.in_flight.remove(key);

        match outcome {
            Ok(entry) => {
                if let Some((evicted, _)) = state.entries.push(key.clone(), entry.clone()) {
                    if evicted != *key {
                        Counters::bump(&self.counters.evictions);
                        debug!(key = %evicted, "Evicted least-recently-used entry");
                    }
                }
            }
            Err(_) => Counters::bump(&self.counters.failures),
        }
    }
}

/// Per-key memoization of an expensive or external fetch, bounded by a
/// freshness window.
///
/// Cloning is cheap and clones share the same entries.
///
/// # Thread Safety
///
/// The entry map sits behind a single mutex that is never held across an
/// await, so lookups for different keys only contend for that short
/// critical section. Fetches run on their own tokio task; dropping a lookup
/// future does not cancel a fetch other callers may be waiting on.
pub struct TimedLookupCache<K: Hash + Eq, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K: Hash + Eq, V> Clone for TimedLookupCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> TimedLookupCache<K, V>
where
    K: Hash + Eq + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new cache with default configuration and the system clock.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache with custom configuration and the system clock.
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a cache with custom configuration and time source.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        let entries = match config.max_entries.and_then(std::num::NonZeroUsize::new) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };

        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    entries,
                    in_flight: HashMap::new(),
                }),
                clock,
                config,
                counters: Counters::default(),
            }),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Returns the value for `key`, fetching it if absent or older than `window`.
    pub async fn get<F, Fut>(&self, key: K, window: Duration, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.lookup(key, window, fetch).await.map(|found| found.value)
    }

    /// Like [`get`](Self::get) with a per-call fetch timeout.
    pub async fn get_with_timeout<F, Fut>(
        &self,
        key: K,
        window: Duration,
        timeout: Duration,
        fetch: F,
    ) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        self.lookup_with_timeout(key, window, timeout, fetch)
            .await
            .map(|found| found.value)
    }

    /// Like [`get`](Self::get), also reporting when and how the value was obtained.
    pub async fn lookup<F, Fut>(&self, key: K, window: Duration, fetch: F) -> Result<CacheLookup<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let timeout = self.inner.config.fetch_timeout();
        self.lookup_with_timeout(key, window, timeout, fetch).await
    }

    /// The full lookup: fresh hit, join an in-flight fetch, or start one.
    ///
    /// A failed fetch never modifies the stored entry. Whether the caller then
    /// sees the failure or the last-known value follows
    /// [`CacheConfig::on_refresh_failure`]; a key with no entry always
    /// surfaces the failure.
    #[instrument(level = "debug", skip_all, fields(key = %key))]
    pub async fn lookup_with_timeout<F, Fut>(
        &self,
        key: K,
        window: Duration,
        timeout: Duration,
        fetch: F,
    ) -> Result<CacheLookup<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let counters = &self.inner.counters;

        let (joined, previous) = {
            let mut state = self.inner.state.lock();
            match self.check_entry(&mut state, &key, window) {
                Ok(hit) => return Ok(hit),
                Err(previous) => (state.in_flight.get(&key).cloned(), previous),
            }
        };

        let (pending, previous, started) = match joined {
            Some(pending) => (pending, previous, false),
            None => {
                // The closure is caller code and may call back into this cache.
                let fetch = fetch();

                let mut state = self.inner.state.lock();
                let previous = match self.check_entry(&mut state, &key, window) {
                    Ok(hit) => return Ok(hit),
                    Err(previous) => previous,
                };

                match state.in_flight.get(&key).cloned() {
                    // Another caller started a fetch while the lock was released.
                    Some(pending) => (pending, previous, false),
                    None => {
                        if previous.is_some() {
                            Counters::bump(&counters.refreshes);
                            debug!("Entry stale, refreshing");
                        } else {
                            Counters::bump(&counters.misses);
                            debug!("Cache miss, fetching");
                        }
                        let pending = self.spawn_fetch(key.clone(), timeout, fetch);
                        state.in_flight.insert(key.clone(), pending.clone());
                        (pending, previous, true)
                    }
                }
            }
        };

        if started {
            return self.settle(&key, pending, previous).await;
        }

        Counters::bump(&counters.coalesced);
        if let (Some(entry), ConcurrentRefreshPolicy::ServeStale) =
            (&previous, self.inner.config.while_refreshing)
        {
            Counters::bump(&counters.stale_served);
            debug!("Refresh in flight, serving stale value");
            return Ok(CacheLookup::from_entry(entry.clone(), LookupSource::Stale));
        }
        debug!("Joining in-flight fetch");
        self.settle(&key, pending, previous).await
    }

    /// Returns a fresh hit for `key`, or the stale entry if there is one.
    fn check_entry(
        &self,
        state: &mut State<K, V>,
        key: &K,
        window: Duration,
    ) -> std::result::Result<CacheLookup<V>, Option<CacheEntry<V>>> {
        let now = self.inner.clock.now();
        match state.entries.get(key) {
            Some(entry) if entry.is_fresh(now, window) => {
                Counters::bump(&self.inner.counters.hits);
                trace!("Cache hit");
                Ok(CacheLookup::from_entry(entry.clone(), LookupSource::Cached))
            }
            Some(entry) => Err(Some(entry.clone())),
            None => Err(None),
        }
    }

    /// Awaits a fetch and applies the refresh-failure policy to its outcome.
    async fn settle(
        &self,
        key: &K,
        pending: InFlight<V>,
        previous: Option<CacheEntry<V>>,
    ) -> Result<CacheLookup<V>> {
        match pending.await {
            Ok(entry) => Ok(CacheLookup::from_entry(entry, LookupSource::Fetched)),
            Err(failure) => {
                let err = failure.into_error(key);
                match (previous, self.inner.config.on_refresh_failure) {
                    (Some(entry), RefreshFailurePolicy::ServeStale) => {
                        Counters::bump(&self.inner.counters.stale_served);
                        warn!(error = %err, fetched_at = %entry.fetched_at, "Refresh failed, serving stale value");
                        Ok(CacheLookup::from_entry(entry, LookupSource::Stale))
                    }
                    _ => {
                        warn!(error = %err, "Fetch failed");
                        Err(err)
                    }
                }
            }
        }
    }

    /// Runs `fetch` on its own task under `timeout` and returns a shareable
    /// handle to the outcome. The in-flight slot is cleared when it settles.
    fn spawn_fetch<Fut>(&self, key: K, timeout: Duration, fetch: Fut) -> InFlight<V>
    where
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);

        let driver = tokio::spawn(async move {
            // A separate task turns a panicking fetch into a JoinError.
            let mut task = tokio::spawn(fetch);
            let outcome = match tokio::time::timeout(timeout, &mut task).await {
                Ok(Ok(Ok(value))) => Ok(CacheEntry::new(value, inner.clock.now())),
                Ok(Ok(Err(err))) => Err(FetchFailure::Failed(Arc::new(err))),
                Ok(Err(join_err)) => Err(FetchFailure::Aborted(join_err.to_string())),
                Err(_) => {
                    task.abort();
                    Err(FetchFailure::TimedOut(timeout))
                }
            };
            inner.complete(&key, &outcome);
            outcome
        });

        async move {
            driver
                .await
                .unwrap_or_else(|join_err| Err(FetchFailure::Aborted(join_err.to_string())))
        }
        .boxed()
        .shared()
    }

    /// Returns the stored entry for `key`, fresh or stale, without fetching.
    ///
    /// Does not count as a use for LRU purposes.
    pub fn peek(&self, key: &K) -> Option<CacheEntry<V>> {
        self.inner.state.lock().entries.peek(key).cloned()
    }

    /// Drops the entry for `key`. An in-flight fetch still stores its result.
    pub fn invalidate(&self, key: &K) -> bool {
        self.inner.state.lock().entries.pop(key).is_some()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.state.lock().entries.clear();
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (entries, in_flight) = {
            let state = self.inner.state.lock();
            (state.entries.len(), state.in_flight.len())
        };
        let c = &self.inner.counters;
        CacheStats {
            entries,
            in_flight,
            capacity: self.inner.config.max_entries,
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            refreshes: c.refreshes.load(Ordering::Relaxed),
            failures: c.failures.load(Ordering::Relaxed),
            stale_served: c.stale_served.load(Ordering::Relaxed),
            coalesced: c.coalesced.load(Ordering::Relaxed),
            evictions: c.evictions.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> Default for TimedLookupCache<K, V>
where
    K: Hash + Eq + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
