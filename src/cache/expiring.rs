//! Time-expiring in-memory cache for raw API responses
//!
//! Entries are keyed by request URL and hold the undecoded response body. A
//! background reaper task, spawned when the cache is constructed, sweeps out
//! entries older than the TTL on a fixed interval. Lookups also check age, so
//! a caller never sees an entry older than the TTL even if the reaper has not
//! run yet.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace, warn};

/// Default TTL for cached responses: 5 seconds.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

/// Longest sweep period the reaper will wait; longer intervals are clamped.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// TTL and sweep period for a [`ResponseCache`]
///
/// An expired entry is never returned by [`ResponseCache::get`]. It stays
/// resident until the next sweep, so it may occupy memory for up to
/// `ttl + sweep_interval` after insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum age of an entry before it is treated as absent
    pub ttl: Duration,
    /// How often the reaper sweeps expired entries, at most [`MAX_SWEEP_INTERVAL`]
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a config that sweeps once per TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sweep_interval: ttl,
        }
    }

    /// Overrides the sweep interval
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries currently resident, including expired ones not yet swept
    pub entries: usize,
    /// Lookups that returned a payload
    pub hits: u64,
    /// Lookups that found nothing usable
    pub misses: u64,
    /// Entries removed because they outlived the TTL
    pub expired: u64,
}

#[derive(Debug)]
struct CacheEntry {
    payload: Vec<u8>,
    created_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    hits: u64,
    misses: u64,
    expired: u64,
}

/// State shared between cache handles and the reaper task
#[derive(Debug)]
struct Shared {
    state: Mutex<CacheState>,
    ttl: Duration,
}

impl Shared {
    // Critical sections only touch the map and counters and cannot leave them
    // inconsistent, so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sweep(&self) -> usize {
        let mut state = self.lock();
        let now = Instant::now();
        let before = state.entries.len();
        let ttl = self.ttl;
        state.entries.retain(|_, entry| !entry.is_expired(now, ttl));
        let removed = before - state.entries.len();
        state.expired += removed as u64;
        removed
    }
}

/// Concurrency-safe response cache with a background reaper
///
/// Construct it once per session and share it behind an `Arc`. The reaper
/// stops when [`ResponseCache::shutdown`] is called or when the cache is
/// dropped.
#[derive(Debug)]
pub struct ResponseCache {
    shared: Arc<Shared>,
    config: CacheConfig,
    shutdown_tx: mpsc::Sender<()>,
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl ResponseCache {
    /// Creates an empty cache and starts its reaper
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime or if `sweep_interval` is zero.
    pub fn new(config: CacheConfig) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(CacheState::default()),
            ttl: config.ttl,
        });
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let reaper = tokio::spawn(reap_loop(
            Arc::clone(&shared),
            config.sweep_interval,
            shutdown_rx,
        ));

        debug!(
            ttl_ms = config.ttl.as_millis() as u64,
            sweep_ms = config.sweep_interval.as_millis() as u64,
            "response cache started"
        );

        Self {
            shared,
            config,
            shutdown_tx,
            reaper: Mutex::new(Some(reaper)),
        }
    }

    /// Creates a cache that uses `ttl` as both expiry threshold and sweep period
    pub fn with_ttl(ttl: Duration) -> Self {
        Self::new(CacheConfig::new(ttl))
    }

    /// TTL and sweep interval this cache was built with
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Inserts or overwrites the entry for `key`, resetting its age
    pub fn add(&self, key: impl Into<String>, payload: Vec<u8>) {
        let key = key.into();
        let entry = CacheEntry {
            payload,
            created_at: Instant::now(),
        };
        trace!(key = %key, bytes = entry.payload.len(), "cache add");
        self.shared.lock().entries.insert(key, entry);
    }

    /// Returns the payload last added under `key`
    ///
    /// Returns `None` if the key was never added, has been swept, or is older
    /// than the TTL. Lookups never refresh an entry's age.
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = Instant::now();
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        let fresh = state
            .entries
            .get(key)
            .map(|entry| !entry.is_expired(now, self.shared.ttl));

        match fresh {
            Some(true) => {
                state.hits += 1;
                state.entries.get(key).map(|entry| entry.payload.clone())
            }
            Some(false) => {
                state.entries.remove(key);
                state.expired += 1;
                state.misses += 1;
                None
            }
            None => {
                state.misses += 1;
                None
            }
        }
    }

    /// Runs one sweep now and returns the number of entries removed
    pub fn sweep(&self) -> usize {
        self.shared.sweep()
    }

    pub fn len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.shared.lock();
        CacheStats {
            entries: state.entries.len(),
            hits: state.hits,
            misses: state.misses,
            expired: state.expired,
        }
    }

    /// Whether the reaper task is still alive
    pub fn is_reaping(&self) -> bool {
        self.reaper_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the reaper and waits for it to exit
    ///
    /// Safe to call more than once. Entries stay readable afterwards but are
    /// no longer swept in the background.
    pub async fn shutdown(&self) {
        // A full channel means a stop signal is already pending.
        let _ = self.shutdown_tx.try_send(());

        let handle = self.reaper_slot().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                if !err.is_cancelled() {
                    warn!(error = %err, "cache reaper exited abnormally");
                }
            }
        }
    }

    fn reaper_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.reaper.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Sweeps expired entries every `period` until told to stop
///
/// The loop also ends when every sender is dropped, which happens when the
/// owning [`ResponseCache`] goes away.
async fn reap_loop(shared: Arc<Shared>, period: Duration, mut shutdown_rx: mpsc::Receiver<()>) {
    let period = period.min(MAX_SWEEP_INTERVAL);
    let now = Instant::now();
    let start = now.checked_add(period).unwrap_or(now);
    let mut interval = time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let removed = shared.sweep();
                if removed > 0 {
                    debug!(removed, "reaped expired cache entries");
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("cache reaper stopped");
                break;
            }
        }
    }
}
