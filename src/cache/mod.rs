//! Cache module for memoizing API responses in memory
//!
//! This module provides a response cache that holds raw response bodies keyed
//! by request URL. Entries expire after a configurable TTL and are swept by a
//! background reaper owned by the cache, so nothing outlives the session.

mod expiring;

pub use expiring::{CacheConfig, CacheStats, ResponseCache, DEFAULT_TTL, MAX_SWEEP_INTERVAL};
