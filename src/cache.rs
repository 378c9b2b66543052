//! Time-boxed cache for resolution results

use crate::types::ResolutionResult;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default sweep cadence for the background expiry task
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// A single cached resolution with its expiry
#[derive(Debug, Clone)]
struct CacheEntry {
    value: ResolutionResult,
    created_at: DateTime<Utc>,
    expires_at: Instant,
}

/// Observability snapshot of the cache
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    pub ttl: Duration,
    pub keys: Vec<String>,
}

/// In-memory result cache keyed by normalized domain
///
/// Cache hits bypass the query scheduler entirely, so the store takes its own
/// lock rather than relying on upstream serialization. A miss is a normal
/// outcome, never an error.
pub struct ResultCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl ResultCache {
    /// Create a cache with the given default TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Look up a domain. Expired entries read as absent and are evicted on the spot.
    pub fn get(&self, key: &str) -> Option<ResolutionResult> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a result under the default TTL, overwriting any previous entry.
    pub fn set(&self, key: impl Into<String>, value: ResolutionResult) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    /// Store a result under an explicit TTL.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: ResolutionResult, ttl: Duration) {
        let entry = CacheEntry {
            value,
            created_at: Utc::now(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.into(), entry);
    }

    /// Whether a live entry exists for this key.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove one entry. Missing keys are not an error.
    pub fn delete(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Evict every expired entry, returning how many were removed.
    ///
    /// Runs on the background sweep tick so memory stays bounded even when
    /// nothing reads the expired keys again.
    pub fn clean_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// Current size, TTL, and key set.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        CacheStats {
            size: entries.len(),
            ttl: self.default_ttl,
            keys: entries.keys().cloned().collect(),
        }
    }

    /// Age of a cached entry, if present.
    pub fn entry_age(&self, key: &str) -> Option<chrono::Duration> {
        let entries = self.entries.lock();
        entries.get(key).map(|e| Utc::now() - e.created_at)
    }

    /// Spawn the periodic expiry sweep. The task holds only a weak handle and
    /// stops once the cache is dropped everywhere else.
    pub fn start_sweeper(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::downgrade(&self);
        drop(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; skip the startup tick
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else { break };
                let evicted = cache.clean_expired();
                if evicted > 0 {
                    tracing::debug!(evicted = %evicted, "Cache sweep evicted expired entries");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DomainStatus, Provider};

    fn result(domain: &str) -> ResolutionResult {
        ResolutionResult::from_status(domain, DomainStatus::Registered, Provider::Whois, 10)
    }

    #[test]
    fn test_set_get_roundtrip() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.set("example.com", result("example.com"));

        let hit = cache.get("example.com").unwrap();
        assert_eq!(hit.domain, "example.com");
        assert!(cache.has("example.com"));
        assert!(!cache.has("other.com"));
    }

    #[test]
    fn test_expired_entry_reads_as_absent() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.set_with_ttl("example.com", result("example.com"), Duration::ZERO);

        assert!(cache.get("example.com").is_none());
        // read-time eviction removed it
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.set("example.com", result("example.com"));
        let mut newer = result("example.com");
        newer.response_time_ms = 999;
        cache.set("example.com", newer);

        assert_eq!(cache.get("example.com").unwrap().response_time_ms, 999);
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.set("a.com", result("a.com"));
        cache.set("b.com", result("b.com"));

        cache.delete("a.com");
        cache.delete("missing.com");
        assert!(!cache.has("a.com"));
        assert!(cache.has("b.com"));

        cache.clear();
        assert_eq!(cache.stats().size, 0);
    }

    #[test]
    fn test_clean_expired_only_removes_stale() {
        let cache = ResultCache::new(Duration::from_secs(60));
        cache.set_with_ttl("stale.com", result("stale.com"), Duration::ZERO);
        cache.set("fresh.com", result("fresh.com"));

        assert_eq!(cache.clean_expired(), 1);
        let stats = cache.stats();
        assert_eq!(stats.size, 1);
        assert_eq!(stats.keys, vec!["fresh.com".to_string()]);
    }

    #[test]
    fn test_entry_age_tracks_insertion() {
        let cache = ResultCache::new(Duration::from_secs(60));
        assert!(cache.entry_age("example.com").is_none());

        cache.set("example.com", result("example.com"));
        let age = cache.entry_age("example.com").unwrap();
        assert!(age >= chrono::Duration::zero());
    }

    #[tokio::test]
    async fn test_sweeper_evicts_in_background() {
        let cache = Arc::new(ResultCache::new(Duration::from_secs(60)));
        cache.set_with_ttl("stale.com", result("stale.com"), Duration::ZERO);

        let handle = Arc::clone(&cache).start_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.stats().size, 0);
        handle.abort();
    }
}
