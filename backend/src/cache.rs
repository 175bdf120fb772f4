//! Time-to-live cache in front of the remote forecast source
//!
//! One entry per location key. A fresh entry (`now - fetched_at < ttl`) is
//! served without touching the network; otherwise the source is called once
//! and, on success, the entry is replaced wholesale. A failed fetch leaves
//! whatever was stored before untouched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use thiserror::Error;

/// Remote fetch failure. Fatal to the forecast run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {message}")]
    Decode { url: String, message: String },
}

/// Remote source of raw forecast payloads, keyed by location
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Value, FetchError>;
}

/// Time source, injectable for tests
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Stored payload with the time it was fetched
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub fetched_at: DateTime<Utc>,
    pub payload: Value,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Key-value storage behind the cache
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CacheEntry>;
    fn put(&self, entry: CacheEntry);
}

/// Process-local store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn put(&self, entry: CacheEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(entry.key.clone(), entry);
    }
}

/// Forecast cache bounding how often each location is re-fetched
#[derive(Clone)]
pub struct TtlCache {
    source: Arc<dyn ForecastSource>,
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    /// Cache over `source` with an in-memory store and the system clock
    pub fn new(source: Arc<dyn ForecastSource>) -> Self {
        Self::with_parts(source, Arc::new(InMemoryStore::new()), Arc::new(SystemClock))
    }

    pub fn with_parts(
        source: Arc<dyn ForecastSource>,
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            store,
            clock,
        }
    }

    /// Payload for `key`, fetched only when no entry younger than `ttl` exists
    pub async fn get(&self, key: &str, ttl: Duration) -> Result<Value, FetchError> {
        let now = self.clock.now();

        if let Some(entry) = self.store.get(key) {
            if entry.is_fresh(now, ttl) {
                tracing::debug!(
                    "Forecast cache hit for {} (age {}s)",
                    key,
                    (now - entry.fetched_at).num_seconds()
                );
                return Ok(entry.payload);
            }
            tracing::debug!("Forecast cache entry for {} is stale", key);
        }

        tracing::info!("Fetching forecast for {}", key);
        let payload = self.source.fetch(key).await?;

        self.store.put(CacheEntry {
            key: key.to_string(),
            fetched_at: now,
            payload: payload.clone(),
        });

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_freshness_boundary() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
        let entry = CacheEntry {
            key: "130000".to_string(),
            fetched_at,
            payload: Value::Null,
        };
        let ttl = Duration::hours(1);

        assert!(entry.is_fresh(fetched_at + Duration::minutes(59), ttl));
        // Age equal to the TTL is already stale
        assert!(!entry.is_fresh(fetched_at + Duration::hours(1), ttl));
    }

    #[test]
    fn test_store_replaces_whole_entry() {
        let store = InMemoryStore::new();
        let t0 = Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
        store.put(CacheEntry {
            key: "130000".to_string(),
            fetched_at: t0,
            payload: Value::from(1),
        });
        store.put(CacheEntry {
            key: "130000".to_string(),
            fetched_at: t0 + Duration::hours(2),
            payload: Value::from(2),
        });

        assert_eq!(store.len(), 1);
        let entry = store.get("130000").unwrap();
        assert_eq!(entry.payload, Value::from(2));
        assert_eq!(entry.fetched_at, t0 + Duration::hours(2));
    }

    struct Unreachable;

    #[async_trait]
    impl ForecastSource for Unreachable {
        async fn fetch(&self, key: &str) -> Result<Value, FetchError> {
            Err(FetchError::Transport {
                url: key.to_string(),
                message: "offline".to_string(),
            })
        }
    }

    struct Fixed(DateTime<Utc>);

    impl Clock for Fixed {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn test_fresh_entry_served_without_source() {
        let t0 = Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap();
        let store = Arc::new(InMemoryStore::new());
        store.put(CacheEntry {
            key: "130000".to_string(),
            fetched_at: t0,
            payload: Value::from(7),
        });
        let cache = TtlCache::with_parts(
            Arc::new(Unreachable),
            store,
            Arc::new(Fixed(t0 + Duration::minutes(10))),
        );

        let payload = tokio_test::block_on(cache.get("130000", Duration::hours(1))).unwrap();
        assert_eq!(payload, Value::from(7));

        let missing = tokio_test::block_on(cache.get("270000", Duration::hours(1)));
        assert!(matches!(missing, Err(FetchError::Transport { .. })));
    }
}
