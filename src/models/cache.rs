use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Source of "now" for freshness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub data: V,
    pub fetched_at: SystemTime,
}

/// Keyed read-through cache with a per-call freshness window.
///
/// Entries are only replaced by a successful refresh; nothing is evicted.
/// The lock is never held across a fetch, so two callers racing on the same
/// cold key may both hit the upstream.
pub struct TtlCache<V = Value> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Cached value for `key` if it was fetched less than `ttl` ago.
    pub fn get_fresh(&self, key: &str, ttl: Duration) -> Option<V> {
        let now = self.clock.now();
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;
        match now.duration_since(entry.fetched_at) {
            Ok(elapsed) if elapsed < ttl => Some(entry.data.clone()),
            _ => None,
        }
    }

    pub fn insert(&self, key: &str, data: V) {
        let entry = CacheEntry {
            data,
            fetched_at: self.clock.now(),
        };
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the fresh cached value, or runs `fetch` and stores its result.
    /// A failed fetch stores nothing.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, ttl: Duration, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(data) = self.get_fresh(key, ttl) {
            debug!("Cache hit for {}", key);
            return Ok(data);
        }

        debug!("Cache miss for {}", key);
        self.refresh(key, fetch).await
    }

    /// Runs `fetch` without looking at the cache and stores the result on
    /// success. On failure the existing entry, if any, is left as it was.
    pub async fn refresh<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let data = fetch().await?;
        self.insert(key, data.clone());
        Ok(data)
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Case-insensitive cache key: `provider:endpoint:identity`.
pub fn cache_key(provider: &str, endpoint: &str, identity: &str) -> String {
    format!("{}:{}:{}", provider, endpoint, identity).to_lowercase()
}
