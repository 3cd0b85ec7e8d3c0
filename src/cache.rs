//! In-memory response cache keyed by request signature
//!
//! Entries are never evicted by age; a stale entry is simply reported as a
//! miss on the next read and overwritten by the next successful fetch.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::QueryParams;

/// How long a cached response stays valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTtl {
    /// Bypass the cache entirely
    #[default]
    Disabled,
    /// Valid for this many whole seconds
    Seconds(u64),
    /// Valid until `invalidate_all`
    Forever,
}

impl CacheTtl {
    /// Whether a lookup with this TTL marks the key cache-eligible
    pub fn is_enabled(&self) -> bool {
        match self {
            CacheTtl::Disabled | CacheTtl::Seconds(0) => false,
            CacheTtl::Seconds(_) | CacheTtl::Forever => true,
        }
    }

    fn is_fresh(&self, cached_at_millis: u64, now_millis: u64) -> bool {
        match self {
            CacheTtl::Forever => true,
            CacheTtl::Disabled | CacheTtl::Seconds(0) => false,
            CacheTtl::Seconds(secs) => {
                now_millis.saturating_sub(cached_at_millis) < secs.saturating_mul(1000)
            }
        }
    }
}

impl fmt::Display for CacheTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTtl::Disabled => write!(f, "off"),
            CacheTtl::Seconds(secs) => write!(f, "{}", secs),
            CacheTtl::Forever => write!(f, "forever"),
        }
    }
}

impl FromStr for CacheTtl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forever" => Ok(CacheTtl::Forever),
            "off" | "none" | "0" => Ok(CacheTtl::Disabled),
            other => other
                .parse::<u64>()
                .map(CacheTtl::Seconds)
                .map_err(|_| format!("Invalid TTL '{}' (expected seconds, 'off' or 'forever')", s)),
        }
    }
}

/// Cache key for `endpoint` + `params`, e.g. `content/items?a=1&b=2`.
///
/// Params are taken in insertion order and not encoded.
pub fn generate_cache_key(endpoint: &str, params: &QueryParams) -> String {
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", endpoint, query)
}

/// One cached response
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub payload: Value,
    pub request_url: String,
    pub cached_at_millis: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, CacheEntry>,
    /// Keys looked up with caching enabled
    marked: HashSet<String>,
}

/// Shared response cache
#[derive(Debug, Default)]
pub struct ResponseCache {
    inner: Mutex<Inner>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached payload for `key`, or `None` on miss
    pub fn read(&self, key: &str, ttl: CacheTtl) -> Option<Value> {
        self.read_at(key, ttl, now_millis())
    }

    /// `read` against an explicit clock
    pub fn read_at(&self, key: &str, ttl: CacheTtl, now_millis: u64) -> Option<Value> {
        if !ttl.is_enabled() {
            return None;
        }

        let mut inner = self.lock();
        inner.marked.insert(key.to_string());
        inner
            .entries
            .get(key)
            .filter(|entry| ttl.is_fresh(entry.cached_at_millis, now_millis))
            .map(|entry| entry.payload.clone())
    }

    /// Store `payload` under `key`, replacing any previous entry
    pub fn write(&self, key: &str, request_url: &str, payload: Value) {
        self.write_at(key, request_url, payload, now_millis());
    }

    pub fn write_at(&self, key: &str, request_url: &str, payload: Value, now_millis: u64) {
        self.lock().entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                request_url: request_url.to_string(),
                cached_at_millis: now_millis,
            },
        );
    }

    /// Write only if a cache-enabled lookup was made for `key` before.
    ///
    /// Returns whether the payload was stored.
    pub fn write_if_marked(&self, key: &str, request_url: &str, payload: Value) -> bool {
        let now = now_millis();
        let mut inner = self.lock();
        if !inner.marked.contains(key) {
            return false;
        }
        inner.entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                request_url: request_url.to_string(),
                cached_at_millis: now,
            },
        );
        true
    }

    pub fn is_marked(&self, key: &str) -> bool {
        self.lock().marked.contains(key)
    }

    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.lock().entries.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn invalidate_all(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.marked.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generate_cache_key() {
        let params = QueryParams::new().with("a", "1").with("b", "2");
        assert_eq!(generate_cache_key("content/items", &params), "content/items?a=1&b=2");
        assert_eq!(
            generate_cache_key("content/items", &QueryParams::new()),
            "content/items?"
        );
    }

    #[test]
    fn test_ttl_boundary_is_strict() {
        let cache = ResponseCache::new();
        cache.write_at("k", "url", json!({"content": [1]}), 1_000);

        let ttl = CacheTtl::Seconds(60);
        assert!(cache.read_at("k", ttl, 1_000).is_some());
        assert!(cache.read_at("k", ttl, 1_000 + 59_999).is_some());
        assert!(cache.read_at("k", ttl, 1_000 + 60_000).is_none());
        assert!(cache.read_at("k", ttl, 1_000 + 120_000).is_none());
    }

    #[test]
    fn test_forever_survives_until_invalidate() {
        let cache = ResponseCache::new();
        cache.write_at("k", "url", json!([1, 2]), 0);
        assert_eq!(cache.read_at("k", CacheTtl::Forever, u64::MAX), Some(json!([1, 2])));

        cache.invalidate_all();
        assert!(cache.read("k", CacheTtl::Forever).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_disabled_never_hits_or_marks() {
        let cache = ResponseCache::new();
        cache.write("k", "url", json!({"a": 1}));
        assert!(cache.read("k", CacheTtl::Disabled).is_none());
        assert!(cache.read("k", CacheTtl::Seconds(0)).is_none());
        assert!(!cache.is_marked("k"));
    }

    #[test]
    fn test_miss_on_absent_key() {
        let cache = ResponseCache::new();
        assert!(cache.read("missing", CacheTtl::Seconds(10)).is_none());
        assert!(cache.is_marked("missing"));
    }

    #[test]
    fn test_write_after_mark() {
        let cache = ResponseCache::new();

        // No enabled lookup yet: the write is dropped
        assert!(!cache.write_if_marked("k", "url", json!({"a": 1})));
        assert!(!cache.contains("k"));

        cache.read("k", CacheTtl::Seconds(30));
        assert!(cache.write_if_marked("k", "url", json!({"a": 1})));
        assert_eq!(cache.read("k", CacheTtl::Seconds(30)), Some(json!({"a": 1})));
    }

    #[test]
    fn test_write_overwrites() {
        let cache = ResponseCache::new();
        cache.write_at("k", "url-1", json!(1), 10);
        cache.write_at("k", "url-2", json!(2), 20);
        let entry = cache.entry("k").unwrap();
        assert_eq!(entry.payload, json!(2));
        assert_eq!(entry.request_url, "url-2");
        assert_eq!(entry.cached_at_millis, 20);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_parse() {
        assert_eq!("forever".parse::<CacheTtl>(), Ok(CacheTtl::Forever));
        assert_eq!("off".parse::<CacheTtl>(), Ok(CacheTtl::Disabled));
        assert_eq!("0".parse::<CacheTtl>(), Ok(CacheTtl::Disabled));
        assert_eq!("90".parse::<CacheTtl>(), Ok(CacheTtl::Seconds(90)));
        assert!("soon".parse::<CacheTtl>().is_err());
    }
}
