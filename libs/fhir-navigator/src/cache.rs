//! Two-tier cache (spec §4.8, §6.3): a bounded hot LRU plus an optional
//! async cold tier, keyed by a canonical JSON-array representation. Modeled
//! after `zunder-context`'s `Cache<V>` abstraction, but made uniformly
//! asynchronous per spec §9 ("define the cache contract as uniformly
//! asynchronous").

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One part of an ordered cache key (spec §6.3: "ordered arrays of strings
/// and integers").
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CacheKeyPart {
    Str(String),
    Int(i64),
}

impl From<&str> for CacheKeyPart {
    fn from(s: &str) -> Self {
        CacheKeyPart::Str(s.to_string())
    }
}

impl From<String> for CacheKeyPart {
    fn from(s: String) -> Self {
        CacheKeyPart::Str(s)
    }
}

impl From<i64> for CacheKeyPart {
    fn from(n: i64) -> Self {
        CacheKeyPart::Int(n)
    }
}

pub type CacheKey = Vec<CacheKeyPart>;

/// Canonical JSON array serialization of a cache key, used as the hot LRU's
/// internal string key (spec §4.8 "Key serialization ... is a canonical JSON
/// array representation").
pub fn serialize_key(key: &CacheKey) -> String {
    let values: Vec<Value> = key
        .iter()
        .map(|part| match part {
            CacheKeyPart::Str(s) => Value::String(s.clone()),
            CacheKeyPart::Int(n) => Value::from(*n),
        })
        .collect();
    serde_json::to_string(&Value::Array(values)).expect("cache key parts are always JSON-safe")
}

/// Pluggable cold tier. A synchronous implementation is exposed by returning
/// an immediately-ready future (spec §9).
#[async_trait]
pub trait ColdCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<V>, Box<dyn std::error::Error + Send + Sync>>;
    async fn set(&self, key: &str, value: V) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    async fn has(&self, key: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
    async fn delete(&self, key: &str) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
    async fn clear(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Hot LRU + optional cold tier, keyed by [`CacheKey`] (spec §4.8).
pub struct TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    hot: Mutex<LruCache<String, V>>,
    cold: Option<Arc<dyn ColdCache<V>>>,
}

impl<V> TieredCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, capacity: usize, cold: Option<Arc<dyn ColdCache<V>>>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or_else(|| NonZeroUsize::new(1).unwrap());
        Self {
            name,
            hot: Mutex::new(LruCache::new(capacity)),
            cold,
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let serialized = serialize_key(key);

        if let Some(hit) = self.hot.lock().await.get(&serialized).cloned() {
            debug!(cache = self.name, key = %serialized, "hot cache hit");
            return Some(hit);
        }

        let cold = self.cold.as_ref()?;
        match cold.get(&serialized).await {
            Ok(Some(value)) => {
                debug!(cache = self.name, key = %serialized, "cold cache hit");
                self.hot.lock().await.put(serialized, value.clone());
                Some(value)
            }
            Ok(None) => {
                debug!(cache = self.name, key = %serialized, "cache miss");
                None
            }
            Err(err) => {
                warn!(cache = self.name, error = %err, "cold cache get failed, treating as miss");
                None
            }
        }
    }

    pub async fn set(&self, key: &CacheKey, value: V) {
        let serialized = serialize_key(key);
        self.hot.lock().await.put(serialized.clone(), value.clone());

        if let Some(cold) = self.cold.clone() {
            let name = self.name;
            tokio::spawn(async move {
                if let Err(err) = cold.set(&serialized, value).await {
                    warn!(cache = name, error = %err, "fire-and-forget cold cache write failed");
                }
            });
        }
    }

    pub async fn has(&self, key: &CacheKey) -> bool {
        let serialized = serialize_key(key);
        if self.hot.lock().await.contains(&serialized) {
            return true;
        }
        match &self.cold {
            Some(cold) => cold.has(&serialized).await.unwrap_or(false),
            None => false,
        }
    }

    pub async fn delete(&self, key: &CacheKey) -> bool {
        let serialized = serialize_key(key);
        let hot_deleted = self.hot.lock().await.pop(&serialized).is_some();

        match &self.cold {
            Some(cold) => match cold.delete(&serialized).await {
                Ok(cold_deleted) => hot_deleted || cold_deleted,
                Err(err) => {
                    warn!(cache = self.name, error = %err, "cold cache delete failed");
                    hot_deleted
                }
            },
            None => hot_deleted,
        }
    }

    pub async fn clear(&self) {
        self.hot.lock().await.clear();
        if let Some(cold) = &self.cold {
            if let Err(err) = cold.clear().await {
                warn!(cache = self.name, error = %err, "cold cache clear failed");
            }
        }
    }
}
