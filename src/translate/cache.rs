//! Process-wide LRU cache of finished translations.
//!
//! The lock is only held for lookups and inserts, never across a translation,
//! so two concurrent misses on the same key both compute and the later insert
//! wins. Values are deterministic for a given key and model.

use std::num::NonZeroUsize;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::debug;

use super::preset::{ContextName, PresetName};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub text: String,
    pub config: PresetName,
    pub context: ContextName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

pub struct TranslationCache {
    inner: Mutex<Inner>,
}

struct Inner {
    entries: LruCache<CacheKey, String>,
    hits: u64,
    misses: u64,
}

impl TranslationCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let mut inner = self.inner.lock().await;
        match inner.entries.get(key).cloned() {
            Some(value) => {
                inner.hits += 1;
                debug!("Cache hit ({} / {})", key.config, key.context);
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    pub async fn put(&self, key: CacheKey, value: String) {
        let mut inner = self.inner.lock().await;
        if let Some((evicted, _)) = inner.entries.push(key.clone(), value) {
            if evicted != key {
                debug!("Evicted LRU entry ({} chars)", evicted.text.chars().count());
            }
        }
    }

    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            len: inner.entries.len(),
            capacity: inner.entries.cap().get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, config: PresetName) -> CacheKey {
        CacheKey {
            text: text.to_string(),
            config,
            context: ContextName::Auto,
        }
    }

    #[tokio::test]
    async fn test_hit_after_put() {
        let cache = TranslationCache::new(NonZeroUsize::new(4).unwrap());
        let k = key("नमस्ते", PresetName::Default);

        assert_eq!(cache.get(&k).await, None);
        cache.put(k.clone(), "Hello".to_string()).await;
        assert_eq!(cache.get(&k).await, Some("Hello".to_string()));

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.len), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_preset_is_part_of_key() {
        let cache = TranslationCache::new(NonZeroUsize::new(4).unwrap());
        cache
            .put(key("नमस्ते", PresetName::Default), "Hello".to_string())
            .await;
        assert_eq!(cache.get(&key("नमस्ते", PresetName::Fast)).await, None);
    }

    #[tokio::test]
    async fn test_least_recently_used_is_evicted() {
        let cache = TranslationCache::new(NonZeroUsize::new(2).unwrap());
        let a = key("a", PresetName::Default);
        let b = key("b", PresetName::Default);
        let c = key("c", PresetName::Default);

        cache.put(a.clone(), "A".to_string()).await;
        cache.put(b.clone(), "B".to_string()).await;
        // touch a so b becomes the eviction candidate
        cache.get(&a).await;
        cache.put(c.clone(), "C".to_string()).await;

        assert_eq!(cache.get(&b).await, None);
        assert_eq!(cache.get(&a).await, Some("A".to_string()));
        assert_eq!(cache.get(&c).await, Some("C".to_string()));
        assert_eq!(cache.stats().await.len, 2);
    }
}
