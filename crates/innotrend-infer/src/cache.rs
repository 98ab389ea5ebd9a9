//! LRU cache for embedding results.
//!
//! The chunker embeds sentence windows before the chunks themselves are
//! embedded; a one-sentence chunk is the same text as its window, so the
//! second encode is served from here.

use std::collections::{HashMap, VecDeque};

use innotrend_core::Result;
use ndarray::Array1;
use parking_lot::Mutex;

use crate::embedder::{EmbedderBackend, EmbeddingResult};

/// Default number of cached texts.
pub const DEFAULT_CACHE_SIZE: usize = 4096;

/// Thread-safe LRU map from text to embedding.
pub struct EmbeddingCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    entries: HashMap<String, Array1<f32>>,
    /// Least recently used at the front.
    order: VecDeque<String>,
    capacity: usize,
}

impl CacheInner {
    fn touch(&mut self, text: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == text) {
            if let Some(key) = self.order.remove(pos) {
                self.order.push_back(key);
            }
        }
    }
}

impl EmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
                capacity,
            }),
        }
    }

    pub fn get(&self, text: &str) -> Option<Array1<f32>> {
        let mut inner = self.inner.lock();
        let hit = inner.entries.get(text).cloned();
        if hit.is_some() {
            inner.touch(text);
        }
        hit
    }

    pub fn put(&self, text: String, embedding: Array1<f32>) {
        let mut inner = self.inner.lock();
        if inner.entries.insert(text.clone(), embedding).is_some() {
            inner.touch(&text);
            return;
        }
        inner.order.push_back(text);
        while inner.entries.len() > inner.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Memoizing wrapper around any embedding backend.
pub struct CachedEmbedder<B> {
    backend: B,
    cache: EmbeddingCache,
}

impl<B: EmbedderBackend> CachedEmbedder<B> {
    pub fn new(backend: B, capacity: usize) -> Self {
        Self {
            backend,
            cache: EmbeddingCache::new(capacity),
        }
    }

    pub fn cache(&self) -> &EmbeddingCache {
        &self.cache
    }
}

impl<B: EmbedderBackend> EmbedderBackend for CachedEmbedder<B> {
    fn embed(&self, text: &str) -> Result<EmbeddingResult> {
        if let Some(embedding) = self.cache.get(text) {
            return Ok(EmbeddingResult {
                embedding,
                cached: true,
            });
        }
        let result = self.backend.embed(text)?;
        self.cache.put(text.to_string(), result.embedding.clone());
        Ok(result)
    }

    fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    fn is_available(&self) -> bool {
        self.backend.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    impl EmbedderBackend for CountingEmbedder {
        fn embed(&self, text: &str) -> Result<EmbeddingResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EmbeddingResult {
                embedding: array![text.len() as f32, 1.0],
                cached: false,
            })
        }

        fn dimension(&self) -> usize {
            2
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_cache_hit_and_miss() {
        let cache = EmbeddingCache::new(10);
        assert!(cache.get("hello").is_none());

        cache.put("hello".into(), array![1.0, 2.0, 3.0]);
        assert_eq!(cache.get("hello"), Some(array![1.0, 2.0, 3.0]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_evicts_least_recent() {
        let cache = EmbeddingCache::new(2);
        cache.put("a".into(), array![1.0]);
        cache.put("b".into(), array![2.0]);
        // touching "a" makes "b" the eviction candidate
        assert!(cache.get("a").is_some());
        cache.put("c".into(), array![3.0]);
        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_cached_embedder_reuses_results() {
        let embedder = CachedEmbedder::new(
            CountingEmbedder {
                calls: AtomicUsize::new(0),
            },
            16,
        );
        let first = embedder.embed("solar cell").unwrap();
        let second = embedder.embed("solar cell").unwrap();
        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(first.embedding, second.embedding);
        assert_eq!(embedder.backend.calls.load(Ordering::SeqCst), 1);
    }
}
