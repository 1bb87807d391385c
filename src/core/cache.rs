//! Model caching utilities for sharing loaded weights across the process.
//!
//! Each cache entry is a one-time-initialization cell: the first caller for a key
//! runs the loader while any concurrent callers for the same key block and then
//! receive the same instance. A failed load leaves the cell empty so the next
//! caller can try again. Entries are never torn down.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::{Lazy, OnceCell};

use super::error::{PipelineError, Result};

/// Trait implemented by model option types to generate a stable cache key.
pub trait ModelOptions {
    fn cache_key(&self) -> String;
}

type CacheSlot = Arc<OnceCell<Arc<dyn Any + Send + Sync>>>;
type CacheStorage = HashMap<(TypeId, String), CacheSlot>;

/// A thread-safe, memoizing cache for model instances.
pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    /// Create a new empty model cache.
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn storage(&self) -> MutexGuard<'_, CacheStorage> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get or create a model from the cache.
    ///
    /// The loader runs at most once per `(M, key)` pair, even when several threads
    /// ask for the same model at the same time.
    ///
    /// # Arguments
    /// * `key` - A unique identifier for this model variant (e.g., "qwen3-0.6b-Cpu")
    /// * `loader` - A function that creates a new model instance if not cached
    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        // Only the slot lookup happens under the map lock; the (slow) load runs
        // under the slot's own once-cell so unrelated keys never wait on it.
        let slot = {
            let mut cache = self.storage();
            cache
                .entry((TypeId::of::<M>(), key.to_string()))
                .or_default()
                .clone()
        };

        let cached = slot.get_or_try_init(|| {
            tracing::debug!(key, "loading model into cache");
            loader().map(|model| Arc::new(model) as Arc<dyn Any + Send + Sync>)
        })?;

        cached.clone().downcast::<M>().map_err(|_| {
            PipelineError::Unavailable(format!("cache entry '{key}' holds a different model type"))
        })
    }

    /// Drop every cache entry. Models already handed out stay alive.
    pub fn clear(&self) {
        self.storage().clear();
    }

    /// Number of initialized cache entries.
    pub fn len(&self) -> usize {
        self.storage()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Global model cache instance.
static GLOBAL_MODEL_CACHE: Lazy<ModelCache> = Lazy::new(ModelCache::new);

/// Get a reference to the global model cache.
pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}
