use crate::error::Result;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

pub trait ModelOptions {
    fn cache_key(&self) -> String;
}

// Cache stores WEAK references - weights are freed when every analyzer using them drops.
// Only model handles live here; classification results are never cached.
type CacheStorage = HashMap<(TypeId, String), Box<dyn Any + Send + Sync>>;

pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn storage(&self) -> MutexGuard<'_, CacheStorage> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());

        {
            let mut cache = self.storage();
            if let Some(boxed) = cache.get(&cache_key) {
                if let Some(strong) = boxed.downcast_ref::<Weak<M>>().and_then(Weak::upgrade) {
                    tracing::debug!(key, "reusing loaded model");
                    return Ok(strong);
                }
                // Weak ref dead, remove stale entry
                cache.remove(&cache_key);
            }
        }

        let model = Arc::new(loader()?);

        let weak: Weak<M> = Arc::downgrade(&model);
        self.storage().insert(cache_key, Box::new(weak));

        Ok(model)
    }

    #[cfg(test)]
    pub fn clear(&self) {
        self.storage().clear();
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.storage().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.storage().is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

/// Process-wide model cache used by the analyzer builders.
pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestModel {
        id: String,
    }

    #[test]
    fn test_cache_returns_same_instance() {
        let cache = ModelCache::new();
        let model1 = cache
            .get_or_create::<TestModel, _>("test", || {
                Ok(TestModel {
                    id: "original".into(),
                })
            })
            .unwrap();
        let model2 = cache
            .get_or_create::<TestModel, _>("test", || Ok(TestModel { id: "new".into() }))
            .unwrap();
        assert_eq!(model1.id, model2.id);
        assert!(Arc::ptr_eq(&model1, &model2));
    }

    #[test]
    fn test_dropped_models_are_reloaded() {
        let cache = ModelCache::new();
        let model = cache
            .get_or_create::<TestModel, _>("k", || Ok(TestModel { id: "first".into() }))
            .unwrap();
        drop(model);

        let model = cache
            .get_or_create::<TestModel, _>("k", || {
                Ok(TestModel {
                    id: "second".into(),
                })
            })
            .unwrap();
        assert_eq!(model.id, "second");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_loader_errors_are_not_cached() {
        let cache = ModelCache::new();
        let err = cache.get_or_create::<TestModel, _>("k", || {
            Err(crate::error::PipelineError::Download("offline".into()))
        });
        assert!(err.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_clear() {
        let cache = ModelCache::new();
        struct A;
        let _a = cache.get_or_create::<A, _>("k", || Ok(A)).unwrap();
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }
}
