//! Per-dialect cache of parsed model schemas.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{Model, ModelSchema};

/// Append-only cache of model schemas keyed by model type.
///
/// Lookups take a read lock; a miss builds the schema outside the lock and
/// inserts it unless another thread got there first, so every caller sees
/// the same `Arc` for a given type.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<TypeId, Arc<ModelSchema>>>,
}

impl SchemaCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the schema of `M`, building it on first use.
    pub fn get_or_parse<M: Model>(&self) -> Arc<ModelSchema> {
        let key = TypeId::of::<M>();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(schema) = entries.get(&key) {
                return Arc::clone(schema);
            }
        }

        let parsed = Arc::new(M::schema());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key).or_insert(parsed))
    }

    /// Returns the cached schema of `M`, if any.
    #[must_use]
    pub fn get<M: Model>(&self) -> Option<Arc<ModelSchema>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<M>())
            .cloned()
    }

    /// Number of cached schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached schema.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::schema::{Field, FieldKind};

    struct Account;

    impl Model for Account {
        fn schema() -> ModelSchema {
            ModelSchema::new("Account", "accounts")
                .field(Field::new("id", FieldKind::Uint).primary_key())
        }
    }

    struct Session;

    impl Model for Session {
        fn schema() -> ModelSchema {
            ModelSchema::new("Session", "sessions")
        }
    }

    #[test]
    fn test_same_arc_for_same_type() {
        let cache = SchemaCache::new();
        let a = cache.get_or_parse::<Account>();
        let b = cache.get_or_parse::<Account>();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_types() {
        let cache = SchemaCache::new();
        assert!(cache.get::<Session>().is_none());
        assert_eq!(cache.get_or_parse::<Session>().table, "sessions");
        assert_eq!(cache.get_or_parse::<Account>().table, "accounts");
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_readers() {
        let cache = Arc::new(SchemaCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.get_or_parse::<Account>())
            })
            .collect();
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let first = cache.get_or_parse::<Account>();
        assert!(schemas.iter().all(|s| Arc::ptr_eq(s, &first)));
    }
}
