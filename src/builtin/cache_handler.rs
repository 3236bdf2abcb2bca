//! Shared store for resolved field values.
//!
//! Entries are keyed by the field coordinate (`Type.field`) and a digest of
//! the source and arguments the value was resolved from.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

/// Thread-safe in-memory cache of field results.
///
/// Clones share the same storage, so one handler can back the cache
/// extensions of many fields.
#[derive(Debug, Clone, Default)]
pub struct CacheHandler {
    cache: Arc<RwLock<HashMap<String, Value>>>,
}

impl CacheHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(coordinate: &str, input: &str) -> String {
        format!("{coordinate}-{input}")
    }

    /// Store the value resolved for `coordinate` from `input`.
    pub fn add(&self, coordinate: &str, input: &str, output: Value) {
        self.cache.write().insert(Self::key(coordinate, input), output);
    }

    /// Look up a previously stored value.
    pub fn read(&self, coordinate: &str, input: &str) -> Option<Value> {
        self.cache.read().get(&Self::key(coordinate, input)).cloned()
    }

    /// Drop every entry stored for `coordinate`.
    pub fn invalidate(&self, coordinate: &str) -> usize {
        let prefix = format!("{coordinate}-");
        let mut cache = self.cache.write();
        let before = cache.len();
        cache.retain(|key, _| !key.starts_with(&prefix));
        before - cache.len()
    }

    pub fn clear(&self) {
        self.cache.write().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
