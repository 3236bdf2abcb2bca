//! Memoizing extension.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::json;

use super::cache_handler::CacheHandler;
use crate::extensions::{AsyncCapable, AsyncNext, SyncCapable, SyncNext};
use crate::types::{Arguments, Info, ResolveResult, Value};

/// Caches successful results per `(field, source, arguments)`.
///
/// Errors are never cached. Several fields may share one [`CacheHandler`];
/// entries are namespaced by the field coordinate.
///
/// The request context and variables on [`Info`] are not part of the key, so
/// a field whose result depends on the caller (the signed-in user, a locale)
/// returns one caller's value to every other caller. Name the context entries
/// that matter with [`CacheExtension::with_context_keys`] to key on them too.
#[derive(Debug, Default)]
pub struct CacheExtension {
    handler: CacheHandler,
    context_keys: Vec<String>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache into an existing handler, typically one shared across fields.
    ///
    /// # Arguments
    ///
    /// * `handler` - Store the entries are written to and read from.
    pub fn with_handler(handler: CacheHandler) -> Self {
        Self {
            handler,
            ..Self::default()
        }
    }

    /// Add context entries to the cache key.
    ///
    /// # Arguments
    ///
    /// * `keys` - Top-level context keys whose values separate cache entries.
    ///   A key missing from the context counts as `null`.
    pub fn with_context_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn context_keys(&self) -> &[String] {
        &self.context_keys
    }

    pub fn handler(&self) -> &CacheHandler {
        &self.handler
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn coordinate(info: &Info) -> String {
        format!("{}.{}", info.parent_type, info.field_name)
    }

    fn input_key(&self, source: &Value, info: &Info, args: &Arguments) -> Option<String> {
        let key = if self.context_keys.is_empty() {
            json!({ "source": source, "args": args })
        } else {
            let context: serde_json::Map<String, Value> = self
                .context_keys
                .iter()
                .map(|key| {
                    let value = info.context_value(key).cloned().unwrap_or(Value::Null);
                    (key.clone(), value)
                })
                .collect();
            json!({ "source": source, "args": args, "context": context })
        };
        serde_json::to_string(&key).ok()
    }

    fn lookup(&self, coordinate: &str, key: Option<&str>) -> Option<Value> {
        let cached = key.and_then(|key| self.handler.read(coordinate, key));
        match cached {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                log::trace!("Cache hit for {coordinate}");
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    fn store(&self, coordinate: &str, key: Option<String>, result: &ResolveResult) {
        if let (Some(key), Ok(value)) = (key, result) {
            self.handler.add(coordinate, &key, value.clone());
        }
    }
}

impl SyncCapable for CacheExtension {
    fn resolve(
        &self,
        next: &SyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult {
        let coordinate = Self::coordinate(info);
        let key = self.input_key(source, info, &args);
        if let Some(value) = self.lookup(&coordinate, key.as_deref()) {
            return Ok(value);
        }
        let result = next.call(source, info, args);
        self.store(&coordinate, key, &result);
        result
    }
}

#[async_trait]
impl AsyncCapable for CacheExtension {
    async fn resolve_async(
        &self,
        next: &AsyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult {
        let coordinate = Self::coordinate(info);
        let key = self.input_key(source, info, &args);
        if let Some(value) = self.lookup(&coordinate, key.as_deref()) {
            return Ok(value);
        }
        let result = next.call(source, info, args).await;
        self.store(&coordinate, key, &result);
        result
    }
}

crate::field_extension!(CacheExtension: sync, async);
