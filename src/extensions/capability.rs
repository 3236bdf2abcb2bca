//! Capability detection for field extensions.
//!
//! Capability is a pure function of an extension's implementation type, so
//! it is computed on first query and memoized per `TypeId` for the life of
//! the process. Two threads racing on the first query compute the same
//! answer, so the table needs no coordination beyond the map's own sharding.

use std::any::TypeId;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::field_extension::FieldExtension;
use crate::types::ExecutionMode;

static CAPABILITIES: Lazy<DashMap<TypeId, Capability>> = Lazy::new(DashMap::new);

/// Which resolution behaviors an extension type provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    pub supports_sync: bool,
    pub supports_async: bool,
}

impl Capability {
    /// Whether an extension with this capability can run in `mode`.
    pub fn supports(self, mode: ExecutionMode) -> bool {
        match mode {
            ExecutionMode::Sync => self.supports_sync,
            ExecutionMode::Async => self.supports_async,
        }
    }

    fn compute(extension: &dyn FieldExtension) -> Self {
        Self {
            supports_sync: extension.sync_behavior().is_some(),
            supports_async: extension.async_behavior().is_some(),
        }
    }
}

/// Return the capability of `extension`'s implementation type, computing
/// and caching it on first use.
pub fn detect(extension: &dyn FieldExtension) -> Capability {
    let key = extension.implementation_type();
    if let Some(cached) = CAPABILITIES.get(&key) {
        return *cached;
    }
    let computed = Capability::compute(extension);
    *CAPABILITIES.entry(key).or_insert(computed)
}

/// Whether the capability of `extension`'s type is already memoized.
pub fn is_cached(extension: &dyn FieldExtension) -> bool {
    CAPABILITIES.contains_key(&extension.implementation_type())
}
