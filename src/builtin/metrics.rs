//! Invocation metrics for a single field.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;

use crate::extensions::{AsyncCapable, AsyncNext, SyncCapable, SyncNext};
use crate::types::{Arguments, Info, ResolveResult, Value};

/// Point-in-time copy of a [`MetricsExtension`]'s counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FieldMetrics {
    pub invocations: u64,
    pub failures: u64,
    pub total_duration_us: u64,
}

impl FieldMetrics {
    /// Mean duration per invocation in microseconds.
    pub fn average_duration_us(&self) -> Option<u64> {
        self.total_duration_us.checked_div(self.invocations)
    }
}

/// Counts invocations and failures of the wrapped chain and accumulates
/// the time spent in it.
///
/// Keep an `Arc` to the extension (see [`Extension::from_arc`]) to read
/// [`snapshot`](Self::snapshot) after the field is active.
///
/// [`Extension::from_arc`]: crate::extensions::Extension::from_arc
#[derive(Debug, Default)]
pub struct MetricsExtension {
    invocations: AtomicU64,
    failures: AtomicU64,
    total_nanos: AtomicU64,
}

impl MetricsExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> FieldMetrics {
        FieldMetrics {
            invocations: self.invocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            total_duration_us: self.total_nanos.load(Ordering::Relaxed) / 1_000,
        }
    }

    pub fn reset(&self) {
        self.invocations.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.total_nanos.store(0, Ordering::Relaxed);
    }

    fn record(&self, elapsed: Duration, result: &ResolveResult) {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        if result.is_err() {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
    }
}

impl SyncCapable for MetricsExtension {
    fn resolve(
        &self,
        next: &SyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult {
        let started = Instant::now();
        let result = next.call(source, info, args);
        self.record(started.elapsed(), &result);
        result
    }
}

#[async_trait]
impl AsyncCapable for MetricsExtension {
    async fn resolve_async(
        &self,
        next: &AsyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult {
        let started = Instant::now();
        let result = next.call(source, info, args).await;
        self.record(started.elapsed(), &result);
        result
    }
}

crate::field_extension!(MetricsExtension: sync, async);
