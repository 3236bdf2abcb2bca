//! Raw field resolvers.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::types::{Arguments, ExecutionMode, Info, ResolveResult, Value};
use crate::utilities::errors::ResolveError;

/// Synchronous resolver function.
pub type SyncResolverFn = Arc<dyn Fn(&Value, &Info, Arguments) -> ResolveResult + Send + Sync>;

/// Asynchronous resolver function. Receives owned copies of the source and
/// info so the returned future is free of borrows.
pub type AsyncResolverFn =
    Arc<dyn Fn(Value, Info, Arguments) -> BoxFuture<'static, ResolveResult> + Send + Sync>;

/// The primitive function producing a field's value.
#[derive(Clone, Default)]
pub enum Resolver {
    /// Read the field's own name from the source object.
    #[default]
    Default,
    Sync(SyncResolverFn),
    Async(AsyncResolverFn),
}

impl Resolver {
    /// Wrap a blocking resolver.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Called with the parent value, the field info and the arguments.
    pub fn from_sync<F>(resolver: F) -> Self
    where
        F: Fn(&Value, &Info, Arguments) -> ResolveResult + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(resolver))
    }

    /// Wrap a resolver returning a future. Fields using it only accept extensions
    /// with async behavior.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Called with an owned copy of the parent value, a cloned
    ///   info and the arguments; the future must be `Send`.
    pub fn from_async<F, Fut>(resolver: F) -> Self
    where
        F: Fn(Value, Info, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolveResult> + Send + 'static,
    {
        Self::Async(Arc::new(move |source, info, args| {
            resolver(source, info, args).boxed()
        }))
    }

    /// The execution mode this resolver runs in. The default resolver is synchronous.
    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Async(_) => ExecutionMode::Async,
            Self::Default | Self::Sync(_) => ExecutionMode::Sync,
        }
    }

    pub fn is_async(&self) -> bool {
        self.mode().is_async()
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "Resolver::Default"),
            Self::Sync(_) => write!(f, "Resolver::Sync(..)"),
            Self::Async(_) => write!(f, "Resolver::Async(..)"),
        }
    }
}

/// Build the resolver used when a field declares none: it looks `key` up in
/// the source object. A missing key (or a non-object source) yields `null`,
/// or an error when `strict` is set.
pub fn default_resolver(key: String, strict: bool) -> SyncResolverFn {
    Arc::new(move |source: &Value, _info: &Info, _args: Arguments| match source.get(&key) {
        Some(value) => Ok(value.clone()),
        None if strict => Err(ResolveError::resolver(format!(
            "source has no value for field {key}"
        ))),
        None => Ok(Value::Null),
    })
}
