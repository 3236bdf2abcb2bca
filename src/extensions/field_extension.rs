//! The field extension contract.
//!
//! An extension wraps the resolution of a single field. It may mutate the
//! field once at build time ([`FieldExtension::apply`]) and provides a
//! synchronous behavior ([`SyncCapable`]), an asynchronous one
//! ([`AsyncCapable`]), or both. Which behaviors exist is declared by the
//! implementation type, not by individual instances.

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};

use super::capability::{self, Capability};
use super::chain::{AsyncNext, SyncNext};
use crate::field::Field;
use crate::types::{Arguments, ExecutionMode, Info, ResolveResult, Value};
use crate::utilities::errors::{ResolveError, UnsupportedModeError};
use crate::utilities::string_utils::short_type_name;

/// Base trait for all field extensions.
///
/// Every method has a default. An implementation that overrides neither
/// [`sync_behavior`](Self::sync_behavior) nor
/// [`async_behavior`](Self::async_behavior) can only mutate fields at build
/// time and is incompatible with every resolver. Use the
/// [`field_extension!`](crate::field_extension) macro to declare behaviors;
/// it only compiles when the type implements the named capability trait.
///
/// Both behavior accessors must answer the same way for every instance of a
/// type: capability detection caches the answer per type.
pub trait FieldExtension: Send + Sync + 'static {
    /// Short type name used in diagnostics.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Build-time mutation hook, invoked exactly once while the field is finalized.
    fn apply(&self, _field: &mut Field) {}

    /// The synchronous resolution behavior, if this type provides one.
    fn sync_behavior(&self) -> Option<&dyn SyncCapable> {
        None
    }

    /// The asynchronous resolution behavior, if this type provides one.
    fn async_behavior(&self) -> Option<&dyn AsyncCapable> {
        None
    }

    #[doc(hidden)]
    fn implementation_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }
}

/// Marker trait for extensions that can wrap synchronous resolvers.
pub trait SyncCapable: FieldExtension {
    /// Resolve the field, delegating to `next` for the rest of the chain.
    ///
    /// The implementation may rewrite `args` before delegating, rewrite the
    /// value `next` returns, or return without calling `next` at all.
    fn resolve(&self, next: &SyncNext, source: &Value, info: &Info, args: Arguments)
        -> ResolveResult;
}

/// Marker trait for extensions that can wrap asynchronous resolvers.
#[async_trait]
pub trait AsyncCapable: FieldExtension {
    /// Asynchronous counterpart of [`SyncCapable::resolve`]. May await other
    /// work before or after awaiting `next`.
    async fn resolve_async(
        &self,
        next: &AsyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult;
}

/// Implement [`FieldExtension`] for a type, declaring which capability
/// traits it provides.
///
/// ```ignore
/// field_extension!(Logger: sync);
/// field_extension!(Cache: sync, async);
/// field_extension!(Tagger: sync, async {
///     fn apply(&self, field: &mut Field) {
///         field.directives.push("tagged".to_string());
///     }
/// });
/// ```
#[macro_export]
macro_rules! field_extension {
    (@behavior sync) => {
        fn sync_behavior(
            &self,
        ) -> ::std::option::Option<&dyn $crate::extensions::SyncCapable> {
            ::std::option::Option::Some(self)
        }
    };
    (@behavior async) => {
        fn async_behavior(
            &self,
        ) -> ::std::option::Option<&dyn $crate::extensions::AsyncCapable> {
            ::std::option::Option::Some(self)
        }
    };
    ($ty:ty : $($capability:ident),+ $({ $($body:tt)* })?) => {
        impl $crate::extensions::FieldExtension for $ty {
            $( $crate::field_extension!(@behavior $capability); )+
            $( $($body)* )?
        }
    };
    ($ty:ty $({ $($body:tt)* })?) => {
        impl $crate::extensions::FieldExtension for $ty {
            $( $($body)* )?
        }
    };
}

/// A type-erased, cheaply cloneable extension attached to a field.
#[derive(Clone)]
pub struct Extension {
    inner: Arc<dyn FieldExtension>,
}

impl Extension {
    /// Erase a concrete extension into a shareable handle.
    ///
    /// # Arguments
    /// * `extension` - Any [`FieldExtension`] implementation.
    pub fn new<E: FieldExtension>(extension: E) -> Self {
        Self {
            inner: Arc::new(extension),
        }
    }

    /// Wrap an extension the caller keeps a handle to (e.g. to read metrics).
    ///
    /// # Arguments
    /// * `extension` - Shared extension; clones of the returned handle and
    ///   the caller's `Arc` refer to the same instance.
    pub fn from_arc(extension: Arc<dyn FieldExtension>) -> Self {
        Self { inner: extension }
    }

    /// Short type name of the wrapped implementation.
    pub fn name(&self) -> &'static str {
        self.inner.name()
    }

    /// Whether both handles wrap the same extension instance.
    pub fn same_as(&self, other: &Extension) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Capability of the underlying implementation type.
    pub fn capability(&self) -> Capability {
        capability::detect(self.inner.as_ref())
    }

    pub fn supports_sync(&self) -> bool {
        self.capability().supports_sync
    }

    pub fn supports_async(&self) -> bool {
        self.capability().supports_async
    }

    pub(crate) fn apply(&self, field: &mut Field) {
        self.inner.apply(field);
    }

    /// Run the synchronous behavior, or fail if the type has none.
    pub fn resolve_sync(
        &self,
        next: &SyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult {
        match self.inner.sync_behavior() {
            Some(behavior) => behavior.resolve(next, source, info, args),
            None => Err(self.unsupported(ExecutionMode::Sync).into()),
        }
    }

    /// Run the asynchronous behavior, or fail if the type has none.
    pub fn resolve_async<'a>(
        &'a self,
        next: &'a AsyncNext,
        source: &'a Value,
        info: &'a Info,
        args: Arguments,
    ) -> BoxFuture<'a, ResolveResult> {
        match self.inner.async_behavior() {
            Some(behavior) => behavior.resolve_async(next, source, info, args),
            None => {
                let err: ResolveError = self.unsupported(ExecutionMode::Async).into();
                future::ready(Err(err)).boxed()
            }
        }
    }

    fn unsupported(&self, mode: ExecutionMode) -> UnsupportedModeError {
        UnsupportedModeError {
            extension: self.name().to_string(),
            mode,
        }
    }
}

impl fmt::Debug for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extension")
            .field("name", &self.name())
            .field("capability", &self.capability())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Logger;

    impl SyncCapable for Logger {
        fn resolve(
            &self,
            next: &SyncNext,
            source: &Value,
            info: &Info,
            args: Arguments,
        ) -> ResolveResult {
            next.call(source, info, args)
        }
    }

    crate::field_extension!(Logger: sync);

    struct Remote;

    #[async_trait]
    impl AsyncCapable for Remote {
        async fn resolve_async(
            &self,
            next: &AsyncNext,
            source: &Value,
            info: &Info,
            args: Arguments,
        ) -> ResolveResult {
            let value = next.call(source, info, args).await?;
            Ok(json!({ "remote": value }))
        }
    }

    crate::field_extension!(Remote: async);

    struct BuildOnly;

    crate::field_extension!(BuildOnly {
        fn apply(&self, field: &mut Field) {
            field.directives.push("buildOnly".to_string());
        }
    });

    fn sync_terminal() -> SyncNext {
        SyncNext::from_fn(|_, _, _| Ok(json!(1)))
    }

    fn async_terminal() -> AsyncNext {
        AsyncNext::from_fn(|_, _, _| async { Ok(json!(2)) })
    }

    #[test]
    fn test_name_is_short_type_name() {
        assert_eq!(Extension::new(Logger).name(), "Logger");
        assert_eq!(Extension::new(Remote).name(), "Remote");
    }

    #[test]
    fn test_declared_capabilities() {
        let logger = Extension::new(Logger);
        assert!(logger.supports_sync());
        assert!(!logger.supports_async());

        let remote = Extension::new(Remote);
        assert!(!remote.supports_sync());
        assert!(remote.supports_async());

        let build_only = Extension::new(BuildOnly);
        assert!(!build_only.supports_sync());
        assert!(!build_only.supports_async());
    }

    #[test]
    fn test_apply_hook_mutates_field() {
        let mut field = Field::new("user");
        Extension::new(BuildOnly).apply(&mut field);
        assert_eq!(field.directives, vec!["buildOnly".to_string()]);
    }

    #[test]
    fn test_sync_default_is_unsupported() {
        let info = Info::new("Query", "user");
        let err = Extension::new(Remote)
            .resolve_sync(&sync_terminal(), &Value::Null, &info, Arguments::new())
            .unwrap_err();
        match err {
            ResolveError::UnsupportedMode(inner) => {
                assert_eq!(inner.extension, "Remote");
                assert_eq!(inner.mode, ExecutionMode::Sync);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_async_default_is_unsupported() {
        let info = Info::new("Query", "user");
        let next = async_terminal();
        let extension = Extension::new(Logger);
        let err = extension
            .resolve_async(&next, &Value::Null, &info, Arguments::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResolveError::UnsupportedMode(UnsupportedModeError { mode: ExecutionMode::Async, .. })
        ));
    }

    #[tokio::test]
    async fn test_async_behavior_wraps_next() {
        let info = Info::new("Query", "user");
        let next = async_terminal();
        let extension = Extension::new(Remote);
        let value = extension
            .resolve_async(&next, &Value::Null, &info, Arguments::new())
            .await
            .unwrap();
        assert_eq!(value, json!({ "remote": 2 }));
    }

    #[test]
    fn test_from_arc_keeps_shared_handle() {
        let shared: Arc<Logger> = Arc::new(Logger);
        let extension = Extension::from_arc(shared.clone());
        assert_eq!(Arc::strong_count(&shared), 2);
        assert_eq!(extension.name(), "Logger");
    }

    #[test]
    fn test_same_as_tracks_instance_identity() {
        let logger = Extension::new(Logger);
        assert!(logger.same_as(&logger.clone()));
        assert!(!logger.same_as(&Extension::new(Logger)));
    }

    #[test]
    fn test_debug_output() {
        let debug = format!("{:?}", Extension::new(Logger));
        assert!(debug.contains("Logger"));
        assert!(debug.contains("supports_sync: true"));
    }
}
