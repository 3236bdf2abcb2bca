//! Resolution chain composition.
//!
//! A field's extensions are folded right-to-left, once, into linked nodes:
//! the first declared extension is the outermost wrapper and the raw
//! resolver runs last. Each node only holds `Arc`s to immutable data, so a
//! compiled chain can be invoked from any number of tasks at once.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use super::field_extension::Extension;
use crate::field::resolver::{AsyncResolverFn, SyncResolverFn};
use crate::types::{Arguments, ExecutionMode, Info, ResolveResult, Value};

trait SyncLink: Send + Sync {
    fn call(&self, source: &Value, info: &Info, args: Arguments) -> ResolveResult;
}

trait AsyncLink: Send + Sync {
    fn call<'a>(
        &'a self,
        source: &'a Value,
        info: &'a Info,
        args: Arguments,
    ) -> BoxFuture<'a, ResolveResult>;
}

/// Continuation handed to a synchronous extension: the rest of the chain.
#[derive(Clone)]
pub struct SyncNext {
    link: Arc<dyn SyncLink>,
}

impl SyncNext {
    /// Terminal continuation backed by a raw resolver.
    pub fn from_resolver(resolver: SyncResolverFn) -> Self {
        Self {
            link: Arc::new(SyncResolverLink { resolver }),
        }
    }

    pub fn from_fn<F>(resolver: F) -> Self
    where
        F: Fn(&Value, &Info, Arguments) -> ResolveResult + Send + Sync + 'static,
    {
        Self::from_resolver(Arc::new(resolver))
    }

    /// Invoke the rest of the chain.
    pub fn call(&self, source: &Value, info: &Info, args: Arguments) -> ResolveResult {
        self.link.call(source, info, args)
    }
}

/// Continuation handed to an asynchronous extension: the rest of the chain.
#[derive(Clone)]
pub struct AsyncNext {
    link: Arc<dyn AsyncLink>,
}

impl AsyncNext {
    /// Terminal continuation backed by a raw async resolver.
    pub fn from_resolver(resolver: AsyncResolverFn) -> Self {
        Self {
            link: Arc::new(AsyncResolverLink { resolver }),
        }
    }

    pub fn from_fn<F, Fut>(resolver: F) -> Self
    where
        F: Fn(Value, Info, Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ResolveResult> + Send + 'static,
    {
        Self::from_resolver(Arc::new(move |source, info, args| {
            resolver(source, info, args).boxed()
        }))
    }

    /// Invoke the rest of the chain.
    pub fn call<'a>(
        &'a self,
        source: &'a Value,
        info: &'a Info,
        args: Arguments,
    ) -> BoxFuture<'a, ResolveResult> {
        self.link.call(source, info, args)
    }
}

struct SyncResolverLink {
    resolver: SyncResolverFn,
}

impl SyncLink for SyncResolverLink {
    fn call(&self, source: &Value, info: &Info, args: Arguments) -> ResolveResult {
        (self.resolver)(source, info, args)
    }
}

struct AsyncResolverLink {
    resolver: AsyncResolverFn,
}

impl AsyncLink for AsyncResolverLink {
    fn call<'a>(
        &'a self,
        source: &'a Value,
        info: &'a Info,
        args: Arguments,
    ) -> BoxFuture<'a, ResolveResult> {
        (self.resolver)(source.clone(), info.clone(), args)
    }
}

struct SyncExtensionLink {
    extension: Extension,
    next: SyncNext,
}

impl SyncLink for SyncExtensionLink {
    fn call(&self, source: &Value, info: &Info, args: Arguments) -> ResolveResult {
        self.extension.resolve_sync(&self.next, source, info, args)
    }
}

struct AsyncExtensionLink {
    extension: Extension,
    next: AsyncNext,
}

impl AsyncLink for AsyncExtensionLink {
    fn call<'a>(
        &'a self,
        source: &'a Value,
        info: &'a Info,
        args: Arguments,
    ) -> BoxFuture<'a, ResolveResult> {
        self.extension.resolve_async(&self.next, source, info, args)
    }
}

/// Wrap `terminal` in `extensions`, first extension outermost.
pub fn compose_sync(terminal: SyncNext, extensions: &[Extension]) -> SyncNext {
    extensions.iter().rev().fold(terminal, |next, extension| SyncNext {
        link: Arc::new(SyncExtensionLink {
            extension: extension.clone(),
            next,
        }),
    })
}

/// Wrap `terminal` in `extensions`, first extension outermost.
pub fn compose_async(terminal: AsyncNext, extensions: &[Extension]) -> AsyncNext {
    extensions.iter().rev().fold(terminal, |next, extension| AsyncNext {
        link: Arc::new(AsyncExtensionLink {
            extension: extension.clone(),
            next,
        }),
    })
}

/// A field's composed resolution function, fixed to one execution mode.
#[derive(Clone)]
pub enum CompiledChain {
    Sync(SyncNext),
    Async(AsyncNext),
}

impl CompiledChain {
    pub fn mode(&self) -> ExecutionMode {
        match self {
            Self::Sync(_) => ExecutionMode::Sync,
            Self::Async(_) => ExecutionMode::Async,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{AsyncCapable, SyncCapable};
    use crate::utilities::errors::ResolveError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    fn number(value: &Value) -> i64 {
        value.as_i64().unwrap_or_default()
    }

    struct Double;

    impl SyncCapable for Double {
        fn resolve(
            &self,
            next: &SyncNext,
            source: &Value,
            info: &Info,
            args: Arguments,
        ) -> ResolveResult {
            Ok(json!(number(&next.call(source, info, args)?) * 2))
        }
    }

    #[async_trait]
    impl AsyncCapable for Double {
        async fn resolve_async(
            &self,
            next: &AsyncNext,
            source: &Value,
            info: &Info,
            args: Arguments,
        ) -> ResolveResult {
            Ok(json!(number(&next.call(source, info, args).await?) * 2))
        }
    }

    crate::field_extension!(Double: sync, async);

    struct AddOne;

    impl SyncCapable for AddOne {
        fn resolve(
            &self,
            next: &SyncNext,
            source: &Value,
            info: &Info,
            args: Arguments,
        ) -> ResolveResult {
            Ok(json!(number(&next.call(source, info, args)?) + 1))
        }
    }

    #[async_trait]
    impl AsyncCapable for AddOne {
        async fn resolve_async(
            &self,
            next: &AsyncNext,
            source: &Value,
            info: &Info,
            args: Arguments,
        ) -> ResolveResult {
            tokio::task::yield_now().await;
            Ok(json!(number(&next.call(source, info, args).await?) + 1))
        }
    }

    crate::field_extension!(AddOne: sync, async);

    struct ShortCircuit;

    impl SyncCapable for ShortCircuit {
        fn resolve(&self, _: &SyncNext, _: &Value, _: &Info, _: Arguments) -> ResolveResult {
            Ok(json!("cached"))
        }
    }

    crate::field_extension!(ShortCircuit: sync);

    struct Recorder {
        label: &'static str,
        calls: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SyncCapable for Recorder {
        fn resolve(
            &self,
            next: &SyncNext,
            source: &Value,
            info: &Info,
            args: Arguments,
        ) -> ResolveResult {
            self.calls.lock().push(self.label);
            next.call(source, info, args)
        }
    }

    crate::field_extension!(Recorder: sync);

    struct Rename;

    impl SyncCapable for Rename {
        fn resolve(
            &self,
            next: &SyncNext,
            source: &Value,
            info: &Info,
            mut args: Arguments,
        ) -> ResolveResult {
            if let Some(value) = args.remove("old") {
                args.insert("new".to_string(), value);
            }
            next.call(source, info, args)
        }
    }

    crate::field_extension!(Rename: sync);

    fn ten() -> SyncNext {
        SyncNext::from_fn(|_, _, _| Ok(json!(10)))
    }

    fn info() -> Info {
        Info::new("Query", "value")
    }

    #[test]
    fn test_declaration_order_is_outside_in() {
        let chain = compose_sync(ten(), &[Extension::new(Double), Extension::new(AddOne)]);
        let value = chain.call(&Value::Null, &info(), Arguments::new()).unwrap();
        assert_eq!(value, json!(22));
    }

    #[test]
    fn test_reversed_order() {
        let chain = compose_sync(ten(), &[Extension::new(AddOne), Extension::new(Double)]);
        let value = chain.call(&Value::Null, &info(), Arguments::new()).unwrap();
        assert_eq!(value, json!(21));
    }

    #[test]
    fn test_no_extensions_calls_resolver() {
        let chain = compose_sync(ten(), &[]);
        assert_eq!(
            chain.call(&Value::Null, &info(), Arguments::new()).unwrap(),
            json!(10)
        );
    }

    #[test]
    fn test_wrappers_called_in_declared_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let extensions: Vec<Extension> = ["a", "b", "c"]
            .into_iter()
            .map(|label| {
                Extension::new(Recorder {
                    label,
                    calls: calls.clone(),
                })
            })
            .collect();
        let chain = compose_sync(ten(), &extensions);
        chain.call(&Value::Null, &info(), Arguments::new()).unwrap();
        assert_eq!(*calls.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_short_circuit_skips_resolver() {
        let resolved = Arc::new(Mutex::new(false));
        let flag = resolved.clone();
        let terminal = SyncNext::from_fn(move |_, _, _| {
            *flag.lock() = true;
            Ok(json!(10))
        });
        let chain = compose_sync(terminal, &[Extension::new(ShortCircuit)]);
        let value = chain.call(&Value::Null, &info(), Arguments::new()).unwrap();
        assert_eq!(value, json!("cached"));
        assert!(!*resolved.lock());
    }

    #[test]
    fn test_wrapper_rewrites_arguments() {
        let terminal = SyncNext::from_fn(|_, _, args| Ok(Value::Object(args)));
        let chain = compose_sync(terminal, &[Extension::new(Rename)]);
        let mut args = Arguments::new();
        args.insert("old".to_string(), json!(1));
        let value = chain.call(&Value::Null, &info(), args).unwrap();
        assert_eq!(value, json!({ "new": 1 }));
    }

    #[test]
    fn test_resolver_error_propagates_unmodified() {
        let terminal = SyncNext::from_fn(|_, _, _| Err(ResolveError::resolver("db down")));
        let chain = compose_sync(terminal, &[Extension::new(Double), Extension::new(AddOne)]);
        let err = chain.call(&Value::Null, &info(), Arguments::new()).unwrap_err();
        assert_eq!(err.to_string(), "Resolver error: db down");
    }

    #[test]
    fn test_source_and_info_reach_resolver() {
        let terminal = SyncNext::from_fn(|source, info, _| {
            Ok(json!({ "source": source.clone(), "field": info.field_name }))
        });
        let chain = compose_sync(terminal, &[Extension::new(Rename)]);
        let value = chain.call(&json!("root"), &info(), Arguments::new()).unwrap();
        assert_eq!(value, json!({ "source": "root", "field": "value" }));
    }

    #[tokio::test]
    async fn test_async_declaration_order_is_outside_in() {
        let terminal = AsyncNext::from_fn(|_, _, _| async {
            tokio::task::yield_now().await;
            Ok(json!(10))
        });
        let chain = compose_async(terminal, &[Extension::new(Double), Extension::new(AddOne)]);
        let value = chain
            .call(&Value::Null, &info(), Arguments::new())
            .await
            .unwrap();
        assert_eq!(value, json!(22));
    }

    #[tokio::test]
    async fn test_async_chain_runs_concurrently() {
        let terminal = AsyncNext::from_fn(|source, _, _| async move {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            Ok(source)
        });
        let chain = compose_async(terminal, &[Extension::new(AddOne)]);
        let info = info();
        let sources: Vec<Value> = (0..16).map(|i| json!(i)).collect();
        let futures = sources
            .iter()
            .map(|source| chain.call(source, &info, Arguments::new()));
        let results = futures::future::join_all(futures).await;
        for (i, result) in results.into_iter().enumerate() {
            assert_eq!(result.unwrap(), json!(i as i64 + 1));
        }
    }

    #[test]
    fn test_compiled_chain_mode() {
        assert_eq!(CompiledChain::Sync(ten()).mode(), ExecutionMode::Sync);
        let terminal = AsyncNext::from_fn(|_, _, _| async { Ok(Value::Null) });
        assert_eq!(CompiledChain::Async(terminal).mode(), ExecutionMode::Async);
    }
}
