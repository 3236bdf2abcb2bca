//! Validated, immutable fields ready for request-time resolution.

use std::fmt;

use super::{Field, FieldArgument};
use crate::extensions::{check_compatibility, CompiledChain, Extension};
use crate::types::{Arguments, ExecutionMode, Info, ResolveResult, Value};
use crate::utilities::errors::{CompatibilityError, ResolveError};

/// A field that passed the compatibility check and carries its compiled
/// resolution chain. Safe to share across threads and invoke concurrently.
pub struct ActiveField {
    name: String,
    graphql_name: String,
    description: Option<String>,
    type_name: Option<String>,
    arguments: Vec<FieldArgument>,
    directives: Vec<String>,
    extensions: Vec<Extension>,
    chain: CompiledChain,
}

impl ActiveField {
    pub(super) fn new(field: Field, chain: CompiledChain) -> Self {
        let graphql_name = field.graphql_name.unwrap_or_else(|| field.name.clone());
        Self {
            name: field.name,
            graphql_name,
            description: field.description,
            type_name: field.type_name,
            arguments: field.arguments,
            directives: field.directives,
            extensions: field.extensions,
            chain,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graphql_name(&self) -> &str {
        &self.graphql_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn arguments(&self) -> &[FieldArgument] {
        &self.arguments
    }

    pub fn directives(&self) -> &[String] {
        &self.directives
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn mode(&self) -> ExecutionMode {
        self.chain.mode()
    }

    pub fn is_async(&self) -> bool {
        self.mode().is_async()
    }

    /// Re-run the compatibility check. Always `Ok` for an active field.
    pub fn check_compatibility(&self) -> Result<(), CompatibilityError> {
        check_compatibility(&self.name, self.mode(), &self.extensions)
    }

    /// Build the `Info` for one invocation of this field on `parent_type`.
    pub fn info(&self, parent_type: impl Into<String>) -> Info {
        let info = Info::new(parent_type, self.graphql_name.clone());
        match &self.type_name {
            Some(type_name) => info.with_return_type(type_name.clone()),
            None => info,
        }
    }

    /// Resolve through the synchronous chain.
    ///
    /// Fails with [`ResolveError::AsyncFieldInSyncContext`] on an async field.
    pub fn resolve(&self, source: &Value, info: &Info, args: Arguments) -> ResolveResult {
        match &self.chain {
            CompiledChain::Sync(next) => next.call(source, info, args),
            CompiledChain::Async(_) => Err(ResolveError::AsyncFieldInSyncContext {
                field: self.name.clone(),
            }),
        }
    }

    /// Resolve through whichever chain the field was compiled with. A sync
    /// field runs inline without suspending.
    pub async fn resolve_async(&self, source: &Value, info: &Info, args: Arguments) -> ResolveResult {
        match &self.chain {
            CompiledChain::Sync(next) => next.call(source, info, args),
            CompiledChain::Async(next) => next.call(source, info, args).await,
        }
    }
}

impl fmt::Debug for ActiveField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveField")
            .field("name", &self.name)
            .field("graphql_name", &self.graphql_name)
            .field("mode", &self.mode())
            .field("arguments", &self.arguments)
            .field("extensions", &self.extensions)
            .finish()
    }
}
