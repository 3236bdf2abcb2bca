//! Field descriptors.
//!
//! A [`Field`] is the mutable, unvalidated description of a field: it owns a
//! resolver and an ordered list of extensions. [`Field::finalize`] consumes it,
//! runs every extension's build hook once, checks compatibility and compiles
//! the resolution chain, yielding an immutable [`ActiveField`]. There is no way
//! back from an `ActiveField` to a `Field`.

pub mod active;
pub mod resolver;

use serde::{Deserialize, Serialize};

pub use active::ActiveField;
pub use resolver::Resolver;

use crate::extensions::chain::{compose_async, compose_sync, AsyncNext, CompiledChain, SyncNext};
use crate::extensions::{check_compatibility, Extension, FieldExtension};
use crate::types::{ExecutionMode, Value};
use crate::utilities::config::SchemaConfig;
use crate::utilities::errors::{CompatibilityError, FieldError};
use crate::utilities::string_utils::to_camel_case;

/// Upper bound on `apply` calls while one field is finalized, counting
/// extensions attached by other extensions' `apply` hooks.
pub const MAX_APPLY_CALLS: usize = 256;

/// An argument accepted by a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldArgument {
    pub name: String,
    /// GraphQL type reference, e.g. `String!` or `[ID!]`.
    pub type_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Fields of a synthesized input object type, when `type_ref` names one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_fields: Vec<FieldArgument>,
}

impl FieldArgument {
    /// Declare an argument.
    ///
    /// # Arguments
    ///
    /// * `name` - Argument name as clients send it.
    /// * `type_ref` - GraphQL type reference, e.g. `String!`.
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            description: None,
            default_value: None,
            input_fields: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Value used when the client omits the argument.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// A field under construction.
#[derive(Debug, Clone, Default)]
pub struct Field {
    /// Source-level name; also the key the default resolver reads.
    pub name: String,
    /// Explicit GraphQL name. Derived from `name` when absent.
    pub graphql_name: Option<String>,
    pub description: Option<String>,
    /// Declared return type, e.g. `User!`.
    pub type_name: Option<String>,
    pub arguments: Vec<FieldArgument>,
    pub directives: Vec<String>,
    pub resolver: Resolver,
    /// Extensions in declaration order; the first one wraps all others.
    pub extensions: Vec<Extension>,
}

impl Field {
    /// Start a field definition with the default resolver and no extensions.
    ///
    /// # Arguments
    ///
    /// * `name` - Rust-side name. The default resolver reads `source[name]`, and
    ///   the GraphQL name is derived from it unless overridden.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Override the derived GraphQL name.
    ///
    /// # Arguments
    ///
    /// * `name` - Exposed name, used verbatim regardless of `auto_camel_case`.
    pub fn with_graphql_name(mut self, name: impl Into<String>) -> Self {
        self.graphql_name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Declare an argument.
    ///
    /// # Arguments
    ///
    /// * `argument` - Appended after the arguments already declared.
    pub fn with_argument(mut self, argument: FieldArgument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Replace the resolver. Its mode decides which extension behavior is required.
    ///
    /// # Arguments
    ///
    /// * `resolver` - A sync or async resolver, or [`Resolver::Default`].
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Append an extension; it wraps every extension added after it.
    ///
    /// # Arguments
    ///
    /// * `extension` - Any [`FieldExtension`], erased into an [`Extension`] handle.
    pub fn with_extension<E: FieldExtension>(mut self, extension: E) -> Self {
        self.extensions.push(Extension::new(extension));
        self
    }

    /// Append an already type-erased extension.
    ///
    /// # Arguments
    ///
    /// * `extension` - A handle that may also be attached to other fields.
    ///   Attaching the same handle twice to one field runs its `apply` once.
    pub fn with_shared_extension(mut self, extension: Extension) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn mode(&self) -> ExecutionMode {
        self.resolver.mode()
    }

    pub fn is_async(&self) -> bool {
        self.resolver.is_async()
    }

    /// The GraphQL name this field is exposed under.
    pub fn resolved_graphql_name(&self, config: &SchemaConfig) -> String {
        match &self.graphql_name {
            Some(name) => name.clone(),
            None if config.auto_camel_case => to_camel_case(&self.name),
            None => self.name.clone(),
        }
    }

    /// Check the attached extensions against the resolver's mode.
    pub fn check_compatibility(&self) -> Result<(), CompatibilityError> {
        check_compatibility(&self.name, self.mode(), &self.extensions)
    }

    /// Finalize the field: pin its GraphQL name, run each extension's
    /// `apply` once in declaration order, validate, and compile the chain.
    ///
    /// Every `apply` sees the field as it currently is, including its full
    /// extension list. Extensions an `apply` attaches are applied in turn;
    /// extensions it removes are never applied nor composed. Each extension
    /// handle is applied at most once, and finalizing fails with
    /// [`FieldError::ApplyLimitExceeded`] after [`MAX_APPLY_CALLS`] calls.
    ///
    /// # Arguments
    /// * `config` - Schema options used for naming and the default resolver.
    pub fn finalize(mut self, config: &SchemaConfig) -> Result<ActiveField, FieldError> {
        self.graphql_name = Some(self.resolved_graphql_name(config));

        let mut applied: Vec<Extension> = Vec::with_capacity(self.extensions.len());
        while let Some(extension) = self.next_unapplied(&applied) {
            if applied.len() == MAX_APPLY_CALLS {
                log::warn!(
                    "Field {} exceeded {} extension apply calls",
                    self.name,
                    MAX_APPLY_CALLS
                );
                return Err(FieldError::ApplyLimitExceeded {
                    field_name: self.name,
                    limit: MAX_APPLY_CALLS,
                });
            }
            log::debug!(
                "Applying field extension {} to field {}",
                extension.name(),
                self.name
            );
            extension.apply(&mut self);
            applied.push(extension);
        }

        self.check_compatibility()?;

        let chain = self.compile(config);
        log::debug!(
            "Compiled {} resolution chain for field {} with {} extension(s)",
            chain.mode(),
            self.name,
            self.extensions.len()
        );
        Ok(ActiveField::new(self, chain))
    }

    /// First attached extension whose `apply` has not run yet. `applied`
    /// keeps every applied handle alive, so identity comparison stays sound.
    fn next_unapplied(&self, applied: &[Extension]) -> Option<Extension> {
        self.extensions
            .iter()
            .find(|extension| !applied.iter().any(|done| done.same_as(extension)))
            .cloned()
    }

    fn compile(&self, config: &SchemaConfig) -> CompiledChain {
        match &self.resolver {
            Resolver::Default => {
                let terminal = SyncNext::from_resolver(resolver::default_resolver(
                    self.name.clone(),
                    config.strict_default_resolver,
                ));
                CompiledChain::Sync(compose_sync(terminal, &self.extensions))
            }
            Resolver::Sync(f) => {
                let terminal = SyncNext::from_resolver(f.clone());
                CompiledChain::Sync(compose_sync(terminal, &self.extensions))
            }
            Resolver::Async(f) => {
                let terminal = AsyncNext::from_resolver(f.clone());
                CompiledChain::Async(compose_async(terminal, &self.extensions))
            }
        }
    }
}
