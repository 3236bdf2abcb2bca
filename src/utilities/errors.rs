//! Error types for field extensions and resolution.
//!
//! Build-time errors (`CompatibilityError`, `SchemaError`) abort schema
//! construction. Request-time errors (`ResolveError`) are handed back to the
//! execution engine.

use thiserror::Error;

use crate::types::ExecutionMode;

/// Raised when one or more extensions attached to a field lack the
/// capability required by the field's execution mode.
///
/// Carries every offending extension, never just the first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Cannot add {kind}-only extension(s) {names} to the {mode} resolver of Field {field_name}. \
     Please implement {required} for the extension.",
    kind = .mode.opposite(),
    names = .extensions.join(","),
    required = .mode.required_trait()
)]
pub struct CompatibilityError {
    /// Name of the field that failed validation.
    pub field_name: String,
    /// Execution mode of the field's resolver.
    pub mode: ExecutionMode,
    /// Short type names of all incompatible extensions, in declaration order.
    pub extensions: Vec<String>,
}

/// Raised when an extension's resolution behavior for `mode` is invoked but
/// the extension never declared one. Unreachable once a field has passed the
/// compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{mode} resolve is not supported for field extension {extension}")]
pub struct UnsupportedModeError {
    pub extension: String,
    pub mode: ExecutionMode,
}

/// Request-time resolution failures.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// An extension was asked for a behavior it does not provide.
    #[error(transparent)]
    UnsupportedMode(#[from] UnsupportedModeError),

    /// The synchronous entry point was used on an async field.
    #[error("Field {field} has an async resolver and cannot be resolved synchronously")]
    AsyncFieldInSyncContext { field: String },

    /// No field with this name exists on the type.
    #[error("Unknown field {field} on type {parent_type}")]
    UnknownField { parent_type: String, field: String },

    /// A permission check rejected the request.
    #[error("{message}")]
    PermissionDenied { message: String },

    /// Arguments did not have the expected shape.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The resolver itself reported a failure.
    #[error("Resolver error: {message}")]
    Resolver { message: String },

    /// Any other error raised by user code.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResolveError {
    /// Convenience constructor for resolver failures.
    pub fn resolver(message: impl Into<String>) -> Self {
        Self::Resolver {
            message: message.into(),
        }
    }

    /// Convenience constructor for malformed arguments.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Raised when a single field cannot be finalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Attached extensions do not support the resolver's execution mode.
    #[error(transparent)]
    Incompatible(#[from] CompatibilityError),

    /// Apply hooks kept attaching extensions past the per-field limit.
    #[error(
        "Field {field_name} still had unapplied extensions after {limit} apply calls; \
         an apply hook keeps attaching new extensions"
    )]
    ApplyLimitExceeded { field_name: String, limit: usize },
}

impl FieldError {
    /// Name of the field that failed.
    pub fn field_name(&self) -> &str {
        match self {
            Self::Incompatible(err) => &err.field_name,
            Self::ApplyLimitExceeded { field_name, .. } => field_name,
        }
    }

    pub fn as_compatibility(&self) -> Option<&CompatibilityError> {
        match self {
            Self::Incompatible(err) => Some(err),
            Self::ApplyLimitExceeded { .. } => None,
        }
    }
}

/// Two fields with the same GraphQL name were registered on one type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Field {field} is defined more than once on type {parent_type}")]
pub struct DuplicateFieldError {
    pub parent_type: String,
    pub field: String,
}

/// Everything that went wrong while assembling a schema.
///
/// Every field is examined before the build fails, so both lists are
/// complete; at least one of them is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Schema build failed: {}", describe_schema_errors(.errors, .duplicates))]
pub struct SchemaError {
    /// Fields that could not be finalized, in registration order.
    pub errors: Vec<FieldError>,
    /// Repeated `(type, name)` registrations, in registration order.
    pub duplicates: Vec<DuplicateFieldError>,
}

impl SchemaError {
    /// Compatibility failures only, skipping other finalize errors.
    pub fn compatibility_errors(&self) -> impl Iterator<Item = &CompatibilityError> {
        self.errors.iter().filter_map(FieldError::as_compatibility)
    }
}

fn describe_schema_errors(errors: &[FieldError], duplicates: &[DuplicateFieldError]) -> String {
    let mut parts = Vec::new();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        parts.push(format!(
            "{} field(s) failed to finalize: {}",
            errors.len(),
            details.join("; ")
        ));
    }
    parts.extend(duplicates.iter().map(|d| d.to_string()));
    parts.join("; ")
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
