//! Per-invocation resolution info.

use std::sync::Arc;

use super::{Arguments, Value};

/// Information about the field currently being resolved.
///
/// Every invocation gets its own `Info`; the request context and variables
/// are shared behind `Arc` so cloning is cheap.
#[derive(Debug, Clone)]
pub struct Info {
    /// GraphQL name of the field being resolved.
    pub field_name: String,
    /// Name of the type owning the field.
    pub parent_type: String,
    /// Declared return type, if known.
    pub return_type: Option<String>,
    /// Response path from the operation root to this field.
    pub path: Vec<String>,
    /// Request-scoped context (e.g. the authenticated user).
    pub context: Arc<Value>,
    /// Operation variables.
    pub variables: Arc<Arguments>,
}

impl Info {
    /// Info with an empty context, no variables and a one-segment path.
    ///
    /// # Arguments
    ///
    /// * `parent_type` - Type that owns the field.
    /// * `field_name` - GraphQL name of the field.
    pub fn new(parent_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        let field_name = field_name.into();
        Self {
            path: vec![field_name.clone()],
            field_name,
            parent_type: parent_type.into(),
            return_type: None,
            context: Arc::new(Value::Null),
            variables: Arc::new(Arguments::new()),
        }
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Arc::new(context);
        self
    }

    /// Share one request context between many infos without copying it.
    pub fn with_shared_context(mut self, context: Arc<Value>) -> Self {
        self.context = context;
        self
    }

    pub fn with_variables(mut self, variables: Arguments) -> Self {
        self.variables = Arc::new(variables);
        self
    }

    pub fn with_return_type(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    pub fn with_path(mut self, path: Vec<String>) -> Self {
        self.path = path;
        self
    }

    /// Look up a top-level key in the request context.
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}
