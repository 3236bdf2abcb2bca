//! Collapse a mutation's arguments into a single input object.

use async_trait::async_trait;

use crate::extensions::{AsyncCapable, AsyncNext, SyncCapable, SyncNext};
use crate::field::{Field, FieldArgument};
use crate::types::{Arguments, Info, ResolveResult, Value};
use crate::utilities::errors::ResolveError;
use crate::utilities::string_utils::capitalize_first;

/// Replaces a field's arguments with one `input: <Name>Input!` argument.
///
/// The original arguments become the fields of the synthesized input type.
/// At request time the `input` object is unpacked again so the resolver
/// receives the original arguments unchanged.
#[derive(Debug, Clone)]
pub struct InputMutationExtension {
    argument_name: String,
}

impl Default for InputMutationExtension {
    fn default() -> Self {
        Self {
            argument_name: "input".to_string(),
        }
    }
}

impl InputMutationExtension {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Arguments
    ///
    /// * `name` - Name of the single argument that replaces the field's own (default `input`).
    pub fn with_argument_name(mut self, name: impl Into<String>) -> Self {
        self.argument_name = name.into();
        self
    }

    pub fn argument_name(&self) -> &str {
        &self.argument_name
    }

    fn input_type_name(field: &Field) -> String {
        let base = field.graphql_name.as_deref().unwrap_or(&field.name);
        format!("{}Input", capitalize_first(base))
    }

    fn unpack(&self, mut args: Arguments) -> Result<Arguments, ResolveError> {
        match args.remove(&self.argument_name) {
            Some(Value::Object(input)) => Ok(input),
            Some(other) => Err(ResolveError::invalid_input(format!(
                "argument {} must be an object, got {}",
                self.argument_name,
                json_kind(&other)
            ))),
            None => Err(ResolveError::invalid_input(format!(
                "missing required argument {}",
                self.argument_name
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

impl SyncCapable for InputMutationExtension {
    fn resolve(
        &self,
        next: &SyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult {
        next.call(source, info, self.unpack(args)?)
    }
}

#[async_trait]
impl AsyncCapable for InputMutationExtension {
    async fn resolve_async(
        &self,
        next: &AsyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult {
        let args = self.unpack(args)?;
        next.call(source, info, args).await
    }
}

crate::field_extension!(InputMutationExtension: sync, async {
    fn apply(&self, field: &mut Field) {
        let type_name = Self::input_type_name(field);
        let mut input = FieldArgument::new(self.argument_name.clone(), format!("{type_name}!"));
        input.input_fields = std::mem::take(&mut field.arguments);
        log::debug!(
            "Field {} now takes {}: {}",
            field.name,
            input.name,
            input.type_ref
        );
        field.arguments.push(input);
    }
});
