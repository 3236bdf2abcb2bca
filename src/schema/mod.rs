//! Schema assembly.
//!
//! Collects fields per parent type, finalizes all of them, and fails once with
//! every field error and duplicate name found across the whole schema.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::field::{ActiveField, Field};
use crate::types::{Arguments, Info, ResolveResult, Value};
use crate::utilities::config::SchemaConfig;
use crate::utilities::errors::{DuplicateFieldError, ResolveError, SchemaError};

/// Accumulates fields before the schema is built.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    config: SchemaConfig,
    fields: Vec<(String, Field)>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    ///
    /// # Arguments
    ///
    /// * `config` - Naming and default-resolver settings applied to every field.
    pub fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            fields: Vec::new(),
        }
    }

    /// Register `field` on `parent_type`.
    ///
    /// # Arguments
    ///
    /// * `parent_type` - Name of the object type that owns the field.
    /// * `field` - The unfinalized field definition.
    pub fn field(mut self, parent_type: impl Into<String>, field: Field) -> Self {
        self.fields.push((parent_type.into(), field));
        self
    }

    /// Register `field` on `parent_type` without consuming the builder.
    pub fn add_field(&mut self, parent_type: impl Into<String>, field: Field) {
        self.fields.push((parent_type.into(), field));
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Finalize every field.
    ///
    /// Every field is finalized even after one fails, and a duplicate
    /// `(type, name)` pair does not stop the loop. The returned error lists
    /// every failed field and every duplicate together.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut types: HashMap<String, HashMap<String, Arc<ActiveField>>> = HashMap::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut errors = Vec::new();
        let mut duplicates = Vec::new();

        for (parent_type, field) in self.fields {
            let name = field.resolved_graphql_name(&self.config);
            let first = seen.insert((parent_type.clone(), name.clone()));
            if !first {
                duplicates.push(DuplicateFieldError {
                    parent_type: parent_type.clone(),
                    field: name,
                });
            }
            match field.finalize(&self.config) {
                Ok(active) if first => {
                    types
                        .entry(parent_type)
                        .or_default()
                        .insert(active.graphql_name().to_string(), Arc::new(active));
                }
                Ok(_) => {}
                Err(err) => errors.push(err),
            }
        }

        if !errors.is_empty() || !duplicates.is_empty() {
            log::warn!(
                "Schema build failed: {} field error(s), {} duplicate(s)",
                errors.len(),
                duplicates.len()
            );
            return Err(SchemaError { errors, duplicates });
        }

        log::debug!(
            "Schema built with {} field(s) across {} type(s)",
            types.values().map(HashMap::len).sum::<usize>(),
            types.len()
        );
        Ok(Schema {
            config: self.config,
            types,
        })
    }
}

/// A built schema: every field is active and safe to resolve concurrently.
#[derive(Debug)]
pub struct Schema {
    config: SchemaConfig,
    types: HashMap<String, HashMap<String, Arc<ActiveField>>>,
}

impl Schema {
    pub fn builder(config: SchemaConfig) -> SchemaBuilder {
        SchemaBuilder::new(config)
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Look up a field by its GraphQL name.
    pub fn field(&self, parent_type: &str, name: &str) -> Option<&Arc<ActiveField>> {
        self.types.get(parent_type).and_then(|fields| fields.get(name))
    }

    /// Sorted GraphQL names of the fields on `parent_type`.
    pub fn field_names(&self, parent_type: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .get(parent_type)
            .map(|fields| fields.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Sorted names of all types with at least one field.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn lookup(&self, parent_type: &str, name: &str) -> Result<&Arc<ActiveField>, ResolveError> {
        self.field(parent_type, name)
            .ok_or_else(|| ResolveError::UnknownField {
                parent_type: parent_type.to_string(),
                field: name.to_string(),
            })
    }

    /// Resolve a sync field with a fresh `Info` carrying `context`.
    ///
    /// # Arguments
    ///
    /// * `parent_type` - Type that owns the field.
    /// * `name` - GraphQL name of the field.
    /// * `source` - Parent value the field resolves against.
    /// * `args` - Field arguments.
    /// * `context` - Request context shared with every extension.
    pub fn resolve(
        &self,
        parent_type: &str,
        name: &str,
        source: &Value,
        args: Arguments,
        context: Arc<Value>,
    ) -> ResolveResult {
        let field = self.lookup(parent_type, name)?;
        let info = field.info(parent_type).with_shared_context(context);
        field.resolve(source, &info, args)
    }

    /// Resolve any field through the async entry point.
    pub async fn resolve_async(
        &self,
        parent_type: &str,
        name: &str,
        source: &Value,
        args: Arguments,
        context: Arc<Value>,
    ) -> ResolveResult {
        let field = self.lookup(parent_type, name)?;
        let info: Info = field.info(parent_type).with_shared_context(context);
        field.resolve_async(source, &info, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::{AsyncCapable, AsyncNext, SyncCapable, SyncNext};
    use crate::field::Resolver;
    use async_trait::async_trait;
    use serde_json::json;

    macro_rules! sync_only {
        ($name:ident) => {
            struct $name;

            impl SyncCapable for $name {
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

            crate::field_extension!($name: sync);
        };
    }

    sync_only!(X);
    sync_only!(Y);

    struct Upper;

    impl SyncCapable for Upper {
        fn resolve(
            &self,
            next: &SyncNext,
            source: &Value,
            info: &Info,
            args: Arguments,
        ) -> ResolveResult {
            let value = next.call(source, info, args)?;
            Ok(match value {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            })
        }
    }

    #[async_trait]
    impl AsyncCapable for Upper {
        async fn resolve_async(
            &self,
            next: &AsyncNext,
            source: &Value,
            info: &Info,
            args: Arguments,
        ) -> ResolveResult {
            let value = next.call(source, info, args).await?;
            Ok(match value {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            })
        }
    }

    crate::field_extension!(Upper: sync, async);

    fn async_resolver() -> Resolver {
        Resolver::from_async(|_, info, _| async move {
            let user = info
                .context_value("user")
                .and_then(Value::as_str)
                .unwrap_or("anonymous");
            Ok(json!(format!("hello {user}")))
        })
    }

    #[test]
    fn test_build_and_resolve() {
        let schema = Schema::builder(SchemaConfig::default())
            .field("User", Field::new("full_name").with_extension(Upper))
            .build()
            .unwrap();
        assert_eq!(schema.type_names(), vec!["User"]);
        assert_eq!(schema.field_names("User"), vec!["fullName"]);

        let value = schema
            .resolve(
                "User",
                "fullName",
                &json!({"full_name": "ada lovelace"}),
                Arguments::new(),
                Arc::new(Value::Null),
            )
            .unwrap();
        assert_eq!(value, json!("ADA LOVELACE"));
    }

    #[tokio::test]
    async fn test_resolve_async_uses_context() {
        let schema = Schema::builder(SchemaConfig::default())
            .field("Query", Field::new("greeting").with_resolver(async_resolver()).with_extension(Upper))
            .build()
            .unwrap();
        let value = schema
            .resolve_async(
                "Query",
                "greeting",
                &Value::Null,
                Arguments::new(),
                Arc::new(json!({"user": "ada"})),
            )
            .await
            .unwrap();
        assert_eq!(value, json!("HELLO ADA"));
    }

    #[test]
    fn test_two_sync_only_extensions_on_async_field() {
        let err = Schema::builder(SchemaConfig::default())
            .field(
                "Query",
                Field::new("greeting")
                    .with_resolver(async_resolver())
                    .with_extension(X)
                    .with_extension(Y),
            )
            .build()
            .unwrap_err();
        let errors: Vec<_> = err.compatibility_errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].extensions, vec!["X".to_string(), "Y".to_string()]);
        assert!(err.duplicates.is_empty());
    }

    #[test]
    fn test_errors_aggregated_across_fields() {
        let err = Schema::builder(SchemaConfig::default())
            .field("Query", Field::new("a").with_resolver(async_resolver()).with_extension(X))
            .field("Query", Field::new("ok").with_extension(X))
            .field("Query", Field::new("b").with_resolver(async_resolver()).with_extension(Y))
            .build()
            .unwrap_err();
        let names: Vec<&str> = err.errors.iter().map(|e| e.field_name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Schema::builder(SchemaConfig::default())
            .field("Query", Field::new("user_name"))
            .field("Query", Field::new("login").with_graphql_name("userName"))
            .build()
            .unwrap_err();
        assert!(err.errors.is_empty());
        assert_eq!(
            err.duplicates,
            vec![DuplicateFieldError {
                parent_type: "Query".to_string(),
                field: "userName".to_string(),
            }]
        );
    }

    #[test]
    fn test_duplicates_and_incompatible_fields_reported_together() {
        let err = Schema::builder(SchemaConfig::default())
            .field("Query", Field::new("a").with_resolver(async_resolver()).with_extension(X))
            .field("Query", Field::new("x"))
            .field("Query", Field::new("x"))
            .field("Query", Field::new("b").with_resolver(async_resolver()).with_extension(Y))
            .build()
            .unwrap_err();
        let names: Vec<&str> = err
            .compatibility_errors()
            .map(|e| e.field_name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(err.duplicates.len(), 1);
        assert_eq!(err.duplicates[0].field, "x");
        assert!(err.to_string().contains("Field x is defined more than once on type Query"));
    }

    #[test]
    fn test_same_name_on_different_types() {
        let mut builder = SchemaBuilder::new(SchemaConfig::default());
        builder.add_field("User", Field::new("id"));
        builder.add_field("Post", Field::new("id"));
        assert_eq!(builder.len(), 2);
        let schema = builder.build().unwrap();
        assert!(schema.field("User", "id").is_some());
        assert!(schema.field("Post", "id").is_some());
    }

    #[test]
    fn test_unknown_field() {
        let schema = SchemaBuilder::default().build().unwrap();
        let err = schema
            .resolve("Query", "missing", &Value::Null, Arguments::new(), Arc::new(Value::Null))
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownField { .. }));
    }

    #[test]
    fn test_async_entry_point_from_blocking_code() {
        let schema = Schema::builder(SchemaConfig::default())
            .field("User", Field::new("name").with_extension(Upper))
            .build()
            .unwrap();
        let source = json!({"name": "grace"});
        let value = tokio_test::block_on(schema.resolve_async(
            "User",
            "name",
            &source,
            Arguments::new(),
            Arc::new(Value::Null),
        ));
        assert_eq!(value.unwrap(), json!("GRACE"));
    }

    #[tokio::test]
    async fn test_concurrent_schema_resolution() {
        let schema = Arc::new(
            Schema::builder(SchemaConfig::default())
                .field("Query", Field::new("greeting").with_resolver(async_resolver()).with_extension(Upper))
                .build()
                .unwrap(),
        );
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let schema = schema.clone();
                tokio::spawn(async move {
                    let context = Arc::new(json!({ "user": format!("user{i}") }));
                    schema
                        .resolve_async("Query", "greeting", &Value::Null, Arguments::new(), context)
                        .await
                })
            })
            .collect();
        for (i, handle) in handles.into_iter().enumerate() {
            let value = handle.await.unwrap().unwrap();
            assert_eq!(value, json!(format!("HELLO USER{i}")));
        }
    }
}
