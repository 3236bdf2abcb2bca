//! Field extension demo binary.
//!
//! Builds a small schema using the built-in extensions, resolves a few
//! fields through both entry points and prints the results, then shows the
//! error reported for an incompatible extension.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: tracing filter (default: "info,field_extensions=debug")
//! - `FIELD_EXT_AUTO_CAMEL_CASE`, `FIELD_EXT_STRICT_DEFAULT_RESOLVER`: schema config overrides
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin resolve_demo
//! ```

use std::sync::Arc;

use field_extensions::builtin::{
    CacheExtension, InputMutationExtension, MetricsExtension, Permission, PermissionExtension,
};
use field_extensions::extensions::{Extension, SyncCapable, SyncNext};
use field_extensions::{
    field_extension, Arguments, Field, FieldArgument, Info, ResolveResult, Resolver, Schema,
    SchemaConfig, Value,
};
use serde_json::json;

struct IsAuthenticated;

impl Permission for IsAuthenticated {
    fn has_permission(&self, _source: &Value, info: &Info, _args: &Arguments) -> bool {
        info.context_value("user").is_some()
    }
}

/// Sync-only extension, used to show the compatibility report.
struct Uppercase;

impl SyncCapable for Uppercase {
    fn resolve(&self, next: &SyncNext, source: &Value, info: &Info, args: Arguments) -> ResolveResult {
        Ok(match next.call(source, info, args)? {
            Value::String(s) => Value::String(s.to_uppercase()),
            other => other,
        })
    }
}

field_extension!(Uppercase: sync);

fn build_schema(config: &SchemaConfig, metrics: Arc<MetricsExtension>) -> anyhow::Result<Schema> {
    let schema = Schema::builder(config.clone())
        .field("User", Field::new("display_name").with_extension(Uppercase))
        .field(
            "Query",
            Field::new("me")
                .with_type("User")
                .with_resolver(Resolver::from_sync(|_, info, _| {
                    Ok(json!({ "display_name": info.context_value("user").cloned() }))
                }))
                .with_extension(PermissionExtension::default().with_permission(IsAuthenticated)),
        )
        .field(
            "Query",
            Field::new("exchange_rate")
                .with_argument(FieldArgument::new("currency", "String!"))
                .with_resolver(Resolver::from_async(|_, _, args| async move {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    let rate = match args.get("currency").and_then(Value::as_str) {
                        Some("EUR") => 0.92,
                        Some("GBP") => 0.79,
                        _ => 1.0,
                    };
                    Ok(json!(rate))
                }))
                .with_shared_extension(Extension::from_arc(metrics))
                .with_extension(CacheExtension::new()),
        )
        .field(
            "Mutation",
            Field::new("create_user")
                .with_argument(FieldArgument::new("name", "String!"))
                .with_argument(FieldArgument::new("email", "String"))
                .with_resolver(Resolver::from_sync(|_, _, args| {
                    Ok(json!({ "id": 1, "fields": Value::Object(args) }))
                }))
                .with_extension(InputMutationExtension::new()),
        )
        .build()?;
    Ok(schema)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,field_extensions=debug".into()),
        )
        .init();

    let config = SchemaConfig::from_env()?;
    let metrics = Arc::new(MetricsExtension::new());
    let schema = build_schema(&config, metrics.clone())?;
    tracing::info!("Schema types: {:?}", schema.type_names());

    let anonymous = Arc::new(Value::Null);
    let signed_in = Arc::new(json!({ "user": "ada" }));

    match schema.resolve("Query", "me", &Value::Null, Arguments::new(), anonymous.clone()) {
        Ok(value) => println!("me (anonymous) = {value}"),
        Err(e) => println!("me (anonymous) failed: {e}"),
    }
    let me = schema.resolve("Query", "me", &Value::Null, Arguments::new(), signed_in.clone())?;
    let display_name = schema.resolve("User", "displayName", &me, Arguments::new(), signed_in.clone())?;
    println!("me.displayName = {display_name}");

    let mut currency = Arguments::new();
    currency.insert("currency".to_string(), json!("EUR"));
    for _ in 0..3 {
        let rate = schema
            .resolve_async("Query", "exchangeRate", &Value::Null, currency.clone(), anonymous.clone())
            .await?;
        println!("exchangeRate(EUR) = {rate}");
    }
    println!("exchangeRate metrics = {}", serde_json::to_string(&metrics.snapshot())?);

    if let Err(e) = schema.resolve("Query", "exchangeRate", &Value::Null, currency, anonymous.clone()) {
        println!("sync entry point on async field: {e}");
    }

    let mut input = Arguments::new();
    input.insert("input".to_string(), json!({ "name": "Ada", "email": "ada@example.com" }));
    let created = schema
        .resolve_async("Mutation", "createUser", &Value::Null, input, anonymous)
        .await?;
    println!("createUser = {created}");

    let broken = Schema::builder(config)
        .field(
            "Query",
            Field::new("remote_name")
                .with_resolver(Resolver::from_async(|_, _, _| async { Ok(json!("remote")) }))
                .with_extension(Uppercase),
        )
        .build();
    if let Err(e) = broken {
        println!("incompatible schema rejected: {e}");
    }

    Ok(())
}
