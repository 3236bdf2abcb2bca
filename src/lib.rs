//! # Field Extensions
//!
//! Resolver middleware for GraphQL fields.
//!
//! A field extension wraps the resolution of one field: it can rewrite the
//! arguments, post-process the value, or short-circuit entirely. Extensions
//! declare whether they can wrap synchronous resolvers, asynchronous ones, or
//! both. When a field is finalized its extensions are checked against the
//! resolver's execution mode, and all of them are composed into one
//! resolution function, first extension outermost.
//!
//! ```ignore
//! use field_extensions::{field_extension, Field, SchemaConfig};
//! use field_extensions::extensions::{SyncCapable, SyncNext};
//!
//! struct Logger;
//!
//! impl SyncCapable for Logger {
//!     fn resolve(&self, next: &SyncNext, source: &Value, info: &Info, args: Arguments) -> ResolveResult {
//!         log::info!("resolving {}", info.field_name);
//!         next.call(source, info, args)
//!     }
//! }
//!
//! field_extension!(Logger: sync);
//!
//! let field = Field::new("name").with_extension(Logger).finalize(&SchemaConfig::default())?;
//! ```

pub mod builtin;
pub mod extensions;
pub mod field;
pub mod schema;
pub mod types;
pub mod utilities;

pub use extensions::{AsyncCapable, Extension, FieldExtension, SyncCapable};
pub use field::{ActiveField, Field, FieldArgument, Resolver};
pub use schema::{Schema, SchemaBuilder};
pub use types::{Arguments, ExecutionMode, Info, ResolveResult, Value};
pub use utilities::config::SchemaConfig;
pub use utilities::errors::{
    CompatibilityError, ConfigError, DuplicateFieldError, FieldError, ResolveError, SchemaError,
    UnsupportedModeError,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
