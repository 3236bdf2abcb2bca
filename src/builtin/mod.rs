//! Ready-made field extensions.

pub mod cache;
pub mod cache_handler;
pub mod input_mutation;
pub mod metrics;
pub mod permission;

pub use cache::CacheExtension;
pub use cache_handler::CacheHandler;
pub use input_mutation::InputMutationExtension;
pub use metrics::{FieldMetrics, MetricsExtension};
pub use permission::{Permission, PermissionExtension, DEFAULT_PERMISSION_MESSAGE};
