//! Field extension mechanism.
//!
//! - [`field_extension`]: the extension contract and its type-erased handle.
//! - [`capability`]: per-type capability detection.
//! - [`compatibility`]: the build-time gate matching extensions to a field's mode.
//! - [`chain`]: composition of extensions into one resolution function.

pub mod capability;
pub mod chain;
pub mod compatibility;
pub mod field_extension;

pub use capability::Capability;
pub use chain::{AsyncNext, CompiledChain, SyncNext};
pub use compatibility::check_compatibility;
pub use field_extension::{AsyncCapable, Extension, FieldExtension, SyncCapable};
