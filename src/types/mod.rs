//! Core value types shared by fields, extensions and resolvers.

pub mod info;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use info::Info;

/// Dynamically-typed value produced by resolvers and used as field sources.
pub type Value = serde_json::Value;

/// Field arguments, keyed by argument name.
///
/// Passed by value down the resolution chain so wrappers can rewrite them
/// before delegating.
pub type Arguments = serde_json::Map<String, Value>;

/// Result of resolving a field.
pub type ResolveResult = Result<Value, crate::utilities::errors::ResolveError>;

/// Execution mode of a field's resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Sync,
    Async,
}

impl ExecutionMode {
    pub fn is_async(self) -> bool {
        matches!(self, Self::Async)
    }

    /// The other mode; used to describe what an incompatible extension is limited to.
    pub fn opposite(self) -> Self {
        match self {
            Self::Sync => Self::Async,
            Self::Async => Self::Sync,
        }
    }

    /// Name of the capability trait an extension must implement to run in this mode.
    pub fn required_trait(self) -> &'static str {
        match self {
            Self::Sync => "SyncCapable",
            Self::Async => "AsyncCapable",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
        }
    }
}
