//! Permission checks in front of a resolver.

use std::sync::Arc;

use async_trait::async_trait;

use crate::extensions::{AsyncCapable, AsyncNext, SyncCapable, SyncNext};
use crate::field::Field;
use crate::types::{Arguments, Info, ResolveResult, Value};
use crate::utilities::errors::ResolveError;
use crate::utilities::string_utils::short_type_name;

pub const DEFAULT_PERMISSION_MESSAGE: &str = "User is not authorized to access this resource";

/// A single access rule.
#[async_trait]
pub trait Permission: Send + Sync {
    /// Name used in directives and logs.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Message returned to the client when the check fails.
    fn message(&self) -> String {
        DEFAULT_PERMISSION_MESSAGE.to_string()
    }

    fn has_permission(&self, source: &Value, info: &Info, args: &Arguments) -> bool;

    /// Async variant, e.g. for rules backed by a remote lookup. Defaults to
    /// the synchronous check.
    async fn has_permission_async(&self, source: &Value, info: &Info, args: &Arguments) -> bool {
        self.has_permission(source, info, args)
    }
}

/// Runs every permission in order before the wrapped chain; the first
/// denial stops resolution.
#[derive(Clone)]
pub struct PermissionExtension {
    permissions: Vec<Arc<dyn Permission>>,
    fail_silently: bool,
    use_directives: bool,
}

impl Default for PermissionExtension {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PermissionExtension {
    /// # Arguments
    ///
    /// * `permissions` - Checked in order; the first denial stops resolution.
    pub fn new(permissions: Vec<Arc<dyn Permission>>) -> Self {
        Self {
            permissions,
            fail_silently: false,
            use_directives: true,
        }
    }

    /// Append a permission check.
    ///
    /// # Arguments
    ///
    /// * `permission` - Runs after the checks already attached.
    pub fn with_permission<P: Permission + 'static>(mut self, permission: P) -> Self {
        self.permissions.push(Arc::new(permission));
        self
    }

    /// Return `null` (or `[]` for list fields) instead of an error on denial.
    pub fn fail_silently(mut self, fail_silently: bool) -> Self {
        self.fail_silently = fail_silently;
        self
    }

    /// Record each permission's name as a directive on the field.
    pub fn use_directives(mut self, use_directives: bool) -> Self {
        self.use_directives = use_directives;
        self
    }

    pub fn permissions(&self) -> &[Arc<dyn Permission>] {
        &self.permissions
    }

    fn deny(&self, permission: &dyn Permission, info: &Info) -> ResolveResult {
        log::warn!(
            "Permission {} denied access to {}.{}",
            permission.name(),
            info.parent_type,
            info.field_name
        );
        if !self.fail_silently {
            return Err(ResolveError::PermissionDenied {
                message: permission.message(),
            });
        }
        let is_list = info
            .return_type
            .as_deref()
            .is_some_and(|t| t.starts_with('['));
        Ok(if is_list {
            Value::Array(Vec::new())
        } else {
            Value::Null
        })
    }
}

impl std::fmt::Debug for PermissionExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.permissions.iter().map(|p| p.name()).collect();
        f.debug_struct("PermissionExtension")
            .field("permissions", &names)
            .field("fail_silently", &self.fail_silently)
            .field("use_directives", &self.use_directives)
            .finish()
    }
}

impl SyncCapable for PermissionExtension {
    fn resolve(
        &self,
        next: &SyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult {
        for permission in &self.permissions {
            if !permission.has_permission(source, info, &args) {
                return self.deny(permission.as_ref(), info);
            }
        }
        next.call(source, info, args)
    }
}

#[async_trait]
impl AsyncCapable for PermissionExtension {
    async fn resolve_async(
        &self,
        next: &AsyncNext,
        source: &Value,
        info: &Info,
        args: Arguments,
    ) -> ResolveResult {
        for permission in &self.permissions {
            if !permission.has_permission_async(source, info, &args).await {
                return self.deny(permission.as_ref(), info);
            }
        }
        next.call(source, info, args).await
    }
}

crate::field_extension!(PermissionExtension: sync, async {
    fn apply(&self, field: &mut Field) {
        if !self.use_directives {
            return;
        }
        for permission in &self.permissions {
            let directive = permission.name().to_string();
            if !field.directives.contains(&directive) {
                field.directives.push(directive);
            }
        }
    }
});
