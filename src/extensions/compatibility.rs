//! Build-time compatibility check between a field and its extensions.

use super::field_extension::Extension;
use crate::types::ExecutionMode;
use crate::utilities::errors::CompatibilityError;

/// Verify that every extension attached to a field supports the field's
/// execution mode.
///
/// All extensions are inspected before failing, so the error names every
/// incompatible extension at once. Has no side effects beyond logging; calling
/// it again on a valid field is a no-op.
pub fn check_compatibility(
    field_name: &str,
    mode: ExecutionMode,
    extensions: &[Extension],
) -> Result<(), CompatibilityError> {
    if extensions.is_empty() {
        return Ok(());
    }

    let incompatible: Vec<String> = extensions
        .iter()
        .filter(|extension| !extension.capability().supports(mode))
        .map(|extension| extension.name().to_string())
        .collect();

    if incompatible.is_empty() {
        return Ok(());
    }

    let err = CompatibilityError {
        field_name: field_name.to_string(),
        mode,
        extensions: incompatible,
    };
    log::warn!("{}", err);
    Err(err)
}
