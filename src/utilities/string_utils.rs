//! String utility functions for naming fields, types and extensions.

use once_cell::sync::Lazy;
use regex::Regex;

static TYPE_PATH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^&?(?:[A-Za-z0-9_]+::)*([A-Za-z0-9_]+)").unwrap());

/// Convert a snake_case name to camelCase.
///
/// Empty segments (from doubled or trailing underscores) are kept as `_`
/// so that distinct names never collapse into the same camelCase name.
///
/// # Arguments
/// * `name` - Original snake_case name.
pub fn to_camel_case(name: &str) -> String {
    let mut components = name.split('_');
    let mut result = components.next().unwrap_or_default().to_string();
    for component in components {
        if component.is_empty() {
            result.push('_');
        } else {
            result.push_str(&capitalize_first(component));
        }
    }
    result
}

/// Uppercase the first character of `value`, leaving the rest untouched.
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strip the module path and generic arguments from a fully-qualified type
/// name, e.g. `my_crate::ext::Cache<my_crate::Key>` becomes `Cache`.
pub fn short_type_name(full: &str) -> &str {
    TYPE_PATH_PATTERN
        .captures(full)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(full)
}
