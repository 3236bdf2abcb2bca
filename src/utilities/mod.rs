//! Shared utilities: configuration, error types and string helpers.

pub mod config;
pub mod errors;
pub mod string_utils;
