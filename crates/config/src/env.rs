//! Environment lookups used as a fallback for credentials

use std::collections::HashMap;

/// Fallback variable for `api-url`
pub const ENV_API_URL: &str = "CLOUDSTACK_API_URL";
/// Fallback variable for `api-key`
pub const ENV_API_KEY: &str = "CLOUDSTACK_API_KEY";
/// Fallback variable for `secret-key`
pub const ENV_SECRET_KEY: &str = "CLOUDSTACK_SECRET_KEY";

/// Source of environment variables.
///
/// Resolution reads through this trait so tests can supply a map instead of
/// mutating the process environment.
pub trait EnvSource {
    /// Value of `key`, `None` when unset
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment, read at call time
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| v.to_string())
    }
}

/// Fill `field` from `key` when it is empty. Returns whether it was filled.
pub(crate) fn fallback(field: &mut String, env: &dyn EnvSource, key: &str) -> bool {
    if !field.is_empty() {
        return false;
    }
    match env.var(key) {
        Some(value) if !value.is_empty() => {
            *field = value;
            true
        }
        _ => false,
    }
}
