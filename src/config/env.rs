//! Environment variable access for configuration loading.
//!
//! Configuration never reads `std::env` directly; it goes through an
//! [`EnvSource`] so tests can supply a map instead of mutating the process
//! environment.

use std::collections::HashMap;
use std::str::FromStr;

/// A read-only source of environment-style key/value pairs.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
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
        self.get(key).map(|v| (*v).to_string())
    }
}

/// Get an optional variable, treating whitespace-only values as absent.
pub fn env_opt(env: &dyn EnvSource, key: &str) -> Option<String> {
    env.var(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a boolean variable.
///
/// Returns `true` if the value is "1", "true" or "yes" (case-insensitive).
pub fn env_bool(env: &dyn EnvSource, key: &str) -> bool {
    env_opt(env, key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes"))
        .unwrap_or(false)
}

/// Parse a numeric variable, logging and ignoring values that do not parse.
pub fn env_parse<T: FromStr>(env: &dyn EnvSource, key: &str) -> Option<T> {
    let raw = env_opt(env, key)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable environment value");
            None
        }
    }
}

/// Parse a list variable (see [`split_list`]).
pub fn env_list(env: &dyn EnvSource, key: &str) -> Vec<String> {
    env_opt(env, key)
        .map(|raw| split_list(&raw))
        .unwrap_or_default()
}

/// Split free-form list text into trimmed, non-empty items.
///
/// Accepts a JSON array (`["a", "b"]`) or comma/newline separated text.
pub fn split_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if trimmed.starts_with('[')
        && trimmed.ends_with(']')
        && let Ok(serde_json::Value::Array(items)) = serde_json::from_str(trimmed)
    {
        return items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect();
    }

    trimmed
        .split([',', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
