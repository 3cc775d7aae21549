/// Environment placeholder substitution for configuration trees
///
/// Walks a parsed JSON document and expands `${NAME}` tokens inside string
/// values. Unknown variables are left exactly as written.

use regex::{Captures, Regex};
use serde_json::Value;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Recursively substitute placeholders in every string value of the tree
///
/// Object keys are never rewritten. Numbers, booleans and null are returned as-is.
pub fn substitute<F>(value: &Value, lookup: &F) -> Value
where
    F: Fn(&str) -> Option<String>,
{
    match value {
        Value::String(s) => Value::String(substitute_str(s, lookup)),
        Value::Array(items) => Value::Array(items.iter().map(|v| substitute(v, lookup)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, lookup)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Expand every `${NAME}` occurrence in a single string
pub fn substitute_str<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    PLACEHOLDER
        .replace_all(input, |caps: &Captures| match lookup(&caps[1]) {
            Some(resolved) => resolved,
            None => {
                tracing::debug!("🔍 Placeholder {} has no environment value, keeping it", &caps[0]);
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Lookup backed by the process environment
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
