// Environment variable loading

use crate::{ConfigError, Result};
use serde_json::{Map, Value};
use std::env;

/// Prefix used when none is given
pub const DEFAULT_PREFIX: &str = "JFRAMEWORK";

/// Separator between nested keys in a variable name
const NESTING: &str = "__";

/// Environment variable loader.
///
/// Variables named `<PREFIX>_<SECTION>__<KEY>` are mapped onto a nested
/// table: `JFRAMEWORK_ARCHITECTURE__INIT_FAILURE=continue` becomes
/// `{"architecture": {"init_failure": "continue"}}`. Segments are
/// lowercased; `true` and `false` become booleans, everything else stays a
/// string.
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Load every prefixed variable of the process environment
    pub fn load(&self) -> Value {
        self.collect_pairs(env::vars())
    }

    /// Build the nested table from arbitrary `(name, value)` pairs
    pub fn collect_pairs<I, K, V>(&self, pairs: I) -> Value
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = Map::new();
        for (name, value) in pairs {
            let Some(path) = self.strip(name.as_ref()) else {
                continue;
            };
            let segments: Vec<String> = path.split(NESTING).map(str::to_lowercase).collect();
            if segments.iter().any(String::is_empty) {
                continue;
            }
            insert_path(&mut root, &segments, scalar(value.into()));
        }
        Value::Object(root)
    }

    fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.prefix.as_str())?.strip_prefix('_')
    }

    /// Load a specific environment variable, `key` is appended to the prefix
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = format!("{}_{}", self.prefix, key.to_uppercase());
        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

fn scalar(raw: String) -> Value {
    match raw.to_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw),
    }
}

fn insert_path(root: &mut Map<String, Value>, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut table = root;
    for segment in parents {
        let slot = table
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let Value::Object(next) = slot else {
            return;
        };
        table = next;
    }
    table.insert(last.clone(), value);
}
