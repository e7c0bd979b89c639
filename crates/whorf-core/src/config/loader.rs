//! Environment and config-file loading helpers.
//!
//! Keeps the fallback chains in one place so callers never repeat
//! `or_else` ladders around `std::env::var`.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::error::ConfigError;

/// Read the primary variable or the first set alias, falling back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(default)
}

/// Same chain as [`env_or`], returning `None` when unset or blank.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    env::var(primary)
        .ok()
        .or_else(|| aliases.iter().find_map(|a| env::var(a).ok()))
        .and_then(|s| {
            let s = s.trim().to_string();
            if s.is_empty() {
                None
            } else {
                Some(s)
            }
        })
}

/// Boolean variable: 1/true/yes/on are true, 0/false/no/off are false.
/// Anything else falls back to `default`.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(s) => parse_bool(&s).unwrap_or(default),
        None => default,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a YAML file whose top level is a mapping.
///
/// An empty document is an empty mapping.
pub fn read_yaml_mapping(path: &Path) -> Result<Mapping, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ConfigError::NotAMapping(path.to_path_buf())),
    }
}

/// Parse the legacy `key=v1,v2` properties format.
///
/// Every line is split at its first `=`; the right side is split on commas
/// and each value trimmed. Blank lines are skipped.
pub fn parse_properties(content: &str) -> HashMap<String, Vec<String>> {
    let mut props = HashMap::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (name, var) = line.split_once('=').unwrap_or((line, ""));
        let values = var.trim().split(',').map(|v| v.trim().to_string()).collect();
        props.insert(name.trim().to_string(), values);
    }
    props
}

/// Load scanner overrides (hyphenated option names → values).
///
/// A missing file means no overrides.
pub fn load_scanner_overrides(path: &Path) -> Result<Mapping, ConfigError> {
    if !path.exists() {
        tracing::debug!("No scanner config at {}, using defaults", path.display());
        return Ok(Mapping::new());
    }
    read_yaml_mapping(path)
}
