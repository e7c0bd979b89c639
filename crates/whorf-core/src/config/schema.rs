//! Typed configuration structs, grouped by concern.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use super::env_keys::{file as file_keys, observability as obv_keys, paths, server};
use super::error::ConfigError;
use super::loader::{env_bool, env_optional, env_or, parse_properties, read_yaml_mapping};

/// Default minutes between periodic re-scans.
pub const DEFAULT_UPLOAD_INTERVAL_IN_MIN: u64 = 5;

/// Config file and spool directory locations
#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub whorf_config: PathBuf,
    pub legacy_config: PathBuf,
    pub checkov_config: PathBuf,
    pub manifest_root: PathBuf,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        let path = |key: &str, default: &str| PathBuf::from(env_or(key, &[], || default.to_string()));
        Self {
            whorf_config: path(paths::WHORF_CONFIG_PATH, paths::DEFAULT_WHORF_CONFIG),
            legacy_config: path(paths::WHORF_LEGACY_CONFIG_PATH, paths::DEFAULT_LEGACY_CONFIG),
            checkov_config: path(paths::WHORF_CHECKOV_CONFIG_PATH, paths::DEFAULT_CHECKOV_CONFIG),
            manifest_root: path(paths::WHORF_MANIFEST_ROOT, paths::DEFAULT_MANIFEST_ROOT),
        }
    }
}

/// HTTP listener, scanner executable and debug switch
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub checkov_bin: String,
    /// Keep request and report artifacts next to the spooled manifests
    pub debug: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            listen_addr: env_or(server::WHORF_LISTEN_ADDR, &[], || {
                server::DEFAULT_LISTEN_ADDR.to_string()
            }),
            checkov_bin: env_or(server::WHORF_CHECKOV_BIN, &[], || {
                server::DEFAULT_CHECKOV_BIN.to_string()
            }),
            debug: env_optional(obv_keys::WHORF_DEBUG, obv_keys::DEBUG_ALIASES)
                .map(|v| v.eq_ignore_ascii_case("yes"))
                .unwrap_or(false),
        }
    }
}

/// Logging: level filter and output format
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| Self {
            // Deployment manifests set LOG_LEVEL=INFO; EnvFilter wants lower case.
            log_level: env_or(obv_keys::WHORF_LOG_LEVEL, obv_keys::LOG_LEVEL_ALIASES, || {
                "info".to_string()
            })
            .to_lowercase(),
            log_json: env_bool(obv_keys::WHORF_LOG_JSON, &[], false),
        })
    }
}

/// Webhook settings from `whorf.yaml` (or the legacy properties file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhorfConfig {
    /// Namespaces whose requests are allowed without scanning
    pub ignores_namespaces: Vec<String>,
    /// Minutes between periodic re-scans of the spool directory
    pub upload_interval_in_min: u64,
}

impl Default for WhorfConfig {
    fn default() -> Self {
        Self {
            ignores_namespaces: Vec::new(),
            upload_interval_in_min: DEFAULT_UPLOAD_INTERVAL_IN_MIN,
        }
    }
}

impl WhorfConfig {
    /// Load `yaml_path`, falling back to the legacy properties file when the
    /// YAML file does not exist.
    pub fn load(yaml_path: &Path, legacy_path: &Path) -> Result<Self, ConfigError> {
        if yaml_path.exists() {
            let mapping = read_yaml_mapping(yaml_path)?;
            return Ok(Self::from_mapping(&mapping));
        }
        tracing::info!(
            "{} not found, using legacy properties {}",
            yaml_path.display(),
            legacy_path.display()
        );
        let content = std::fs::read_to_string(legacy_path).map_err(|source| ConfigError::Read {
            path: legacy_path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_properties(&content))
    }

    pub fn from_mapping(mapping: &Mapping) -> Self {
        let ignores_namespaces = match mapping.get(file_keys::IGNORES_NAMESPACES) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => {
                        tracing::warn!("Ignoring non-string namespace entry {:?}", other);
                        None
                    }
                })
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            Some(other) => {
                tracing::warn!(
                    "{} must be a list of namespaces, got {:?}",
                    file_keys::IGNORES_NAMESPACES,
                    other
                );
                Vec::new()
            }
        };

        let upload_interval_in_min = match mapping.get(file_keys::UPLOAD_INTERVAL_IN_MIN) {
            None | Some(Value::Null) => DEFAULT_UPLOAD_INTERVAL_IN_MIN,
            Some(Value::Number(n)) => interval_or_default(n.as_u64()),
            Some(Value::String(s)) => interval_or_default(parse_interval(s)),
            Some(other) => {
                tracing::warn!("Invalid upload interval {:?}, using default", other);
                DEFAULT_UPLOAD_INTERVAL_IN_MIN
            }
        };

        Self {
            ignores_namespaces,
            upload_interval_in_min,
        }
    }

    pub fn from_properties(content: &str) -> Self {
        let props = parse_properties(content);
        let ignores_namespaces = props
            .get(file_keys::IGNORES_NAMESPACES)
            .map(|values| values.iter().filter(|v| !v.is_empty()).cloned().collect())
            .unwrap_or_default();
        let upload_interval_in_min = interval_or_default(
            props
                .get(file_keys::UPLOAD_INTERVAL_IN_MIN)
                .and_then(|values| values.first())
                .and_then(|v| parse_interval(v)),
        );
        Self {
            ignores_namespaces,
            upload_interval_in_min,
        }
    }
}

fn parse_interval(raw: &str) -> Option<u64> {
    let parsed = raw.trim().parse::<u64>().ok();
    if parsed.is_none() {
        tracing::warn!("Invalid upload interval '{}', using default", raw);
    }
    parsed
}

fn interval_or_default(minutes: Option<u64>) -> u64 {
    match minutes {
        Some(0) | None => DEFAULT_UPLOAD_INTERVAL_IN_MIN,
        Some(m) => m,
    }
}
