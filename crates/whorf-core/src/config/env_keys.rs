//! Environment variable keys and their aliases.
//!
//! Primary keys use the `WHORF_*` prefix; the bare names the original
//! deployment manifests used (`LOG_LEVEL`, `DEBUG`) stay accepted as aliases.

/// Config file locations
pub mod paths {
    pub const WHORF_CONFIG_PATH: &str = "WHORF_CONFIG_PATH";
    pub const DEFAULT_WHORF_CONFIG: &str = "config/whorf.yaml";

    pub const WHORF_LEGACY_CONFIG_PATH: &str = "WHORF_LEGACY_CONFIG_PATH";
    pub const DEFAULT_LEGACY_CONFIG: &str = "config/k8s.properties";

    pub const WHORF_CHECKOV_CONFIG_PATH: &str = "WHORF_CHECKOV_CONFIG_PATH";
    pub const DEFAULT_CHECKOV_CONFIG: &str = "config/.checkov.yaml";

    /// Spool directory for admitted manifests
    pub const WHORF_MANIFEST_ROOT: &str = "WHORF_MANIFEST_ROOT";
    pub const DEFAULT_MANIFEST_ROOT: &str = "/tmp";
}

/// HTTP server and scanner executable
pub mod server {
    pub const WHORF_LISTEN_ADDR: &str = "WHORF_LISTEN_ADDR";
    pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8443";

    pub const WHORF_CHECKOV_BIN: &str = "WHORF_CHECKOV_BIN";
    pub const DEFAULT_CHECKOV_BIN: &str = "checkov";
}

/// Logging and debug artifacts
pub mod observability {
    pub const WHORF_LOG_LEVEL: &str = "WHORF_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["LOG_LEVEL"];

    pub const WHORF_LOG_JSON: &str = "WHORF_LOG_JSON";

    /// `DEBUG=yes` keeps request and report artifacts in the spool directory
    pub const WHORF_DEBUG: &str = "WHORF_DEBUG";
    pub const DEBUG_ALIASES: &[&str] = &["DEBUG"];
}

/// Keys of `whorf.yaml` / `k8s.properties`
pub mod file {
    pub const IGNORES_NAMESPACES: &str = "ignores-namespaces";
    pub const UPLOAD_INTERVAL_IN_MIN: &str = "upload-interval-in-min";
}
