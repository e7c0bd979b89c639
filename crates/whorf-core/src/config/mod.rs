//! Whorf configuration layer
//!
//! All environment access is centralised here; other crates read typed
//! config structs instead of calling `std::env::var` directly.
//!
//! - `env_keys`: key constants (with legacy aliases)
//! - `loader`: env helpers plus the YAML / properties file readers
//! - `schema`: `PathsConfig`, `ServerConfig`, `ObservabilityConfig`, `WhorfConfig`

pub mod env_keys;
pub mod error;
pub mod loader;
pub mod schema;

pub use error::ConfigError;
pub use loader::{
    env_bool, env_optional, env_or, load_scanner_overrides, parse_properties, read_yaml_mapping,
};
pub use schema::{ObservabilityConfig, PathsConfig, ServerConfig, WhorfConfig};
