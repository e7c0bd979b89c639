//! Scanner error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Parameter {0} is not supported")]
    UnsupportedOption(String),

    #[error("Invalid value for parameter {option}: {source}")]
    InvalidOptionValue {
        option: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("scanner executable '{name}' not found: {source}")]
    ExecutableNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to run scanner: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("scanner exited with status {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("failed to decode scanner output: {0}")]
    Output(#[from] serde_json::Error),
}
