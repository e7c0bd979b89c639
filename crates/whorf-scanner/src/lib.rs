//! Scanner side of whorf.
//!
//! - `types`: scan reports and findings as produced by the scanning engine
//! - `config`: the scanner option set and the override merge policy
//! - `report`: decoding of the engine's JSON output
//! - `engine`: the `ScanEngine` seam and the Checkov subprocess implementation

pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod types;

pub use config::ScannerConfig;
pub use engine::{CheckovCli, ScanEngine, ScanTarget, UploadMode};
pub use error::ScanError;
pub use types::{CheckResult, CheckType, Finding, ScanReport, Severity};
