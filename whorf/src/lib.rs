//! whorf: Kubernetes validating admission webhook around the Checkov scanner.
//!
//! The decision logic lives in `whorf-admission`; this crate wires it to HTTP,
//! the manifest spool, the periodic re-scan and the command line.

pub mod cli;
pub mod commands;
pub mod observability;
pub mod periodic;
pub mod server;
pub mod spool;
pub mod state;

pub use state::AppState;
