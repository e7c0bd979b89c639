//! Whorf core: configuration layer shared by the scanner adapter, the
//! admission engine and the webhook binary.

pub mod config;
