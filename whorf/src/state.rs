//! Shared state of the server and the periodic re-scan.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use whorf_admission::{RequestValidator, UploadThrottle};
use whorf_core::config::{load_scanner_overrides, PathsConfig, WhorfConfig};
use whorf_scanner::{ScanEngine, ScannerConfig};

use crate::spool::Spool;

pub struct AppState {
    engine: Arc<dyn ScanEngine>,
    validator: RequestValidator,
    throttle: UploadThrottle,
    spool: Spool,
    checkov_config: PathBuf,
    debug: bool,
}

impl AppState {
    pub fn new(engine: Arc<dyn ScanEngine>, manifest_root: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            validator: RequestValidator::default(),
            throttle: UploadThrottle::new(),
            spool: Spool::new(manifest_root),
            checkov_config: PathBuf::new(),
            debug: false,
        }
    }

    pub fn from_config(engine: Arc<dyn ScanEngine>, settings: &WhorfConfig, paths: &PathsConfig) -> Self {
        Self::new(engine, &paths.manifest_root)
            .with_ignored_namespaces(settings.ignores_namespaces.iter().cloned())
            .with_checkov_config(&paths.checkov_config)
    }

    pub fn with_ignored_namespaces<I: IntoIterator<Item = String>>(mut self, namespaces: I) -> Self {
        self.validator = RequestValidator::new(namespaces);
        self
    }

    pub fn with_checkov_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkov_config = path.into();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_throttle(mut self, throttle: UploadThrottle) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn engine(&self) -> &dyn ScanEngine {
        self.engine.as_ref()
    }

    pub fn validator(&self) -> &RequestValidator {
        &self.validator
    }

    pub fn throttle(&self) -> &UploadThrottle {
        &self.throttle
    }

    pub fn spool(&self) -> &Spool {
        &self.spool
    }

    pub fn manifest_root(&self) -> &Path {
        self.spool.root()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Scanner defaults merged with the override file. Re-read on every scan
    /// so edits to the file apply without a restart. An unreadable file falls
    /// back to the defaults.
    pub fn scanner_config(&self) -> ScannerConfig {
        match load_scanner_overrides(&self.checkov_config) {
            Ok(overrides) => ScannerConfig::with_overrides(&overrides),
            Err(e) => {
                tracing::error!("{e}; using default scanner options");
                ScannerConfig::default()
            }
        }
    }
}
