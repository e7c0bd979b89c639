//! ScanEngine trait: the seam between whorf and the scanning engine.
//!
//! The engine is consumed as a black box: a file or directory goes in, a list
//! of reports comes out. Uploading to the platform is an explicit input, so
//! the request path can never upload and the periodic path decides per run.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ScannerConfig;
use crate::error::ScanError;
use crate::report::parse_reports;
use crate::types::ScanReport;

/// What to scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    File(PathBuf),
    Directory(PathBuf),
}

impl ScanTarget {
    pub fn path(&self) -> &Path {
        match self {
            ScanTarget::File(p) | ScanTarget::Directory(p) => p,
        }
    }
}

/// Whether a run forwards its results to the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    Suppress,
    Upload,
}

/// Extension point for scanning engines.
///
/// Implementations block until the scan finishes; async callers run them on
/// a blocking pool.
pub trait ScanEngine: Send + Sync {
    fn run(
        &self,
        target: &ScanTarget,
        config: &ScannerConfig,
        upload: UploadMode,
    ) -> Result<Vec<ScanReport>, ScanError>;
}

/// Runs the `checkov` executable and decodes its JSON output.
#[derive(Debug, Clone)]
pub struct CheckovCli {
    executable: PathBuf,
}

impl CheckovCli {
    /// Resolve `name` on `PATH` (or accept an explicit path).
    pub fn locate(name: &str) -> Result<Self, ScanError> {
        let executable = which::which(name).map_err(|source| ScanError::ExecutableNotFound {
            name: name.to_string(),
            source,
        })?;
        Ok(Self { executable })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Full argument list for one run.
    pub fn build_args(
        target: &ScanTarget,
        config: &ScannerConfig,
        upload: UploadMode,
    ) -> Vec<String> {
        let mut args = match target {
            ScanTarget::File(p) => vec!["-f".to_string(), p.display().to_string()],
            ScanTarget::Directory(p) => vec!["-d".to_string(), p.display().to_string()],
        };
        args.extend(config.to_args());
        args.push("-o".to_string());
        args.push("json".to_string());
        if upload == UploadMode::Suppress {
            args.push("--skip-results-upload".to_string());
        }
        args
    }
}

impl ScanEngine for CheckovCli {
    fn run(
        &self,
        target: &ScanTarget,
        config: &ScannerConfig,
        upload: UploadMode,
    ) -> Result<Vec<ScanReport>, ScanError> {
        let args = Self::build_args(target, config, upload);
        tracing::debug!("Running {} {}", self.executable.display(), args.join(" "));

        let output = Command::new(&self.executable).args(&args).output()?;

        // Exit code 1 only means failed checks were found.
        match output.status.code() {
            Some(0) | Some(1) => {}
            code => {
                return Err(ScanError::ExitStatus {
                    code,
                    stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reports = parse_reports(&stdout)?;
        tracing::debug!(
            "Scanned {} into {} report(s)",
            target.path().display(),
            reports.len()
        );
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_file_suppresses_upload() {
        let args = CheckovCli::build_args(
            &ScanTarget::File(PathBuf::from("/tmp/x-req.yaml")),
            &ScannerConfig::default(),
            UploadMode::Suppress,
        );
        assert_eq!(&args[..2], &["-f", "/tmp/x-req.yaml"]);
        assert!(args.ends_with(&["-o".to_string(), "json".to_string(), "--skip-results-upload".to_string()]));
    }

    #[test]
    fn test_build_args_directory_uploads() {
        let args = CheckovCli::build_args(
            &ScanTarget::Directory(PathBuf::from("/tmp")),
            &ScannerConfig::default(),
            UploadMode::Upload,
        );
        assert_eq!(&args[..2], &["-d", "/tmp"]);
        assert!(!args.contains(&"--skip-results-upload".to_string()));
        assert!(args.contains(&"kubernetes".to_string()));
    }

    #[cfg(unix)]
    fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = dir.join(name);
        std::fs::write(&script, format!("#!/bin/sh\n{}", body)).unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        script
    }

    // Both stubs live in one test so no other test forks while a stub is open for writing.
    #[cfg(unix)]
    #[test]
    fn test_run_stub_engines() {
        let dir = tempfile::tempdir().unwrap();
        let ok = write_stub(
            dir.path(),
            "checkov-ok",
            "echo '[{\"check_type\": \"kubernetes\", \"results\": {\"failed_checks\": [{\"check_id\": \"CKV_K8S_16\", \"check_name\": \"privileged\"}]}}]'\nexit 1\n",
        );
        let crash = write_stub(dir.path(), "checkov-crash", "echo boom >&2\nexit 2\n");

        let engine = CheckovCli::locate(ok.to_str().unwrap()).unwrap();
        let reports = engine
            .run(
                &ScanTarget::File(dir.path().join("m.yaml")),
                &ScannerConfig::default(),
                UploadMode::Suppress,
            )
            .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].failed_count(), 1);

        let engine = CheckovCli::locate(crash.to_str().unwrap()).unwrap();
        let err = engine
            .run(
                &ScanTarget::Directory(dir.path().to_path_buf()),
                &ScannerConfig::default(),
                UploadMode::Upload,
            )
            .unwrap_err();
        match err {
            ScanError::ExitStatus { code, stderr } => {
                assert_eq!(code, Some(2));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_locate_missing_executable() {
        assert!(matches!(
            CheckovCli::locate("whorf-no-such-scanner-binary"),
            Err(ScanError::ExecutableNotFound { .. })
        ));
    }
}
