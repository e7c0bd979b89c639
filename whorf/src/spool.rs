//! Manifest spool directory: admitted manifests wait here for the periodic
//! re-scan, together with the optional debug artifacts.
//!
//! A request writes its manifest and scans it while holding a shared
//! [`Spool::admit`] guard. The periodic pass takes the exclusive side only to
//! move the current entries into a [`Batch`] directory, then scans and
//! deletes that batch alone. Manifests spooled after the move stay put for
//! the next pass, and a request's manifest never moves under its own scan.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tempfile::TempDir;
use whorf_scanner::ScanReport;

const BATCH_PREFIX: &str = ".whorf-batch-";

#[derive(Debug)]
pub struct Spool {
    root: PathBuf,
    gate: RwLock<()>,
}

impl Spool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            gate: RwLock::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Held by a request from writing its manifest until its scan returns.
    pub fn admit(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move every current entry into a fresh batch directory under the root.
    /// `None` when there was nothing to move.
    pub fn take_batch(&self) -> io::Result<Option<Batch>> {
        let _exclusive = self.gate.write().unwrap_or_else(PoisonError::into_inner);

        let names: Vec<OsString> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok().map(|e| e.file_name()))
            .collect();
        if names.is_empty() {
            return Ok(None);
        }

        let dir = tempfile::Builder::new()
            .prefix(BATCH_PREFIX)
            .tempdir_in(&self.root)?;
        let mut moved = Vec::with_capacity(names.len());
        for name in names {
            match fs::rename(self.root.join(&name), dir.path().join(&name)) {
                Ok(()) => moved.push(name),
                Err(e) => tracing::error!("Failed to move {:?} into batch: {e}", name),
            }
        }
        if moved.is_empty() {
            return Ok(None);
        }

        Ok(Some(Batch {
            dir,
            root: self.root.clone(),
            entries: moved,
        }))
    }
}

/// Spool entries taken by one periodic pass.
#[derive(Debug)]
pub struct Batch {
    dir: TempDir,
    root: PathBuf,
    entries: Vec<OsString>,
}

impl Batch {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Delete the batch after a successful upload.
    pub fn discard(self) {
        cleanup_directory(self.dir.path());
        if let Err(e) = self.dir.close() {
            tracing::error!("Failed to remove batch directory: {e}");
        }
    }

    /// Put the entries back into the spool root for the next pass. A newer
    /// entry of the same name already in the root wins.
    pub fn restore(self) {
        for name in &self.entries {
            let target = self.root.join(name);
            if target.exists() {
                tracing::debug!("Keeping newer {}", target.display());
                continue;
            }
            if let Err(e) = fs::rename(self.dir.path().join(name), &target) {
                tracing::error!("Failed to restore {}: {e}", target.display());
            }
        }
    }
}

pub fn manifest_path(root: &Path, uid: &str) -> PathBuf {
    root.join(format!("{uid}-req.yaml"))
}

pub fn request_artifact_path(root: &Path, uid: &str) -> PathBuf {
    root.join(format!("{uid}-req.json"))
}

pub fn reports_artifact_path(root: &Path, uid: &str) -> PathBuf {
    root.join(format!("{uid}-req-reports.json"))
}

/// Write the admitted object as YAML. `uid` must already be validated: it
/// becomes part of the file name.
pub fn write_manifest(root: &Path, uid: &str, object: &Value) -> Result<PathBuf> {
    let path = manifest_path(root, uid);
    let yaml = serde_yaml::to_string(object).context("failed to render manifest as YAML")?;
    fs::write(&path, yaml).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Per report: its category and the failed checks only.
pub fn reduce_reports(reports: &[ScanReport]) -> Value {
    Value::Array(
        reports
            .iter()
            .map(|report| {
                json!({
                    "check_type": report.check_type,
                    "failed_checks": report.failed_findings().collect::<Vec<_>>(),
                })
            })
            .collect(),
    )
}

/// Keep the raw review and the reduced reports next to the manifest.
/// Failures are logged and otherwise ignored.
pub fn write_debug_artifacts(root: &Path, uid: &str, review: &Value, reports: &[ScanReport]) {
    let artifacts = [
        (request_artifact_path(root, uid), review.clone()),
        (reports_artifact_path(root, uid), reduce_reports(reports)),
    ];
    for (path, value) in artifacts {
        if let Err(e) = fs::write(&path, value.to_string()) {
            tracing::error!("Failed to write debug artifact {}: {e}", path.display());
        }
    }
}

/// True when the directory exists and has at least one entry.
pub fn has_entries(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Delete every entry of `path` but not `path` itself. Symlinks are removed,
/// never followed. A missing directory is a no-op.
pub fn cleanup_directory(path: &Path) {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            tracing::error!("Failed to list {}: {e}", path.display());
            return;
        }
    };

    for entry in entries.flatten() {
        let entry_path = entry.path();
        let removed = match entry.file_type() {
            Ok(ft) if ft.is_dir() => fs::remove_dir_all(&entry_path),
            Ok(_) => fs::remove_file(&entry_path),
            Err(e) => Err(e),
        };
        if let Err(e) = removed {
            tracing::error!("Failed to delete {}: {e}", entry_path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use whorf_scanner::{CheckResult, CheckType, Finding};

    const UID: &str = "13b390aa-ea59-48ef-9fb8-069bf0430dce";

    #[test]
    fn test_write_manifest_as_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let object = json!({"kind": "Deployment", "metadata": {"name": "nginx"}});

        let path = write_manifest(dir.path(), UID, &object).unwrap();
        assert_eq!(path, dir.path().join(format!("{UID}-req.yaml")));

        let back: Value = serde_yaml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, object);
    }

    #[test]
    fn test_write_manifest_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(write_manifest(&missing, UID, &json!({})).is_err());
    }

    #[test]
    fn test_debug_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let reports = vec![ScanReport::new(CheckType::WorkloadPolicy)
            .with_finding(Finding::failed("CKV_K8S_16", "privileged"))
            .with_finding(Finding::failed("CKV_K8S_8", "liveness").with_result(CheckResult::Passed))];
        let review = json!({"request": {"uid": UID}});

        write_debug_artifacts(dir.path(), UID, &review, &reports);

        let raw: Value =
            serde_json::from_str(&fs::read_to_string(request_artifact_path(dir.path(), UID)).unwrap()).unwrap();
        assert_eq!(raw, review);

        let reduced: Value =
            serde_json::from_str(&fs::read_to_string(reports_artifact_path(dir.path(), UID)).unwrap()).unwrap();
        assert_eq!(reduced[0]["check_type"], "kubernetes");
        let failed = reduced[0]["failed_checks"].as_array().unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0]["check_id"], "CKV_K8S_16");
    }

    #[test]
    fn test_cleanup_keeps_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a-req.yaml"), "kind: Pod").unwrap();
        fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
        fs::write(dir.path().join("nested/deeper/b.yaml"), "kind: Pod").unwrap();
        assert!(has_entries(dir.path()));

        cleanup_directory(dir.path());

        assert!(dir.path().is_dir());
        assert!(!has_entries(dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_cleanup_does_not_follow_symlinks() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("keep.txt"), "keep").unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        cleanup_directory(dir.path());

        assert!(!has_entries(dir.path()));
        assert!(outside.path().join("keep.txt").exists());
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_take_batch_moves_current_entries_only() {
        let dir = tempfile::tempdir().unwrap();
        let spool = Spool::new(dir.path());
        assert!(spool.take_batch().unwrap().is_none());

        fs::write(dir.path().join("a-req.yaml"), "kind: Pod").unwrap();
        let batch = spool.take_batch().unwrap().unwrap();
        assert_eq!(batch.len(), 1);
        assert!(batch.path().starts_with(dir.path()));
        assert_eq!(names(batch.path()), vec!["a-req.yaml"]);

        fs::write(dir.path().join("b-req.yaml"), "kind: Pod").unwrap();
        let batch_dir = batch.path().to_path_buf();
        batch.discard();

        assert!(!batch_dir.exists());
        assert_eq!(names(dir.path()), vec!["b-req.yaml"]);
    }

    #[test]
    fn test_restore_returns_entries_and_keeps_newer() {
        let dir = tempfile::tempdir().unwrap();
        let spool = Spool::new(dir.path());
        fs::write(dir.path().join("a-req.yaml"), "old").unwrap();
        fs::write(dir.path().join("b-req.yaml"), "b").unwrap();

        let batch = spool.take_batch().unwrap().unwrap();
        fs::write(dir.path().join("a-req.yaml"), "new").unwrap();
        batch.restore();

        assert_eq!(names(dir.path()), vec!["a-req.yaml", "b-req.yaml"]);
        assert_eq!(fs::read_to_string(dir.path().join("a-req.yaml")).unwrap(), "new");
    }

    #[test]
    fn test_admitted_manifest_is_not_taken_until_released() {
        let dir = tempfile::tempdir().unwrap();
        let spool = std::sync::Arc::new(Spool::new(dir.path()));
        let manifest = dir.path().join(format!("{UID}-req.yaml"));
        let (written_tx, written_rx) = std::sync::mpsc::channel();

        let request = {
            let spool = std::sync::Arc::clone(&spool);
            let manifest = manifest.clone();
            std::thread::spawn(move || {
                let _admitted = spool.admit();
                fs::write(&manifest, "kind: Pod").unwrap();
                written_tx.send(()).unwrap();
                std::thread::sleep(std::time::Duration::from_millis(100));
                manifest.exists()
            })
        };

        written_rx.recv().unwrap();
        let batch = spool.take_batch().unwrap().unwrap();
        assert!(request.join().unwrap(), "manifest moved while its request was scanning");
        assert_eq!(names(batch.path()), vec![format!("{UID}-req.yaml")]);
    }

    #[test]
    fn test_cleanup_missing_directory_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        cleanup_directory(&missing);
        assert!(!missing.exists());
        assert!(!has_entries(&missing));
    }
}
