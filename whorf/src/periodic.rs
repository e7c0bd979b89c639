//! Periodic re-scan of the manifest spool with result upload.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use whorf_scanner::{ScanTarget, UploadMode};

use crate::spool;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Nothing spooled
    Empty,
    /// Upload not due yet; manifests stay for the next window
    Throttled,
    /// Scanned and uploaded; the scanned entries were removed
    Uploaded,
    /// Scan failed; entries were put back and the throttle is untouched
    Failed,
}

/// One re-scan pass. Blocks for the duration of the scan.
///
/// Only the entries present when the pass starts are scanned and removed;
/// anything spooled while the scan runs waits for the next pass.
pub fn rescan_pass(state: &AppState) -> PassOutcome {
    let root = state.manifest_root();
    if !spool::has_entries(root) {
        tracing::debug!("Nothing to scan in {}", root.display());
        return PassOutcome::Empty;
    }

    let result = state.throttle().run_if_due(|| -> anyhow::Result<usize> {
        let Some(batch) = state
            .spool()
            .take_batch()
            .with_context(|| format!("failed to move manifests out of {}", root.display()))?
        else {
            return Ok(0);
        };

        tracing::info!("Start scanning directory {}", batch.path().display());
        let config = state.scanner_config();
        let target = ScanTarget::Directory(batch.path().to_path_buf());
        match state.engine().run(&target, &config, UploadMode::Upload) {
            Ok(_) => {
                tracing::info!(
                    "Successfully scanned directory {} and uploaded results",
                    batch.path().display()
                );
                let count = batch.len();
                batch.discard();
                Ok(count)
            }
            Err(e) => {
                batch.restore();
                Err(e).context("Checkov scan failed")
            }
        }
    });

    match result {
        None => {
            tracing::debug!("Upload throttled, keeping manifests in {}", root.display());
            PassOutcome::Throttled
        }
        Some(Ok(0)) => PassOutcome::Empty,
        Some(Ok(count)) => {
            tracing::debug!(count, "spooled entries uploaded");
            PassOutcome::Uploaded
        }
        Some(Err(e)) => {
            tracing::error!("Periodic scan of {} failed: {e:#}", root.display());
            PassOutcome::Failed
        }
    }
}

/// Run [`rescan_pass`] every `every`, starting one period from now. A pass
/// that overruns its period delays the next one rather than overlapping it.
pub fn spawn(state: Arc<AppState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let pass_state = Arc::clone(&state);
            match tokio::task::spawn_blocking(move || rescan_pass(&pass_state)).await {
                Ok(outcome) => tracing::debug!(?outcome, "periodic pass finished"),
                Err(e) => tracing::error!("periodic pass aborted: {e}"),
            }
        }
    })
}
