//! Command handlers for `whorf serve` and `whorf scan`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use whorf_admission::{build_verdict, object_label, HardFailPolicy, Verdict};
use whorf_core::config::{load_scanner_overrides, PathsConfig, ServerConfig, WhorfConfig};
use whorf_scanner::{CheckovCli, ScanEngine, ScanTarget, ScannerConfig, UploadMode};

use crate::state::AppState;
use crate::{periodic, server};

/// Run the webhook until SIGINT/SIGTERM.
pub fn serve(listen: Option<String>) -> Result<()> {
    let paths = PathsConfig::from_env();
    let server_cfg = ServerConfig::from_env();
    let settings = WhorfConfig::load(&paths.whorf_config, &paths.legacy_config)
        .context("failed to load whorf configuration")?;
    let engine = CheckovCli::locate(&server_cfg.checkov_bin)?;
    tracing::info!(
        scanner = %engine.executable().display(),
        ignored = ?settings.ignores_namespaces,
        interval_min = settings.upload_interval_in_min,
        "starting whorf"
    );

    let state = Arc::new(
        AppState::from_config(Arc::new(engine), &settings, &paths).with_debug(server_cfg.debug),
    );
    let addr = listen.unwrap_or(server_cfg.listen_addr);
    let every = Duration::from_secs(settings.upload_interval_in_min.saturating_mul(60));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    runtime.block_on(async move {
        let rescan = periodic::spawn(Arc::clone(&state), every);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        tracing::info!("Listening on {addr}");

        axum::serve(listener, server::router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        rescan.abort();
        Ok(())
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutting down");
}

/// Scan one manifest with the merged scanner options and print the message
/// lines. Returns whether the manifest would be admitted.
pub fn scan(file: &Path) -> Result<bool> {
    let paths = PathsConfig::from_env();
    let server_cfg = ServerConfig::from_env();
    let engine = CheckovCli::locate(&server_cfg.checkov_bin)?;
    let overrides = load_scanner_overrides(&paths.checkov_config)
        .context("failed to load scanner configuration")?;
    let config = ScannerConfig::with_overrides(&overrides);

    let verdict = scan_with(&engine, &config, file)?;
    for line in &verdict.messages {
        println!("{line}");
    }
    Ok(verdict.allowed)
}

/// Verdict for a local file. There is no request, so no UID and no
/// namespace gate.
pub fn scan_with(engine: &dyn ScanEngine, config: &ScannerConfig, file: &Path) -> Result<Verdict> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let label = serde_yaml::from_str::<Value>(&content)
        .map(|object| object_label(&object))
        .unwrap_or_else(|_| file.display().to_string());

    let reports = engine
        .run(&ScanTarget::File(file.to_path_buf()), config, UploadMode::Suppress)
        .with_context(|| format!("failed to scan {}", file.display()))?;
    Ok(build_verdict(&reports, &HardFailPolicy::from_config(config), "", &label))
}
