//! HTTP surface: readiness page and the validating admission endpoint.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use whorf_admission::{
    build_verdict, object_label, scan_failed_verdict, AdmissionReview, AdmissionReviewResponse,
    HardFailPolicy, Verdict,
};
use whorf_scanner::{ScanReport, ScanTarget, ScannerConfig, UploadMode};

use crate::spool;
use crate::state::AppState;

pub const READY_BODY: &str = "<h1 style='color:blue'>Ready!</h1>";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(ready))
        .route("/validate", post(validate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ready() -> Html<&'static str> {
    Html(READY_BODY)
}

async fn validate(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<Value>,
) -> Result<Json<AdmissionReviewResponse>, (StatusCode, String)> {
    tracing::debug!("{raw:#}");
    let review: AdmissionReview = serde_json::from_value(raw.clone())
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("invalid AdmissionReview: {e}")))?;

    let verdict = review_request(state, review, raw).await;
    Ok(Json(AdmissionReviewResponse::from(&verdict)))
}

/// Gate, spool, scan and judge one request. Every failure after the gate
/// denies the request.
pub async fn review_request(state: Arc<AppState>, review: AdmissionReview, raw: Value) -> Verdict {
    let request = review.request;
    let uid = request.uid().to_string();

    if let Some(verdict) = state.validator().validate(request.namespace(), &uid) {
        return verdict;
    }

    let label = object_label(&request.object);
    let worker = Arc::clone(&state);
    let job_uid = uid.clone();
    let scanned =
        tokio::task::spawn_blocking(move || scan_admitted(&worker, &job_uid, &request.object, &raw))
            .await;

    match scanned {
        Ok(Ok((config, reports))) => {
            build_verdict(&reports, &HardFailPolicy::from_config(&config), &uid, &label)
        }
        Ok(Err(e)) => {
            tracing::error!(uid = %uid, "{e:#}");
            scan_failed_verdict(&uid, &label)
        }
        Err(e) => {
            tracing::error!(uid = %uid, "scan task failed: {e}");
            scan_failed_verdict(&uid, &label)
        }
    }
}

/// Spool and scan one manifest. The spool stays admitted for the whole call
/// so the periodic pass cannot move the manifest away mid-scan.
fn scan_admitted(
    state: &AppState,
    uid: &str,
    object: &Value,
    raw: &Value,
) -> anyhow::Result<(ScannerConfig, Vec<ScanReport>)> {
    let _admitted = state.spool().admit();
    let manifest = spool::write_manifest(state.manifest_root(), uid, object)?;

    tracing::info!("Start scanning file {}", manifest.display());
    let config = state.scanner_config();
    let reports = state
        .engine()
        .run(&ScanTarget::File(manifest.clone()), &config, UploadMode::Suppress)
        .context("Checkov scan failed")?;
    tracing::info!("Successfully scanned file {}", manifest.display());

    if state.debug() {
        spool::write_debug_artifacts(state.manifest_root(), uid, raw, &reports);
    }
    Ok((config, reports))
}
