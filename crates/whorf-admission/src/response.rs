//! Verdict assembly from scan reports.

use whorf_scanner::{CheckType, ScanReport};

use crate::hard_fail::{evaluate_hard_fails, HardFailPolicy};
use crate::summary::{dependency_scan_lines, first_of, workload_policy_lines};
use crate::verdict::Verdict;

pub const SCAN_FAILED_MESSAGE: &str = "Checkov scan failed. Request rejected";

/// Denied when the first workload-policy report has a failed finding. A
/// missing workload-policy report counts as a pass, and hard-fail matches
/// never change the decision on their own.
fn is_allowed(reports: &[ScanReport]) -> bool {
    first_of(reports, CheckType::WorkloadPolicy).map_or(true, |report| report.failed_count() == 0)
}

pub fn build_verdict(
    reports: &[ScanReport],
    policy: &HardFailPolicy,
    uid: &str,
    object_label: &str,
) -> Verdict {
    let mut messages = evaluate_hard_fails(reports, policy).to_lines();
    messages.extend(workload_policy_lines(reports));
    messages.extend(dependency_scan_lines(reports));

    let allowed = is_allowed(reports);
    if allowed {
        tracing::info!("Object {object_label} passed security checks. Allowing the request.");
    } else {
        tracing::error!("Object {object_label} failed security checks. Request rejected!");
    }

    Verdict::new(allowed, uid, messages)
}

/// Verdict for a request whose scan could not be completed.
pub fn scan_failed_verdict(uid: &str, object_label: &str) -> Verdict {
    tracing::error!("Object {object_label} could not be scanned. Request rejected!");
    Verdict::deny(uid, SCAN_FAILED_MESSAGE)
}
