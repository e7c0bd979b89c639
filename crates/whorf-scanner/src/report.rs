//! Decoding of the engine's JSON output into `ScanReport`s.
//!
//! The engine prints either a single report object or an array of them:
//!
//! ```json
//! [{"check_type": "kubernetes",
//!   "results": {"failed_checks": [{"check_id": "CKV_K8S_16", ...}], "passed_checks": []}}]
//! ```
//!
//! Decoding is best-effort: a check or report that does not decode is logged
//! and dropped, everything else is kept.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ScanError;
use crate::types::{CheckResult, CheckType, Finding, ScanReport, Severity};

#[derive(Debug, Deserialize)]
struct RawReport {
    check_type: Option<String>,
    #[serde(default)]
    results: RawResults,
}

#[derive(Debug, Default, Deserialize)]
struct RawResults {
    #[serde(default)]
    failed_checks: Vec<Value>,
    #[serde(default)]
    passed_checks: Vec<Value>,
    #[serde(default)]
    skipped_checks: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawCheck {
    check_id: String,
    #[serde(default)]
    bc_check_id: Option<String>,
    #[serde(default)]
    check_name: Option<String>,
    #[serde(default)]
    guideline: Option<String>,
    #[serde(default)]
    severity: Option<String>,
}

impl RawCheck {
    fn into_finding(self, result: CheckResult) -> Finding {
        Finding {
            check_id: self.check_id,
            bc_check_id: self.bc_check_id.filter(|id| !id.is_empty()),
            check_name: self.check_name.unwrap_or_default(),
            guideline: self.guideline.filter(|g| !g.is_empty()),
            severity: self.severity.as_deref().map(Severity::parse),
            result,
        }
    }
}

/// Parse the engine's stdout.
///
/// Fails only when the output is not JSON at all.
pub fn parse_reports(output: &str) -> Result<Vec<ScanReport>, ScanError> {
    let value: Value = serde_json::from_str(output.trim())?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    Ok(items.into_iter().filter_map(decode_report).collect())
}

fn decode_report(item: Value) -> Option<ScanReport> {
    let raw: RawReport = match serde_json::from_value(item) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!("Skipping undecodable scan report: {}", e);
            return None;
        }
    };
    // The engine prints a bare summary object when nothing was scanned.
    let check_type = CheckType::parse(&raw.check_type?);

    let mut report = ScanReport::new(check_type);
    let groups = [
        (raw.results.failed_checks, CheckResult::Failed, "failed"),
        (raw.results.passed_checks, CheckResult::Passed, "passed"),
        (raw.results.skipped_checks, CheckResult::Skipped, "skipped"),
    ];
    for (checks, result, label) in groups {
        for check in checks {
            match serde_json::from_value::<RawCheck>(check) {
                Ok(raw_check) => report.findings.push(raw_check.into_finding(result)),
                Err(e) => tracing::error!(
                    "Skipping undecodable {} check in {} report: {}",
                    label,
                    report.check_type,
                    e
                ),
            }
        }
    }
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MULTI: &str = r#"[
      {"check_type": "kubernetes",
       "results": {
         "failed_checks": [{
           "check_id": "CKV_K8S_16", "bc_check_id": "BC_K8S_15",
           "check_name": "Container should not be privileged",
           "guideline": "https://docs.example/privileged", "severity": null
         }],
         "passed_checks": [{"check_id": "CKV_K8S_20", "check_name": "escalation"}]
       },
       "summary": {"passed": 1, "failed": 1}},
      {"check_type": "sca_image",
       "results": {"failed_checks": [
         {"check_id": "BC_VUL_1", "bc_check_id": "BC_CVE_2022_3970", "check_name": "SCA package scan", "severity": "CRITICAL"},
         {"check_id": "BC_LIC_2", "check_name": "SCA license"}
       ]}}
    ]"#;

    #[test]
    fn test_parse_multiple_reports() {
        let reports = parse_reports(MULTI).unwrap();
        assert_eq!(reports.len(), 2);

        let k8s = &reports[0];
        assert_eq!(k8s.check_type, CheckType::WorkloadPolicy);
        assert_eq!(k8s.findings.len(), 2);
        assert_eq!(k8s.failed_count(), 1);
        let privileged = &k8s.findings[0];
        assert_eq!(privileged.bc_check_id.as_deref(), Some("BC_K8S_15"));
        assert_eq!(privileged.severity, None);
        assert!(privileged.guideline.is_some());

        let sca = &reports[1];
        assert_eq!(sca.check_type, CheckType::DependencyScan);
        assert_eq!(sca.findings[0].severity, Some(Severity::Critical));
    }

    #[test]
    fn test_parse_single_object() {
        let reports =
            parse_reports(r#"{"check_type": "kubernetes", "results": {"failed_checks": []}}"#)
                .unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].failed_count(), 0);
    }

    #[test]
    fn test_summary_only_output_yields_no_reports() {
        let reports = parse_reports(
            r#"{"passed": 0, "failed": 0, "skipped": 0, "parsing_errors": 0, "resource_count": 0}"#,
        )
        .unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_undecodable_check_is_dropped() {
        let reports = parse_reports(
            r#"{"check_type": "kubernetes", "results": {"failed_checks": [
                {"check_name": "missing id"},
                {"check_id": "CKV_K8S_16", "check_name": "privileged"}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(reports[0].failed_count(), 1);
        assert_eq!(reports[0].findings[0].check_id, "CKV_K8S_16");
    }

    #[test]
    fn test_non_json_output_is_an_error() {
        assert!(matches!(
            parse_reports("Traceback (most recent call last)"),
            Err(ScanError::Output(_))
        ));
    }
}
