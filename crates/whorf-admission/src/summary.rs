//! Message lines summarising scan reports by category.

use whorf_scanner::{CheckType, ScanReport, Severity};

pub const LICENSE_PREFIX: &str = "BC_LIC_";
pub const VULNERABILITY_PREFIX: &str = "BC_VUL_";

/// First report of `check_type`; later reports of the same category are ignored
/// by both the renderers and the allow decision.
pub(crate) fn first_of(reports: &[ScanReport], check_type: CheckType) -> Option<&ScanReport> {
    reports.iter().find(|report| report.check_type == check_type)
}

/// `"Checkov found <n> total issues in this manifest."` for the first
/// workload-policy report, nothing when there is none.
pub fn workload_policy_lines(reports: &[ScanReport]) -> Vec<String> {
    first_of(reports, CheckType::WorkloadPolicy)
        .map(|report| {
            vec![format!(
                "Checkov found {} total issues in this manifest.",
                report.failed_count()
            )]
        })
        .unwrap_or_default()
}

/// Failed image findings split into license violations and CVEs by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyTally {
    pub licenses: usize,
    pub cves: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl DependencyTally {
    pub fn from_report(report: &ScanReport) -> Self {
        let mut tally = Self::default();
        for finding in report.failed_findings() {
            let id = finding.check_id.as_str();
            if id.starts_with(LICENSE_PREFIX) {
                tally.licenses += 1;
            } else if id.starts_with(VULNERABILITY_PREFIX) {
                tally.cves += 1;
                match &finding.severity {
                    Some(Severity::Critical) => tally.critical += 1,
                    Some(Severity::High) => tally.high += 1,
                    Some(Severity::Medium) => tally.medium += 1,
                    Some(Severity::Low) => tally.low += 1,
                    Some(Severity::Other(name)) => {
                        tracing::warn!("Unexpected severity {name} received")
                    }
                    None => {}
                }
            } else {
                tracing::warn!("Unexpected check ID {id} received");
            }
        }
        tally
    }

    pub fn to_lines(&self) -> Vec<String> {
        vec![
            format!(
                "Checkov found {} CVEs in container images of which are {} critical, {} high, {} medium and {} low.",
                self.cves, self.critical, self.high, self.medium, self.low
            ),
            format!(
                "Checkov found {} license violations in container images.",
                self.licenses
            ),
        ]
    }
}

/// CVE and license lines for the first dependency-scan report, nothing when
/// there is none.
pub fn dependency_scan_lines(reports: &[ScanReport]) -> Vec<String> {
    first_of(reports, CheckType::DependencyScan)
        .map(|report| DependencyTally::from_report(report).to_lines())
        .unwrap_or_default()
}
