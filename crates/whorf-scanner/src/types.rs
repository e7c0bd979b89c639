//! Scan report and finding types.

use serde::{Serialize, Serializer};
use std::fmt;

/// Scan category of a report
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CheckType {
    /// Kubernetes manifest security/compliance rules
    WorkloadPolicy,
    /// Container image package vulnerabilities and licenses
    DependencyScan,
    /// Any other framework the engine reports on
    Other(String),
}

impl CheckType {
    pub fn parse(name: &str) -> Self {
        match name {
            "kubernetes" => CheckType::WorkloadPolicy,
            "sca_image" => CheckType::DependencyScan,
            other => CheckType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CheckType::WorkloadPolicy => "kubernetes",
            CheckType::DependencyScan => "sca_image",
            CheckType::Other(name) => name,
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for CheckType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Finding severity. Names the engine sends that are not one of the four
/// tallied classes are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Other(String),
}

impl Severity {
    /// Parse a severity name, case-insensitively.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "CRITICAL" => Severity::Critical,
            "HIGH" => Severity::High,
            "MEDIUM" => Severity::Medium,
            "LOW" => Severity::Low,
            _ => Severity::Other(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
            Severity::Other(name) => name,
        }
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckResult {
    Passed,
    Failed,
    Skipped,
}

/// A single rule evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    /// Primary check identifier, e.g. `CKV_K8S_16` or `BC_VUL_1`
    pub check_id: String,
    /// Upstream (platform) identifier, e.g. `BC_K8S_15`
    pub bc_check_id: Option<String>,
    pub check_name: String,
    pub guideline: Option<String>,
    pub severity: Option<Severity>,
    pub result: CheckResult,
}

impl Finding {
    pub fn failed(check_id: impl Into<String>, check_name: impl Into<String>) -> Self {
        Self {
            check_id: check_id.into(),
            bc_check_id: None,
            check_name: check_name.into(),
            guideline: None,
            severity: None,
            result: CheckResult::Failed,
        }
    }

    pub fn with_bc_check_id(mut self, id: impl Into<String>) -> Self {
        self.bc_check_id = Some(id.into());
        self
    }

    pub fn with_guideline(mut self, guideline: impl Into<String>) -> Self {
        self.guideline = Some(guideline.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_result(mut self, result: CheckResult) -> Self {
        self.result = result;
        self
    }

    pub fn is_failed(&self) -> bool {
        self.result == CheckResult::Failed
    }
}

/// All findings of one scan category from one engine run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanReport {
    pub check_type: CheckType,
    pub findings: Vec<Finding>,
}

impl ScanReport {
    pub fn new(check_type: CheckType) -> Self {
        Self {
            check_type,
            findings: Vec::new(),
        }
    }

    pub fn with_finding(mut self, finding: Finding) -> Self {
        self.findings.push(finding);
        self
    }

    pub fn failed_findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.is_failed())
    }

    pub fn failed_count(&self) -> usize {
        self.failed_findings().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_type_parse() {
        assert_eq!(CheckType::parse("kubernetes"), CheckType::WorkloadPolicy);
        assert_eq!(CheckType::parse("sca_image"), CheckType::DependencyScan);
        assert_eq!(
            CheckType::parse("helm"),
            CheckType::Other("helm".to_string())
        );
        assert_eq!(CheckType::DependencyScan.to_string(), "sca_image");
    }

    #[test]
    fn test_severity_parse_is_case_insensitive() {
        assert_eq!(Severity::parse("critical"), Severity::Critical);
        assert_eq!(Severity::parse("HIGH"), Severity::High);
        assert_eq!(
            Severity::parse("INFO"),
            Severity::Other("INFO".to_string())
        );
    }

    #[test]
    fn test_failed_count_ignores_passed() {
        let report = ScanReport::new(CheckType::WorkloadPolicy)
            .with_finding(Finding::failed("CKV_K8S_16", "privileged"))
            .with_finding(Finding::failed("CKV_K8S_20", "escalation").with_result(CheckResult::Passed));
        assert_eq!(report.failed_count(), 1);
    }

    #[test]
    fn test_finding_serializes_flat_severity() {
        let f = Finding::failed("BC_VUL_1", "pkg").with_severity(Severity::Critical);
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["severity"], "CRITICAL");
        assert_eq!(json["result"], "FAILED");
    }
}
