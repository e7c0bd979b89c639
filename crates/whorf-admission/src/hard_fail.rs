//! Hard-fail policy evaluation.
//!
//! A finding matches the policy when its check ID or its platform check ID is
//! listed in the scanner's `hard-fail-on` option. Matches only add
//! explanatory lines to the verdict; the allow flag is decided elsewhere.

use std::collections::HashSet;

use whorf_scanner::{Finding, ScanReport, ScannerConfig};

/// Set of check IDs that must be called out when they fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardFailPolicy {
    ids: HashSet<String>,
}

impl HardFailPolicy {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new(config.hard_fail_on.iter().cloned())
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn matches(&self, finding: &Finding) -> bool {
        self.ids.contains(&finding.check_id)
            || finding
                .bc_check_id
                .as_ref()
                .is_some_and(|id| self.ids.contains(id))
    }
}

/// Matched check IDs with their detail text, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HardFailMatches {
    entries: Vec<(String, String)>,
}

impl HardFailMatches {
    /// Re-inserting an existing ID replaces its detail but keeps its position.
    pub fn insert(&mut self, check_id: String, detail: String) {
        match self.entries.iter_mut().find(|(id, _)| *id == check_id) {
            Some(entry) => entry.1 = detail,
            None => self.entries.push((check_id, detail)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, check_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == check_id)
            .map(|(_, detail)| detail.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, d)| (id.as_str(), d.as_str()))
    }

    /// Summary line followed by one `<id>:<detail>` line per match. Empty
    /// when nothing matched.
    pub fn to_lines(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut lines = Vec::with_capacity(self.len() + 1);
        lines.push(format!(
            "Checkov found {} issues in violation of admission policy.",
            self.len()
        ));
        lines.extend(self.iter().map(|(id, detail)| format!("{id}:{detail}")));
        lines
    }
}

fn detail(finding: &Finding) -> String {
    let mut detail = format!("\n  Description: {}", finding.check_name);
    if let Some(guideline) = finding.guideline.as_deref().filter(|g| !g.is_empty()) {
        detail.push_str("\n  Guidance: ");
        detail.push_str(guideline);
    }
    detail
}

/// Collects every failed finding, across all reports, that the policy names.
///
/// Reports arrive already decoded; checks the decoder could not read were
/// dropped and logged there, so evaluation itself cannot fail.
pub fn evaluate_hard_fails(reports: &[ScanReport], policy: &HardFailPolicy) -> HardFailMatches {
    let mut matches = HardFailMatches::default();
    if policy.is_empty() {
        return matches;
    }

    for finding in reports.iter().flat_map(|report| report.failed_findings()) {
        if policy.matches(finding) {
            matches.insert(finding.check_id.clone(), detail(finding));
        }
    }

    if !matches.is_empty() {
        tracing::debug!(count = matches.len(), "hard-fail policy matched");
    }
    matches
}
