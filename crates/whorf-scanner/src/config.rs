//! Scanner option set and the override merge policy.
//!
//! Overrides come from a YAML file keyed by the scanner's hyphenated CLI
//! option names (`hard-fail-on`, `skip-check`, ...). Each key is translated
//! to the matching `ScannerConfig` field; unknown keys are logged and skipped.
//!
//! ```yaml
//! # config/.checkov.yaml
//! framework: kubernetes
//! hard-fail-on:
//!   - CKV_K8S_16
//! skip-check:
//!   - CKV_K8S_43
//! ```

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::ScanError;

/// Option whose scalar value is coerced into a one-element list.
const FRAMEWORK_OPTION: &str = "framework";

/// Options passed to every scanner invocation.
///
/// Every field is serialized (no `skip_serializing_if`) so the serialized
/// mapping doubles as the set of supported option names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScannerConfig {
    pub framework: Vec<String>,
    pub skip_framework: Vec<String>,
    pub check: Vec<String>,
    pub skip_check: Vec<String>,
    /// Check IDs (primary or upstream) that always block admission
    pub hard_fail_on: Vec<String>,
    pub soft_fail_on: Vec<String>,
    pub external_checks_dir: Vec<String>,
    pub repo_id: Option<String>,
    pub branch: Option<String>,
    pub bc_api_key: Option<String>,
    pub prisma_api_url: Option<String>,
    pub ca_certificate: Option<String>,
    pub download_external_modules: bool,
    pub compact: bool,
    pub skip_download: bool,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            framework: vec!["kubernetes".to_string()],
            skip_framework: Vec::new(),
            check: Vec::new(),
            skip_check: Vec::new(),
            hard_fail_on: Vec::new(),
            soft_fail_on: Vec::new(),
            external_checks_dir: Vec::new(),
            repo_id: Some("k8s_ac/cluster".to_string()),
            branch: None,
            bc_api_key: None,
            prisma_api_url: None,
            ca_certificate: None,
            download_external_modules: false,
            compact: false,
            skip_download: false,
        }
    }
}

impl ScannerConfig {
    /// Default options with `overrides` merged on top.
    pub fn with_overrides(overrides: &Mapping) -> Self {
        let mut config = Self::default();
        config.merge_overrides(overrides);
        config
    }

    /// Apply every override it can; unsupported keys and bad values are
    /// logged and leave the option unchanged.
    pub fn merge_overrides(&mut self, overrides: &Mapping) {
        for (key, value) in overrides {
            let param = match key {
                Value::String(s) => s.clone(),
                other => format!("{:?}", other),
            };
            if let Err(e) = self.set_option(&param, value.clone()) {
                tracing::error!("{}", e);
            }
        }
    }

    /// Set a single option by its hyphenated name.
    pub fn set_option(&mut self, param: &str, value: Value) -> Result<(), ScanError> {
        let attr = param.replace('-', "_");

        let invalid = |source| ScanError::InvalidOptionValue {
            option: param.to_string(),
            source,
        };

        let Value::Mapping(mut current) = serde_yaml::to_value(&*self).map_err(invalid)? else {
            return Err(ScanError::UnsupportedOption(param.to_string()));
        };
        if !current.contains_key(attr.as_str()) {
            return Err(ScanError::UnsupportedOption(param.to_string()));
        }

        let value = if attr == FRAMEWORK_OPTION && !value.is_sequence() {
            Value::Sequence(vec![value])
        } else {
            value
        };
        current.insert(Value::String(attr), value);

        *self = serde_yaml::from_value(Value::Mapping(current)).map_err(invalid)?;
        Ok(())
    }

    /// Command-line arguments for the scanner, excluding the scan target,
    /// output format and upload switches.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if !self.framework.is_empty() {
            args.push("--framework".to_string());
            args.extend(self.framework.iter().cloned());
        }
        if !self.skip_framework.is_empty() {
            args.push("--skip-framework".to_string());
            args.extend(self.skip_framework.iter().cloned());
        }
        push_joined(&mut args, "--check", &self.check);
        push_joined(&mut args, "--skip-check", &self.skip_check);
        push_joined(&mut args, "--hard-fail-on", &self.hard_fail_on);
        push_joined(&mut args, "--soft-fail-on", &self.soft_fail_on);
        for dir in &self.external_checks_dir {
            args.push("--external-checks-dir".to_string());
            args.push(dir.clone());
        }
        push_opt(&mut args, "--repo-id", &self.repo_id);
        push_opt(&mut args, "--branch", &self.branch);
        push_opt(&mut args, "--bc-api-key", &self.bc_api_key);
        push_opt(&mut args, "--prisma-api-url", &self.prisma_api_url);
        push_opt(&mut args, "--ca-certificate", &self.ca_certificate);
        if self.download_external_modules {
            args.push("--download-external-modules".to_string());
            args.push("true".to_string());
        }
        if self.compact {
            args.push("--compact".to_string());
        }
        if self.skip_download {
            args.push("--skip-download".to_string());
        }
        args
    }
}

fn push_joined(args: &mut Vec<String>, flag: &str, values: &[String]) {
    if !values.is_empty() {
        args.push(flag.to_string());
        args.push(values.join(","));
    }
}

fn push_opt(args: &mut Vec<String>, flag: &str, value: &Option<String>) {
    if let Some(v) = value {
        args.push(flag.to_string());
        args.push(v.clone());
    }
}
