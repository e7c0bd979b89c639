//! Request gate run before any scanning.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::verdict::Verdict;

pub const INVALID_UID_MESSAGE: &str = "Invalid UID. Aborting validation";
pub const IGNORED_NAMESPACE_MESSAGE: &str = "Namespace in ignore list. Ignoring validation";

/// The UID names files in the spool directory, so only the canonical
/// lower-case UUID shape is accepted.
const UID_PATTERN: &str = r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";

fn uid_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(UID_PATTERN).ok()).as_ref()
}

pub fn is_valid_uid(uid: &str) -> bool {
    uid_regex().is_some_and(|re| re.is_match(uid))
}

#[derive(Debug, Clone, Default)]
pub struct RequestValidator {
    ignored_namespaces: HashSet<String>,
}

impl RequestValidator {
    pub fn new<I, S>(ignored_namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ignored_namespaces: ignored_namespaces.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_ignored(&self, namespace: &str) -> bool {
        self.ignored_namespaces.contains(namespace)
    }

    /// Returns a final verdict when the request must not be scanned, `None`
    /// to continue. The UID is checked before the namespace.
    pub fn validate(&self, namespace: &str, uid: &str) -> Option<Verdict> {
        if is_valid_uid(uid) {
            tracing::info!("Valid UID Found, continuing");
        } else {
            tracing::error!("K8s UID failed security checks. Request rejected!");
            return Some(Verdict::deny(uid, INVALID_UID_MESSAGE));
        }

        if self.is_ignored(namespace) {
            tracing::error!(namespace, "Namespace in ignore list. Ignoring validation!");
            return Some(Verdict::allow(uid, IGNORED_NAMESPACE_MESSAGE));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UID: &str = "13b390aa-ea59-48ef-9fb8-069bf0430dce";

    #[test]
    fn test_valid_request_passes_through() {
        let validator = RequestValidator::new(["default"]);
        assert!(validator.validate("my-namespace", UID).is_none());
    }

    #[test]
    fn test_invalid_uids_are_denied() {
        let validator = RequestValidator::new(["default"]);
        for uid in [
            "",
            "abc",
            "13b390aa-ea59-48ef-9fb8",
            "13B390AA-EA59-48EF-9FB8-069BF0430DCE",
            "13b390aa-ea59-48ef-9fb8-069bf0430dce/../../etc",
            "../13b390aa-ea59-48ef-9fb8-069bf0430dce",
            "13b390aa-ea59-48ef-9fb8-069bf0430dcz",
        ] {
            let verdict = validator.validate("my-namespace", uid).unwrap();
            assert!(!verdict.allowed, "uid {uid:?} should be denied");
            assert_eq!(verdict.message(), INVALID_UID_MESSAGE);
            assert_eq!(verdict.status_code(), 403);
            assert_eq!(verdict.uid, uid);
        }
    }

    #[test]
    fn test_ignored_namespace_is_allowed() {
        let validator = RequestValidator::new(["default", "kube-system"]);
        for namespace in ["default", "kube-system"] {
            let verdict = validator.validate(namespace, UID).unwrap();
            assert!(verdict.allowed);
            assert_eq!(verdict.message(), IGNORED_NAMESPACE_MESSAGE);
            assert_eq!(verdict.status_code(), 200);
        }
    }

    #[test]
    fn test_ignored_namespace_does_not_bypass_uid_check() {
        let validator = RequestValidator::new(["default"]);
        for uid in ["../x", "", "not-a-uid"] {
            let verdict = validator.validate("default", uid).unwrap();
            assert!(!verdict.allowed);
            assert_eq!(verdict.message(), INVALID_UID_MESSAGE);
            assert_eq!(verdict.status_code(), 403);
        }
    }

    #[test]
    fn test_empty_ignore_list() {
        let validator = RequestValidator::default();
        assert!(validator.validate("default", UID).is_none());
        assert!(!validator.is_ignored(""));
    }
}
