//! AdmissionReview wire types (`admission.k8s.io/v1`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::verdict::Verdict;

pub const API_VERSION: &str = "admission.k8s.io/v1";
pub const KIND: &str = "AdmissionReview";

/// Inbound review document. Only the fields the webhook reads are modelled;
/// everything else in the payload is ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdmissionReview {
    pub request: AdmissionRequest,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AdmissionRequest {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub object: Value,
}

impl AdmissionRequest {
    pub fn uid(&self) -> &str {
        self.uid.as_deref().unwrap_or_default()
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }
}

/// `<kind>/<metadata.name>` of a manifest, used in log lines.
pub fn object_label(object: &Value) -> String {
    let kind = object.get("kind").and_then(Value::as_str).unwrap_or("Unknown");
    let name = object
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    format!("{kind}/{name}")
}

/// Outbound review document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionReviewResponse {
    pub api_version: String,
    pub kind: String,
    pub response: ReviewResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub allowed: bool,
    pub uid: String,
    pub status: ReviewStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStatus {
    pub code: u16,
    pub message: String,
}

impl From<&Verdict> for AdmissionReviewResponse {
    fn from(verdict: &Verdict) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            response: ReviewResponse {
                allowed: verdict.allowed,
                uid: verdict.uid.clone(),
                status: ReviewStatus {
                    code: verdict.status_code(),
                    message: verdict.message(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_review() {
        let raw = json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview",
            "request": {
                "uid": "13b390aa-ea59-48ef-9fb8-069bf0430dce",
                "namespace": "nginx",
                "operation": "CREATE",
                "object": {"kind": "Deployment", "metadata": {"name": "nginx"}}
            }
        });
        let review: AdmissionReview = serde_json::from_value(raw).unwrap();
        assert_eq!(review.request.uid(), "13b390aa-ea59-48ef-9fb8-069bf0430dce");
        assert_eq!(review.request.namespace(), "nginx");
        assert_eq!(object_label(&review.request.object), "Deployment/nginx");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let review: AdmissionReview = serde_json::from_value(json!({"request": {}})).unwrap();
        assert_eq!(review.request.uid(), "");
        assert_eq!(review.request.namespace(), "");
        assert_eq!(object_label(&review.request.object), "Unknown/unknown");
    }

    #[test]
    fn test_response_wire_shape() {
        let verdict = Verdict::deny("abc", "Invalid UID. Aborting validation");
        let value = serde_json::to_value(AdmissionReviewResponse::from(&verdict)).unwrap();
        assert_eq!(
            value,
            json!({
                "apiVersion": "admission.k8s.io/v1",
                "kind": "AdmissionReview",
                "response": {
                    "allowed": false,
                    "uid": "abc",
                    "status": {"code": 403, "message": "Invalid UID. Aborting validation"}
                }
            })
        );
    }
}
