//! Admission decision and reporting engine.
//!
//! Pure decision logic: nothing here touches the network or the filesystem.
//! A request is gated by [`validate::RequestValidator`], scanned by the
//! caller, and the resulting reports are turned into a [`Verdict`] by
//! [`response::build_verdict`]. [`throttle::UploadThrottle`] rate-limits the
//! periodic upload path.

pub mod hard_fail;
pub mod response;
pub mod review;
pub mod summary;
pub mod throttle;
pub mod validate;
pub mod verdict;

pub use hard_fail::{evaluate_hard_fails, HardFailMatches, HardFailPolicy};
pub use response::{build_verdict, scan_failed_verdict};
pub use review::{object_label, AdmissionRequest, AdmissionReview, AdmissionReviewResponse};
pub use summary::{dependency_scan_lines, workload_policy_lines, DependencyTally};
pub use throttle::UploadThrottle;
pub use validate::RequestValidator;
pub use verdict::Verdict;
