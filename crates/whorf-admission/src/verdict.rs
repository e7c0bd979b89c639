//! Admission verdict.

/// HTTP-style status code of an allowed request.
pub const STATUS_ALLOWED: u16 = 200;
/// HTTP-style status code of a denied request.
pub const STATUS_DENIED: u16 = 403;

/// Outcome of one admission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub allowed: bool,
    /// Request UID, echoed back unchanged
    pub uid: String,
    pub messages: Vec<String>,
}

impl Verdict {
    pub fn new(allowed: bool, uid: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            allowed,
            uid: uid.into(),
            messages,
        }
    }

    pub fn allow(uid: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(true, uid, vec![message.into()])
    }

    pub fn deny(uid: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(false, uid, vec![message.into()])
    }

    pub fn status_code(&self) -> u16 {
        if self.allowed {
            STATUS_ALLOWED
        } else {
            STATUS_DENIED
        }
    }

    /// Message lines joined with `\n`.
    pub fn message(&self) -> String {
        self.messages.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Verdict::allow("u", "ok").status_code(), 200);
        assert_eq!(Verdict::deny("u", "no").status_code(), 403);
    }

    #[test]
    fn test_message_joins_lines() {
        let v = Verdict::new(false, "u", vec!["a".into(), "b".into()]);
        assert_eq!(v.message(), "a\nb");
    }
}
