//! Rate limit for result uploads from the periodic re-scan.
//!
//! Two states: never uploaded, or uploaded at `t`. An upload is due when
//! nothing has been uploaded yet or at least one window has passed since `t`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

/// Default distance between two uploads.
pub fn default_window() -> Duration {
    Duration::hours(1)
}

#[derive(Debug)]
pub struct UploadThrottle {
    last_uploaded: Mutex<Option<DateTime<Utc>>>,
    window: Duration,
}

impl Default for UploadThrottle {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadThrottle {
    pub fn new() -> Self {
        Self::with_window(default_window())
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            last_uploaded: Mutex::new(None),
            window,
        }
    }

    fn state(&self) -> MutexGuard<'_, Option<DateTime<Utc>>> {
        // The guarded value is a plain timestamp; a panic elsewhere cannot
        // leave it half-written.
        self.last_uploaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_due(last: Option<DateTime<Utc>>, window: Duration, now: DateTime<Utc>) -> bool {
        match last {
            None => true,
            Some(at) => now - at >= window,
        }
    }

    pub fn last_uploaded(&self) -> Option<DateTime<Utc>> {
        *self.state()
    }

    pub fn should_upload(&self) -> bool {
        self.should_upload_at(Utc::now())
    }

    pub fn should_upload_at(&self, now: DateTime<Utc>) -> bool {
        Self::is_due(*self.state(), self.window, now)
    }

    pub fn mark_uploaded(&self) {
        self.mark_uploaded_at(Utc::now());
    }

    pub fn mark_uploaded_at(&self, at: DateTime<Utc>) {
        *self.state() = Some(at);
    }

    /// Runs `upload` only when an upload is due, holding the lock for the
    /// whole call so two callers can never both upload inside one window.
    /// The timestamp moves only when `upload` succeeds.
    ///
    /// Returns `None` when the call was throttled.
    pub fn run_if_due<T, E>(&self, upload: impl FnOnce() -> Result<T, E>) -> Option<Result<T, E>> {
        let mut state = self.state();
        if !Self::is_due(*state, self.window, Utc::now()) {
            return None;
        }
        let result = upload();
        if result.is_ok() {
            *state = Some(Utc::now());
        }
        Some(result)
    }
}
