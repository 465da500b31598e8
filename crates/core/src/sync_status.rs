//! Lifecycle of a single sync attempt.
//!
//! ```text
//! idle -> syncing -> success | error -> idle
//! ```
//!
//! Outcome states fall back to `idle` once the display delay has elapsed or
//! when the next attempt begins. Only one attempt may be in flight.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::CoreError;

/// How long a success or error outcome stays visible.
pub const DEFAULT_DISPLAY_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    Idle,
    Syncing,
    Success,
    Error,
}

/// Point-in-time view of the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSnapshot {
    pub phase: SyncPhase,
    pub message: Option<String>,
}

#[derive(Debug)]
pub struct SyncTracker {
    phase: SyncPhase,
    message: Option<String>,
    settled_at: Option<Instant>,
    display_delay: Duration,
}

impl Default for SyncTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_DELAY)
    }
}

impl SyncTracker {
    pub fn new(display_delay: Duration) -> Self {
        Self {
            phase: SyncPhase::Idle,
            message: None,
            settled_at: None,
            display_delay,
        }
    }

    /// Enter `syncing`. Fails with [`CoreError::Conflict`] if an attempt is
    /// already running.
    pub fn begin(&mut self, message: impl Into<String>) -> Result<(), CoreError> {
        if self.phase == SyncPhase::Syncing {
            return Err(CoreError::Conflict("A sync is already in progress".into()));
        }
        self.phase = SyncPhase::Syncing;
        self.message = Some(message.into());
        self.settled_at = None;
        Ok(())
    }

    pub fn succeed(&mut self, message: impl Into<String>, now: Instant) {
        self.settle(SyncPhase::Success, message.into(), now);
    }

    pub fn fail(&mut self, message: impl Into<String>, now: Instant) {
        self.settle(SyncPhase::Error, message.into(), now);
    }

    pub fn is_syncing(&self) -> bool {
        self.phase == SyncPhase::Syncing
    }

    /// Current state as of `now`, applying the auto-revert to `idle`.
    pub fn snapshot(&self, now: Instant) -> SyncSnapshot {
        let expired = self
            .settled_at
            .is_some_and(|at| now.saturating_duration_since(at) >= self.display_delay);

        if expired {
            SyncSnapshot {
                phase: SyncPhase::Idle,
                message: None,
            }
        } else {
            SyncSnapshot {
                phase: self.phase,
                message: self.message.clone(),
            }
        }
    }

    fn settle(&mut self, phase: SyncPhase, message: String, now: Instant) {
        self.phase = phase;
        self.message = Some(message);
        self.settled_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn starts_idle() {
        let tracker = SyncTracker::default();
        assert_eq!(tracker.snapshot(Instant::now()).phase, SyncPhase::Idle);
    }

    #[test]
    fn success_reverts_after_delay() {
        let mut tracker = SyncTracker::new(Duration::from_secs(2));
        tracker.begin("Backing up...").unwrap();
        assert!(tracker.is_syncing());

        let t0 = Instant::now();
        tracker.succeed("Backup complete", t0);

        let shown = tracker.snapshot(t0 + Duration::from_secs(1));
        assert_eq!(shown.phase, SyncPhase::Success);
        assert_eq!(shown.message.as_deref(), Some("Backup complete"));

        let later = tracker.snapshot(t0 + Duration::from_secs(2));
        assert_eq!(later.phase, SyncPhase::Idle);
        assert_eq!(later.message, None);
    }

    #[test]
    fn concurrent_begin_is_rejected() {
        let mut tracker = SyncTracker::default();
        tracker.begin("first").unwrap();
        assert_matches!(tracker.begin("second"), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn next_action_clears_error() {
        let mut tracker = SyncTracker::default();
        tracker.begin("restore").unwrap();
        let now = Instant::now();
        tracker.fail("No backup found", now);
        assert_eq!(tracker.snapshot(now).phase, SyncPhase::Error);

        tracker.begin("retry").unwrap();
        assert_eq!(tracker.snapshot(now).phase, SyncPhase::Syncing);
    }
}
