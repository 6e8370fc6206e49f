use std::sync::Arc;

use chrono::Utc;
use matcher::MatchResult;
use store::{AttendanceEvent, EnrollmentStore, EventFilter, EventKind, StoreError};
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by strict event recording.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// The event was constructed but could not be persisted.
    #[error("failed to persist attendance event: {0}")]
    Persistence(#[from] StoreError),
}

/// Writes one immutable attendance event per identify outcome.
///
/// Both accepted and rejected attempts are recorded; a rejected attempt
/// carries no identity. Persistence is a side effect of matching, never a
/// precondition — see [`record_best_effort`](Self::record_best_effort).
pub struct AttendanceRecorder {
    store: Arc<dyn EnrollmentStore>,
}

impl AttendanceRecorder {
    pub fn new(store: Arc<dyn EnrollmentStore>) -> Self {
        Self { store }
    }

    /// The event this outcome maps to, stamped now.
    pub fn build_event(result: &MatchResult, camera_id: &str, kind: EventKind) -> AttendanceEvent {
        AttendanceEvent {
            identity: if result.accepted {
                result.identity.clone()
            } else {
                None
            },
            camera_id: camera_id.to_string(),
            kind,
            similarity: result.score,
            accepted: result.accepted,
            recorded_at: Utc::now(),
        }
    }

    /// Construct and persist the event, surfacing persistence failures.
    pub async fn record(
        &self,
        result: &MatchResult,
        camera_id: &str,
        kind: EventKind,
    ) -> Result<AttendanceEvent, RecorderError> {
        let event = Self::build_event(result, camera_id, kind);
        self.store.insert_attendance_event(&event).await?;
        Ok(event)
    }

    /// Construct and persist the event; a persistence failure is logged and
    /// the event is still returned. The boolean reports whether the write
    /// landed.
    pub async fn record_best_effort(
        &self,
        result: &MatchResult,
        camera_id: &str,
        kind: EventKind,
    ) -> (AttendanceEvent, bool) {
        let event = Self::build_event(result, camera_id, kind);
        match self.store.insert_attendance_event(&event).await {
            Ok(()) => (event, true),
            Err(err) => {
                warn!(camera_id, error = %err, "failed to persist attendance event");
                (event, false)
            }
        }
    }

    /// Recorded events, newest first.
    pub async fn recent_events(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<AttendanceEvent>, RecorderError> {
        Ok(self.store.list_attendance_events(filter).await?)
    }
}
