//! Attendance recording and enrollment mutation for the facematch engine.
//!
//! Two components live here, both thin layers over the enrollment store:
//!
//! - [`AttendanceRecorder`] turns a match decision into one immutable
//!   attendance event and persists it. Recording is telemetry: the decision
//!   has already been returned to the caller and is never retracted when
//!   persistence is degraded.
//! - [`EnrollmentManager`] is the sole mutator of enrollment state. It
//!   validates and normalizes an identity's reference embedding, upserts it
//!   (overwrite semantics — at most one embedding per identity), and
//!   refreshes the identity index after every confirmed write.

mod enroll;
mod recorder;

pub use crate::enroll::{
    EnrollError, EnrollRequest, EnrollmentManager, EnrollmentSummary,
};
pub use crate::recorder::{AttendanceRecorder, RecorderError};
