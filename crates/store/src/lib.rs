//! Enrollment registry contract and record types for the facematch engine.
//!
//! The engine is agnostic to the storage technology behind the registry; it
//! consumes exactly the [`EnrollmentStore`] operations and assumes
//! read-after-write consistency within its own process. Two backends ship
//! here:
//!
//! - [`MemoryStore`]: order-preserving in-memory registry for tests and
//!   ephemeral deployments (the default).
//! - [`RestStore`]: PostgREST-style client for a hosted Postgres registry
//!   (feature `backend-rest`, enabled by default).
//!
//! The engine performs no retries of its own; callers apply their own
//! backoff around transient [`StoreError::Backend`] failures.

mod backend;

pub use backend::{EnrollmentStore, MemoryStore, StoreConfig, DEFAULT_EVENT_LIMIT};
#[cfg(feature = "backend-rest")]
pub use backend::RestStore;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque, stable identifier for an enrolled person.
///
/// Matching never inspects the contents; display attributes ride separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for IdentityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One identity's reference embedding, as persisted in the registry.
///
/// At most one record exists per identity; re-enrollment overwrites in
/// place. The vector travels as wire text (`codec::encode` output) so the
/// row is directly pgvector-compatible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrollmentRecord {
    pub identity: IdentityId,
    /// Display name, presentation only.
    #[serde(default)]
    pub name: Option<String>,
    /// Short badge/employee code, presentation only.
    #[serde(default)]
    pub code: Option<String>,
    /// Encoded reference vector in the textual wire format.
    pub embedding: String,
    pub embedding_dim: usize,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Check-in versus check-out, as reported by the capture point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    CheckIn,
    CheckOut,
}

/// One immutable attendance record. Created once per identify call where
/// recording was requested; never mutated or deleted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttendanceEvent {
    /// The accepted identity, or `None` for a rejected attempt.
    pub identity: Option<IdentityId>,
    /// Camera/source label supplied by the caller.
    pub camera_id: String,
    pub kind: EventKind,
    pub similarity: f32,
    pub accepted: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Filter for reading back recorded events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    /// Restrict to one identity's events.
    pub identity: Option<IdentityId>,
    /// Maximum rows, newest first. [`DEFAULT_EVENT_LIMIT`] when unset.
    pub limit: Option<usize>,
}

/// Errors surfaced by registry backends.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("identity not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn backend<E: fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}
