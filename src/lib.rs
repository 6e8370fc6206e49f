//! # Facematch
//!
//! Face-recognition attendance engine. An external detector/embedder turns
//! a captured image into a fixed 512-dimension embedding; this crate
//! resolves it against a registry of enrolled identities and records an
//! attendance event for the outcome.
//!
//! The workspace mirrors the stages of the engine:
//!
//! - `codec` — embedding validation, the textual wire format, and L2
//!   normalization
//! - `store` — the enrollment registry contract and its backends
//! - `index` — the refreshable in-memory identity index (atomic snapshot
//!   swap, generation counter)
//! - `matcher` — linear similarity scan plus threshold acceptance
//! - `attendance` — event recording and enrollment mutation
//!
//! This umbrella crate re-exports the stages and wires them into
//! [`AttendancePipeline`], the single entry point most deployments need,
//! plus the [`FaceEmbedder`] collaborator seam and YAML configuration.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use facematch::{
//!     AttendancePipeline, EnrollRequest, EventKind, MatchConfig, MemoryStore, StubEmbedder,
//! };
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = AttendancePipeline::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(StubEmbedder),
//!     MatchConfig::default(),
//! )?;
//!
//! let photo = std::fs::read("dana.jpg")?;
//! pipeline
//!     .enroll_image(EnrollRequest::new("emp-1").with_name("Dana"), &photo)
//!     .await?;
//!
//! let frame = std::fs::read("gate-frame.jpg")?;
//! let outcome = pipeline.recognize(&frame, "gate-1", EventKind::CheckIn).await?;
//! println!(
//!     "accepted={} score={:.4} identity={:?}",
//!     outcome.result.accepted, outcome.result.score, outcome.result.identity
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
mod embedder;
mod pipeline;

pub use attendance::{
    AttendanceRecorder, EnrollError, EnrollRequest, EnrollmentManager, EnrollmentSummary,
    RecorderError,
};
pub use codec::{
    decode, encode, normalize, CodecError, Embedding, NormalizedEmbedding, EMBEDDING_DIM,
    NORM_EPSILON,
};
pub use config::{ConfigLoadError, FacematchConfig};
pub use embedder::{EmbedderError, FaceEmbedder, StubEmbedder};
pub use index::{IdentityIndex, IndexEntry, IndexError, IndexSnapshot};
pub use matcher::{
    set_match_metrics, MatchConfig, MatchEngine, MatchError, MatchMetrics, MatchResult,
    SENTINEL_SCORE,
};
pub use pipeline::{AttendancePipeline, PipelineError, RecognizeOutcome};
#[cfg(feature = "backend-rest")]
pub use store::RestStore;
pub use store::{
    AttendanceEvent, EnrollmentRecord, EnrollmentStore, EventFilter, EventKind, IdentityId,
    MemoryStore, StoreConfig, StoreError,
};
