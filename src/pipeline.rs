use std::sync::Arc;

use attendance::{
    AttendanceRecorder, EnrollError, EnrollRequest, EnrollmentManager, EnrollmentSummary,
    RecorderError,
};
use index::IdentityIndex;
use matcher::{MatchConfig, MatchEngine, MatchError, MatchResult};
use store::{
    AttendanceEvent, EnrollmentRecord, EnrollmentStore, EventFilter, EventKind, IdentityId,
    StoreError,
};
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigLoadError, FacematchConfig};
use crate::embedder::{EmbedderError, FaceEmbedder};

/// Errors from the end-to-end pipeline facade, one variant per stage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("embedder failure: {0}")]
    Embedder(#[from] EmbedderError),
    #[error("match failure: {0}")]
    Match(#[from] MatchError),
    #[error("enrollment failure: {0}")]
    Enroll(#[from] EnrollError),
    #[error("recording failure: {0}")]
    Record(#[from] RecorderError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
    #[error("configuration failure: {0}")]
    Config(#[from] ConfigLoadError),
}

/// Outcome of one recognize call: the decision plus the event constructed
/// for it. `event_persisted` reports the best-effort telemetry write; the
/// decision stands either way.
#[derive(Debug, Clone)]
pub struct RecognizeOutcome {
    pub result: MatchResult,
    pub event: AttendanceEvent,
    pub event_persisted: bool,
}

/// End-to-end wiring of embedder → matcher → recorder over one shared
/// store and one identity index.
pub struct AttendancePipeline {
    embedder: Arc<dyn FaceEmbedder>,
    engine: MatchEngine,
    recorder: AttendanceRecorder,
    enrollment: EnrollmentManager,
}

impl AttendancePipeline {
    /// Build a pipeline from a loaded config and an embedder collaborator.
    pub fn from_config(
        config: &FacematchConfig,
        embedder: Arc<dyn FaceEmbedder>,
    ) -> Result<Self, PipelineError> {
        let store = config.store_config()?.build()?;
        Self::new(store, embedder, config.match_config())
    }

    /// Build a pipeline over an explicit store, embedder, and match policy.
    pub fn new(
        store: Arc<dyn EnrollmentStore>,
        embedder: Arc<dyn FaceEmbedder>,
        match_cfg: MatchConfig,
    ) -> Result<Self, PipelineError> {
        let index = Arc::new(IdentityIndex::new(Arc::clone(&store)));
        let engine = MatchEngine::new(Arc::clone(&index), match_cfg)?;
        Ok(Self {
            embedder,
            engine,
            recorder: AttendanceRecorder::new(Arc::clone(&store)),
            enrollment: EnrollmentManager::new(store, index),
        })
    }

    /// Detect and embed the image, resolve the identity, and record the
    /// attempt. The decision is returned even when the event write is
    /// degraded; a missing face or an I/O failure during the lazy refresh
    /// surfaces as an error instead of a rejected match.
    pub async fn recognize(
        &self,
        image: &[u8],
        camera_id: &str,
        kind: EventKind,
    ) -> Result<RecognizeOutcome, PipelineError> {
        let embedding = self.embedder.detect_and_embed(image).await?;
        let result = self.engine.identify(embedding.as_slice()).await?;
        debug!(
            camera_id,
            score = result.score,
            accepted = result.accepted,
            "identify outcome"
        );
        let (event, event_persisted) = self
            .recorder
            .record_best_effort(&result, camera_id, kind)
            .await;
        Ok(RecognizeOutcome {
            result,
            event,
            event_persisted,
        })
    }

    /// Resolve a precomputed embedding without recording anything.
    pub async fn identify(&self, embedding: &[f32]) -> Result<MatchResult, PipelineError> {
        Ok(self.engine.identify(embedding).await?)
    }

    /// Enroll from a captured image.
    pub async fn enroll_image(
        &self,
        request: EnrollRequest,
        image: &[u8],
    ) -> Result<EnrollmentRecord, PipelineError> {
        let embedding = self.embedder.detect_and_embed(image).await?;
        Ok(self.enrollment.enroll(request, embedding.as_slice()).await?)
    }

    /// Enroll from a precomputed embedding.
    pub async fn enroll_embedding(
        &self,
        request: EnrollRequest,
        embedding: &[f32],
    ) -> Result<EnrollmentRecord, PipelineError> {
        Ok(self.enrollment.enroll(request, embedding).await?)
    }

    /// Remove an identity's enrollment.
    pub async fn remove(&self, identity: &IdentityId) -> Result<(), PipelineError> {
        Ok(self.enrollment.remove(identity).await?)
    }

    /// Enrolled identities, vector payloads omitted.
    pub async fn list_enrollments(&self) -> Result<Vec<EnrollmentSummary>, PipelineError> {
        Ok(self.enrollment.list().await?)
    }

    /// Recorded attendance events, newest first.
    pub async fn recent_events(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<AttendanceEvent>, PipelineError> {
        Ok(self.recorder.recent_events(filter).await?)
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn enrollment(&self) -> &EnrollmentManager {
        &self.enrollment
    }

    pub fn recorder(&self) -> &AttendanceRecorder {
        &self.recorder
    }
}
