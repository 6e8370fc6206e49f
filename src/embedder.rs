//! External face-detection and embedding collaborator seam.

use async_trait::async_trait;
use codec::{Embedding, EMBEDDING_DIM};
use fxhash::hash64;
use thiserror::Error;

/// Errors from the detection + embedding collaborator.
#[derive(Debug, Error)]
pub enum EmbedderError {
    /// The image decoded but contained no detectable face. This is not a
    /// match failure: no [`matcher::MatchResult`] can be produced at all.
    #[error("no face detected")]
    NoFaceDetected,
    /// The payload could not be decoded as an image.
    #[error("failed to decode image: {0}")]
    Decode(String),
    /// Model inference failed.
    #[error("inference failure: {0}")]
    Inference(String),
}

/// Produces a raw 512-dimension embedding from captured image bytes.
///
/// Implemented outside this engine by the detection + embedding subsystem
/// (a RetinaFace-style detector feeding an ArcFace-style embedder in the
/// reference deployment). The engine only consumes the resulting vector and
/// normalizes it itself.
#[async_trait]
pub trait FaceEmbedder: Send + Sync {
    async fn detect_and_embed(&self, image_bytes: &[u8]) -> Result<Embedding, EmbedderError>;
}

/// Deterministic stand-in embedder.
///
/// Derives a vector from a hash of the image bytes: the same bytes always
/// embed identically, which is enough for integration tests and model-free
/// smoke deployments. An empty payload reports `NoFaceDetected`.
#[derive(Debug, Default, Clone)]
pub struct StubEmbedder;

#[async_trait]
impl FaceEmbedder for StubEmbedder {
    async fn detect_and_embed(&self, image_bytes: &[u8]) -> Result<Embedding, EmbedderError> {
        if image_bytes.is_empty() {
            return Err(EmbedderError::NoFaceDetected);
        }
        let h = hash64(image_bytes);
        let mut values = vec![0f32; EMBEDDING_DIM];
        for (idx, value) in values.iter_mut().enumerate() {
            *value = ((h >> (idx % 32)) as f32 * 0.0001).sin();
        }
        Embedding::from_vec(values)
            .map_err(|err| EmbedderError::Inference(err.to_string()))
    }
}
