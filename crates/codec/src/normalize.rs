use crate::types::{Embedding, NormalizedEmbedding};

/// Epsilon floor applied to the Euclidean norm so the degenerate all-zero
/// vector divides by the floor instead of by zero.
pub const NORM_EPSILON: f32 = 1e-9;

/// Scale a raw embedding to unit length.
///
/// The divisor is `max(norm, NORM_EPSILON)`, so an all-zero vector maps to
/// all zeros rather than NaN.
pub fn normalize(embedding: &Embedding) -> NormalizedEmbedding {
    let values = embedding.as_slice();
    let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
    let inv = 1.0 / norm.max(NORM_EPSILON);
    NormalizedEmbedding::from_raw(values.iter().map(|v| v * inv).collect())
}
