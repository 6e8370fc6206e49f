use codec::CodecError;
use index::IndexError;
use serde::{Deserialize, Serialize};
use store::IdentityId;
use thiserror::Error;

/// Score reported when the index has no enrolled identities to scan.
pub const SENTINEL_SCORE: f32 = -1.0;

/// Acceptance policy for identify calls.
///
/// Serde-friendly and cheap to clone so it can be embedded in higher-level
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchConfig {
    /// Minimum cosine similarity for a match to be accepted. The recognized
    /// operating range for this embedding space is roughly 0.35–0.45; the
    /// value is deployment-tuned configuration, not a constant.
    #[serde(default = "MatchConfig::default_threshold")]
    pub threshold: f32,
}

impl MatchConfig {
    pub(crate) fn default_threshold() -> f32 {
        0.38
    }

    pub fn with_threshold(threshold: f32) -> Self {
        Self { threshold }
    }

    /// Validate the policy before an engine is built around it.
    pub fn validate(&self) -> Result<(), MatchError> {
        if !self.threshold.is_finite() || !(-1.0..=1.0).contains(&self.threshold) {
            return Err(MatchError::InvalidConfig(format!(
                "threshold must be a finite value in [-1.0, 1.0], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            threshold: Self::default_threshold(),
        }
    }
}

/// Outcome of a single identify call.
///
/// Ephemeral — consumed by the attendance recorder, never persisted as-is.
/// A rejected attempt carries the best score observed but no identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchResult {
    /// Best-scoring identity, present only when the match was accepted.
    pub identity: Option<IdentityId>,
    /// Display name of the accepted identity.
    pub name: Option<String>,
    /// Badge/employee code of the accepted identity.
    pub code: Option<String>,
    /// Best cosine similarity observed, in [-1, 1], or [`SENTINEL_SCORE`]
    /// when the index was empty.
    pub score: f32,
    /// Whether `score` met the configured threshold.
    pub accepted: bool,
    /// Index generation the decision was made against.
    pub generation: u64,
}

/// Errors produced by the matching layer.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Invalid acceptance policy.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// The query vector failed dimension or finiteness validation. Never
    /// retried; the caller must supply a corrected input.
    #[error("invalid query embedding: {0}")]
    InvalidEmbedding(#[from] CodecError),
    /// The lazy first refresh could not reach the enrollment store. Distinct
    /// from a valid "no match" result by construction.
    #[error("identify failed: {0}")]
    Refresh(#[from] IndexError),
}
