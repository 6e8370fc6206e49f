use std::sync::Arc;
use std::time::Instant;

use codec::{normalize, Embedding};
use index::{IdentityIndex, IndexEntry};

use crate::metrics::metrics_recorder;
use crate::types::{MatchConfig, MatchError, MatchResult, SENTINEL_SCORE};

#[cfg(test)]
mod tests;

/// Engine answering identify() calls over one identity index.
pub struct MatchEngine {
    index: Arc<IdentityIndex>,
    cfg: MatchConfig,
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine").field("cfg", &self.cfg).finish_non_exhaustive()
    }
}

impl MatchEngine {
    /// Construct an engine from a shared index handle and a policy.
    pub fn new(index: Arc<IdentityIndex>, cfg: MatchConfig) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self { index, cfg })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    pub fn index(&self) -> &Arc<IdentityIndex> {
        &self.index
    }

    /// Identify the closest enrolled identity for a raw query vector.
    ///
    /// Pure in-memory computation except for one case: if the index has
    /// never been populated, a refresh is attempted first, and its failure
    /// is surfaced as an error rather than an empty-index "no match".
    ///
    /// O(N) in the number of enrolled identities; the snapshot taken at the
    /// start of the call is used throughout, so a concurrent refresh never
    /// changes the candidate set mid-scan.
    pub async fn identify(&self, query: &[f32]) -> Result<MatchResult, MatchError> {
        let start = Instant::now();
        let embedding = Embedding::from_slice(query)?;
        let query = normalize(&embedding);

        if !self.index.is_populated() {
            self.index.refresh().await?;
        }

        let snapshot = self.index.snapshot();
        let result = if snapshot.is_empty() {
            MatchResult {
                identity: None,
                name: None,
                code: None,
                score: SENTINEL_SCORE,
                accepted: false,
                generation: snapshot.generation(),
            }
        } else {
            let mut best: Option<&IndexEntry> = None;
            let mut best_score = f32::NEG_INFINITY;
            for entry in snapshot.entries() {
                let score = query.dot(&entry.embedding);
                // Strict `>`: the first-enrolled identity wins exact ties.
                if score > best_score {
                    best_score = score;
                    best = Some(entry);
                }
            }

            let accepted = best_score >= self.cfg.threshold;
            let matched = best.filter(|_| accepted);
            MatchResult {
                identity: matched.map(|entry| entry.identity.clone()),
                name: matched.and_then(|entry| entry.name.clone()),
                code: matched.and_then(|entry| entry.code.clone()),
                score: best_score,
                accepted,
                generation: snapshot.generation(),
            }
        };

        if let Some(recorder) = metrics_recorder() {
            recorder.record_identify(
                start.elapsed(),
                snapshot.len(),
                result.score,
                result.accepted,
            );
        }

        Ok(result)
    }
}
