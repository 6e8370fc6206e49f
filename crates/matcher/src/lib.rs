//! # Facematch matcher
//!
//! ## Purpose
//!
//! `matcher` sits on top of the identity index and answers identify()
//! calls: given a raw query embedding, find the single closest enrolled
//! identity and apply the acceptance policy (similarity threshold,
//! deterministic tie-break).
//!
//! The scan is a full linear pass over the current snapshot — correctness
//! and simplicity over scale, appropriate for registries in the low
//! thousands of identities. Both sides are pre-normalized, so scoring is a
//! plain dot product per candidate.
//!
//! ## Core Types
//!
//! - [`MatchConfig`]: the acceptance policy (similarity threshold).
//! - [`MatchEngine`]: the engine owning one index handle and one policy.
//! - [`MatchResult`]: identity-or-none, best score, accepted flag, and the
//!   index generation the decision was made against.
//! - [`MatchError`]: invalid queries and refresh failures — a failed
//!   identify is never collapsed into a "no match" result.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use index::IdentityIndex;
//! use matcher::{MatchConfig, MatchEngine};
//! use store::MemoryStore;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let index = Arc::new(IdentityIndex::new(store));
//! let engine = MatchEngine::new(index, MatchConfig::default())?;
//!
//! let query = vec![0.0_f32; 512];
//! let result = engine.identify(&query).await?;
//! println!("accepted={} score={}", result.accepted, result.score);
//! # Ok(())
//! # }
//! ```
//!
//! ## Observability
//!
//! Install a [`MatchMetrics`] implementation via [`set_match_metrics`] to
//! record per-call latency, candidate counts, and decisions. This is
//! typically done once during service startup.

pub mod engine;
pub mod metrics;
pub mod types;

pub use crate::engine::MatchEngine;
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::types::{MatchConfig, MatchError, MatchResult, SENTINEL_SCORE};
