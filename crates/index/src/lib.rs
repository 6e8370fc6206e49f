//! In-memory identity index for the facematch engine.
//!
//! Holds the registry's enrolled identities as a point-in-time snapshot:
//! identity, display metadata, and a unit-normalized reference embedding,
//! in enrollment order. [`IdentityIndex::refresh`] rebuilds the whole
//! snapshot from the enrollment store and swaps it in atomically, so
//! concurrent readers always observe either the previous complete snapshot
//! or the new one, never an interleaving.
//!
//! A failed refresh leaves the previous snapshot in place and surfaces the
//! error to the caller — stale-but-available beats empty.

use std::sync::{Arc, RwLock};

use codec::{decode, normalize, NormalizedEmbedding};
use store::{EnrollmentStore, IdentityId, StoreError};
use thiserror::Error;
use tracing::{debug, warn};

/// One enrolled identity inside a snapshot.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub identity: IdentityId,
    /// Display name, presentation only — never used in matching.
    pub name: Option<String>,
    /// Badge/employee code, presentation only.
    pub code: Option<String>,
    /// Unit-normalized reference embedding.
    pub embedding: NormalizedEmbedding,
}

/// Point-in-time view of the whole registry.
///
/// Entries keep enrollment order. Generation 0 is the never-populated
/// placeholder that exists before the first refresh; every refresh bumps
/// the generation, so callers can detect staleness across mutations.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    entries: Vec<IndexEntry>,
    generation: u64,
}

impl IndexSnapshot {
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Errors surfaced by index maintenance.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The enrollment store could not be read. The previous snapshot is
    /// intact; callers may retry with their own backoff.
    #[error("index refresh failed: {0}")]
    Refresh(#[from] StoreError),
}

/// Owner of the only shared mutable state in the engine.
///
/// Readers take cheap [`Arc`] clones of the current snapshot; the swap in
/// [`refresh`](Self::refresh) is the single mutation point.
pub struct IdentityIndex {
    store: Arc<dyn EnrollmentStore>,
    current: RwLock<Arc<IndexSnapshot>>,
}

impl IdentityIndex {
    pub fn new(store: Arc<dyn EnrollmentStore>) -> Self {
        Self {
            store,
            current: RwLock::new(Arc::new(IndexSnapshot {
                entries: Vec::new(),
                generation: 0,
            })),
        }
    }

    /// Rebuild the snapshot from the store and swap it in wholesale.
    ///
    /// Rows whose stored vector text is blank or undecodable are skipped
    /// with a warning; the registry row stays authoritative but cannot
    /// match until re-enrolled. Returns the new generation.
    pub async fn refresh(&self) -> Result<u64, IndexError> {
        let records = self.store.list_enrollment_records().await?;

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            if record.embedding.trim().is_empty() {
                warn!(identity = %record.identity, "skipping enrollment with blank embedding text");
                continue;
            }
            let embedding = match decode(&record.embedding) {
                Ok(raw) => normalize(&raw),
                Err(err) => {
                    warn!(identity = %record.identity, error = %err, "skipping undecodable enrollment");
                    continue;
                }
            };
            entries.push(IndexEntry {
                identity: record.identity,
                name: record.name,
                code: record.code,
                embedding,
            });
        }

        let mut guard = self.current.write().unwrap_or_else(|p| p.into_inner());
        let generation = guard.generation + 1;
        *guard = Arc::new(IndexSnapshot {
            entries,
            generation,
        });
        debug!(generation, identities = guard.len(), "identity index refreshed");
        Ok(generation)
    }

    /// The current snapshot: a cheap `Arc` clone. Never observes a refresh
    /// mid-swap; callers keep whichever complete snapshot was current.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Whether [`refresh`](Self::refresh) has ever completed.
    pub fn is_populated(&self) -> bool {
        self.snapshot().generation() > 0
    }

    pub fn generation(&self) -> u64 {
        self.snapshot().generation()
    }
}
