use std::sync::Arc;

use chrono::{DateTime, Utc};
use codec::{encode, normalize, CodecError, Embedding, EMBEDDING_DIM};
use index::{IdentityIndex, IndexError};
use serde::{Deserialize, Serialize};
use store::{EnrollmentRecord, EnrollmentStore, IdentityId, StoreError};
use thiserror::Error;
use tracing::info;

/// Errors surfaced by enrollment mutations.
#[derive(Debug, Error)]
pub enum EnrollError {
    /// The supplied vector failed dimension or finiteness validation;
    /// nothing was written.
    #[error("invalid enrollment embedding: {0}")]
    InvalidEmbedding(#[from] CodecError),
    /// No enrollment exists for the referenced identity.
    #[error("identity not found: {0}")]
    NotFound(String),
    /// The store write failed; the index was left untouched.
    #[error("enrollment persistence failed: {0}")]
    Persistence(String),
    /// The write succeeded but the follow-up index refresh did not. The
    /// record is durable; a later refresh will pick it up.
    #[error("post-enrollment refresh failed: {0}")]
    Refresh(#[from] IndexError),
}

impl From<StoreError> for EnrollError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => EnrollError::NotFound(id),
            other => EnrollError::Persistence(other.to_string()),
        }
    }
}

/// Identity attributes captured at enrollment time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrollRequest {
    pub identity: IdentityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
}

impl EnrollRequest {
    pub fn new(identity: impl Into<IdentityId>) -> Self {
        Self {
            identity: identity.into(),
            name: None,
            code: None,
            model_name: None,
            model_version: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Listing row for enrolled identities, vector payload omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrollmentSummary {
    pub identity: IdentityId,
    pub name: Option<String>,
    pub code: Option<String>,
    pub embedding_dim: usize,
    pub model_name: Option<String>,
    pub model_version: Option<String>,
    pub enrolled_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sole mutator of enrollment state.
///
/// Every other component treats the registry as read-only; enroll and
/// remove are the only writers, and each triggers an index refresh after a
/// confirmed write.
pub struct EnrollmentManager {
    store: Arc<dyn EnrollmentStore>,
    index: Arc<IdentityIndex>,
}

impl EnrollmentManager {
    pub fn new(store: Arc<dyn EnrollmentStore>, index: Arc<IdentityIndex>) -> Self {
        Self { store, index }
    }

    /// Validate, normalize, and upsert one identity's reference embedding,
    /// then refresh the index. At most one embedding per identity:
    /// re-enrollment overwrites.
    pub async fn enroll(
        &self,
        request: EnrollRequest,
        embedding: &[f32],
    ) -> Result<EnrollmentRecord, EnrollError> {
        let raw = Embedding::from_slice(embedding)?;
        let normalized = normalize(&raw);

        let now = Utc::now();
        let record = EnrollmentRecord {
            identity: request.identity,
            name: request.name,
            code: request.code,
            embedding: encode(&normalized),
            embedding_dim: EMBEDDING_DIM,
            model_name: request.model_name,
            model_version: request.model_version,
            enrolled_at: now,
            updated_at: now,
        };

        self.store.upsert_enrollment_record(record.clone()).await?;
        info!(identity = %record.identity, "enrollment stored");
        self.index.refresh().await?;
        Ok(record)
    }

    /// Remove an identity's enrollment and refresh the index.
    pub async fn remove(&self, identity: &IdentityId) -> Result<(), EnrollError> {
        self.store.delete_enrollment_record(identity).await?;
        info!(identity = %identity, "enrollment removed");
        self.index.refresh().await?;
        Ok(())
    }

    /// Enrolled identities without their vector payloads, in enrollment
    /// order.
    pub async fn list(&self) -> Result<Vec<EnrollmentSummary>, EnrollError> {
        let records = self.store.list_enrollment_records().await?;
        Ok(records
            .into_iter()
            .map(|record| EnrollmentSummary {
                identity: record.identity,
                name: record.name,
                code: record.code,
                embedding_dim: record.embedding_dim,
                model_name: record.model_name,
                model_version: record.model_version,
                enrolled_at: record.enrolled_at,
                updated_at: record.updated_at,
            })
            .collect())
    }
}
