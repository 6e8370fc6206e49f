use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::{AttendanceEvent, EnrollmentRecord, EventFilter, IdentityId, StoreError};

/// Rows returned by an event listing when the filter sets no limit.
pub const DEFAULT_EVENT_LIMIT: usize = 200;

/// Contract every enrollment registry backend must satisfy.
///
/// These are the only persistent-store operations the engine consumes. All
/// of them may suspend on I/O; none of them are retried by the engine.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// All enrollment records, in enrollment order.
    async fn list_enrollment_records(&self) -> Result<Vec<EnrollmentRecord>, StoreError>;

    /// Insert or overwrite the single record for `record.identity`.
    /// Concurrent writers for the same identity resolve last-write-wins.
    async fn upsert_enrollment_record(&self, record: EnrollmentRecord) -> Result<(), StoreError>;

    /// Delete the record for `identity`. [`StoreError::NotFound`] when
    /// nothing is enrolled under it.
    async fn delete_enrollment_record(&self, identity: &IdentityId) -> Result<(), StoreError>;

    /// Append one immutable attendance event.
    async fn insert_attendance_event(&self, event: &AttendanceEvent) -> Result<(), StoreError>;

    /// Recorded events, newest first, honoring the filter.
    async fn list_attendance_events(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<AttendanceEvent>, StoreError>;
}

/// Configuration for selecting and building a registry backend.
///
/// # Example
/// ```
/// use store::StoreConfig;
///
/// // In-memory (for testing)
/// let config = StoreConfig::in_memory();
///
/// // Hosted PostgREST registry
/// let config = StoreConfig::rest("https://registry.example.co", "service-key");
/// ```
#[derive(Clone, Debug, Default)]
pub enum StoreConfig {
    /// In-memory vectors behind a lock. Useful for tests and ephemeral runs.
    #[default]
    InMemory,
    /// PostgREST-style hosted registry reached over HTTPS.
    ///
    /// Requires the `backend-rest` feature (enabled by default).
    Rest { url: String, api_key: String },
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn rest(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        StoreConfig::Rest {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build the backend this configuration describes.
    pub fn build(&self) -> Result<Arc<dyn EnrollmentStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Arc::new(MemoryStore::new())),
            StoreConfig::Rest { url, api_key } => {
                #[cfg(feature = "backend-rest")]
                {
                    Ok(Arc::new(RestStore::new(url, api_key)?))
                }
                #[cfg(not(feature = "backend-rest"))]
                {
                    let _ = (url, api_key);
                    Err(StoreError::backend("rest backend disabled at compile time"))
                }
            }
        }
    }
}

/// An in-memory registry backed by `RwLock`-guarded vectors.
///
/// Upsert preserves the original enrollment position and timestamp, so a
/// listing reflects enrollment order even after re-enrollments.
pub struct MemoryStore {
    enrollments: RwLock<Vec<EnrollmentRecord>>,
    events: RwLock<Vec<AttendanceEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            enrollments: RwLock::new(Vec::new()),
            events: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn list_enrollment_records(&self) -> Result<Vec<EnrollmentRecord>, StoreError> {
        let guard = self
            .enrollments
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        Ok(guard.clone())
    }

    async fn upsert_enrollment_record(&self, record: EnrollmentRecord) -> Result<(), StoreError> {
        let mut guard = self
            .enrollments
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        if let Some(existing) = guard.iter_mut().find(|r| r.identity == record.identity) {
            let enrolled_at = existing.enrolled_at;
            *existing = record;
            existing.enrolled_at = enrolled_at;
        } else {
            guard.push(record);
        }
        Ok(())
    }

    async fn delete_enrollment_record(&self, identity: &IdentityId) -> Result<(), StoreError> {
        let mut guard = self
            .enrollments
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        match guard.iter().position(|r| &r.identity == identity) {
            Some(position) => {
                guard.remove(position);
                Ok(())
            }
            None => Err(StoreError::NotFound(identity.to_string())),
        }
    }

    async fn insert_attendance_event(&self, event: &AttendanceEvent) -> Result<(), StoreError> {
        self.events
            .write()
            .map_err(|_| StoreError::backend("poisoned lock"))?
            .push(event.clone());
        Ok(())
    }

    async fn list_attendance_events(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let guard = self
            .events
            .read()
            .map_err(|_| StoreError::backend("poisoned lock"))?;
        let limit = filter.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
        Ok(guard
            .iter()
            .rev()
            .filter(|event| match &filter.identity {
                Some(identity) => event.identity.as_ref() == Some(identity),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(feature = "backend-rest")]
pub mod rest;

#[cfg(feature = "backend-rest")]
pub use rest::RestStore;
