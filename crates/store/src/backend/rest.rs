//! PostgREST-backed registry client.
//!
//! Speaks to a hosted Postgres (Supabase-style) REST surface: the
//! `face_embeddings` table keyed by identity and the append-only
//! `attendance_logs` table. Upserts rely on the server-side `on_conflict`
//! merge, so concurrent enrollments for the same identity resolve
//! last-write-wins at the store without any engine-side locking.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use tracing::debug;

use crate::backend::{EnrollmentStore, DEFAULT_EVENT_LIMIT};
use crate::{AttendanceEvent, EnrollmentRecord, EventFilter, IdentityId, StoreError};

const ENROLLMENTS_TABLE: &str = "face_embeddings";
const EVENTS_TABLE: &str = "attendance_logs";

/// PostgREST client for a hosted enrollment registry.
#[derive(Debug)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl RestStore {
    /// Build a client for `url` authenticated with a service key.
    pub fn new(url: &str, api_key: &str) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(StoreError::backend)?;

        let mut headers = HeaderMap::new();
        let key_value =
            HeaderValue::from_str(api_key).map_err(|_| StoreError::backend("invalid api key"))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| StoreError::backend("invalid api key"))?;
        headers.insert("apikey", key_value);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .headers(self.headers.clone())
    }

    async fn check(response: Response, context: &str) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Backend(format!("{context}: {status}: {body}")))
    }
}

/// Query parameters for an event listing, separated out so the translation
/// from [`EventFilter`] is testable without a live endpoint.
fn events_query(filter: &EventFilter) -> Vec<(String, String)> {
    let mut query = vec![
        ("select".to_string(), "*".to_string()),
        ("order".to_string(), "recorded_at.desc".to_string()),
        (
            "limit".to_string(),
            filter.limit.unwrap_or(DEFAULT_EVENT_LIMIT).to_string(),
        ),
    ];
    if let Some(identity) = &filter.identity {
        query.push(("identity".to_string(), format!("eq.{identity}")));
    }
    query
}

#[async_trait]
impl EnrollmentStore for RestStore {
    async fn list_enrollment_records(&self) -> Result<Vec<EnrollmentRecord>, StoreError> {
        let response = self
            .request(Method::GET, &self.table_url(ENROLLMENTS_TABLE))
            .query(&[("select", "*"), ("order", "enrolled_at.asc")])
            .send()
            .await
            .map_err(StoreError::backend)?;
        let response = Self::check(response, "list enrollments").await?;
        let records: Vec<EnrollmentRecord> = response
            .json()
            .await
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        debug!(count = records.len(), "listed enrollment records");
        Ok(records)
    }

    async fn upsert_enrollment_record(&self, record: EnrollmentRecord) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, &self.table_url(ENROLLMENTS_TABLE))
            .query(&[("on_conflict", "identity")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&record)
            .send()
            .await
            .map_err(StoreError::backend)?;
        Self::check(response, "upsert enrollment").await?;
        Ok(())
    }

    async fn delete_enrollment_record(&self, identity: &IdentityId) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE, &self.table_url(ENROLLMENTS_TABLE))
            .query(&[("identity", format!("eq.{identity}"))])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(StoreError::backend)?;
        let response = Self::check(response, "delete enrollment").await?;
        // With return=representation the body is the deleted row set; an
        // empty set means nothing was enrolled under this identity.
        let deleted: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|err| StoreError::Serialization(err.to_string()))?;
        if deleted.is_empty() {
            return Err(StoreError::NotFound(identity.to_string()));
        }
        Ok(())
    }

    async fn insert_attendance_event(&self, event: &AttendanceEvent) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, &self.table_url(EVENTS_TABLE))
            .json(event)
            .send()
            .await
            .map_err(StoreError::backend)?;
        Self::check(response, "insert attendance event").await?;
        Ok(())
    }

    async fn list_attendance_events(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let response = self
            .request(Method::GET, &self.table_url(EVENTS_TABLE))
            .query(&events_query(filter))
            .send()
            .await
            .map_err(StoreError::backend)?;
        let response = Self::check(response, "list attendance events").await?;
        response
            .json()
            .await
            .map_err(|err| StoreError::Serialization(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_joins_base_and_table() {
        let store = RestStore::new("https://registry.example.co", "key").unwrap();
        assert_eq!(
            store.table_url(ENROLLMENTS_TABLE),
            "https://registry.example.co/rest/v1/face_embeddings"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let store = RestStore::new("https://registry.example.co/", "key").unwrap();
        assert_eq!(
            store.table_url(EVENTS_TABLE),
            "https://registry.example.co/rest/v1/attendance_logs"
        );
    }

    #[test]
    fn events_query_defaults_limit() {
        let query = events_query(&EventFilter::default());
        assert!(query.contains(&("limit".to_string(), DEFAULT_EVENT_LIMIT.to_string())));
        assert!(query.contains(&("order".to_string(), "recorded_at.desc".to_string())));
        assert!(!query.iter().any(|(key, _)| key == "identity"));
    }

    #[test]
    fn events_query_adds_identity_filter() {
        let filter = EventFilter {
            identity: Some(IdentityId::new("emp-9")),
            limit: Some(5),
        };
        let query = events_query(&filter);
        assert!(query.contains(&("identity".to_string(), "eq.emp-9".to_string())));
        assert!(query.contains(&("limit".to_string(), "5".to_string())));
    }

    #[test]
    fn invalid_api_key_is_rejected_up_front() {
        let err = RestStore::new("https://registry.example.co", "bad\nkey")
            .expect_err("control characters are not a valid header value");
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
