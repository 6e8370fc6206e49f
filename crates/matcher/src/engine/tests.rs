use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use codec::{encode, normalize, Embedding, EMBEDDING_DIM};
use index::IdentityIndex;
use store::{
    AttendanceEvent, EnrollmentRecord, EnrollmentStore, EventFilter, IdentityId, MemoryStore,
    StoreError,
};

use super::MatchEngine;
use crate::types::{MatchConfig, MatchError, SENTINEL_SCORE};

fn basis(component: usize) -> Vec<f32> {
    let mut v = vec![0.0_f32; EMBEDDING_DIM];
    v[component] = 1.0;
    v
}

fn record(id: &str, vector: Vec<f32>) -> EnrollmentRecord {
    let embedding = normalize(&Embedding::from_vec(vector).unwrap());
    let now = Utc::now();
    EnrollmentRecord {
        identity: IdentityId::new(id),
        name: Some(format!("person {id}")),
        code: Some(format!("code-{id}")),
        embedding: encode(&embedding),
        embedding_dim: EMBEDDING_DIM,
        model_name: None,
        model_version: None,
        enrolled_at: now,
        updated_at: now,
    }
}

async fn engine_over(records: Vec<EnrollmentRecord>, threshold: f32) -> MatchEngine {
    let store = Arc::new(MemoryStore::new());
    for record in records {
        store.upsert_enrollment_record(record).await.unwrap();
    }
    let index = Arc::new(IdentityIndex::new(store));
    MatchEngine::new(index, MatchConfig::with_threshold(threshold)).unwrap()
}

struct DownStore;

#[async_trait]
impl EnrollmentStore for DownStore {
    async fn list_enrollment_records(&self) -> Result<Vec<EnrollmentRecord>, StoreError> {
        Err(StoreError::backend("registry unreachable"))
    }

    async fn upsert_enrollment_record(&self, _record: EnrollmentRecord) -> Result<(), StoreError> {
        Err(StoreError::backend("registry unreachable"))
    }

    async fn delete_enrollment_record(&self, identity: &IdentityId) -> Result<(), StoreError> {
        Err(StoreError::NotFound(identity.to_string()))
    }

    async fn insert_attendance_event(&self, _event: &AttendanceEvent) -> Result<(), StoreError> {
        Err(StoreError::backend("registry unreachable"))
    }

    async fn list_attendance_events(
        &self,
        _filter: &EventFilter,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        Err(StoreError::backend("registry unreachable"))
    }
}

#[tokio::test]
async fn exact_match_is_accepted() {
    let engine = engine_over(vec![record("a", basis(0))], 0.38).await;
    let result = engine.identify(&basis(0)).await.unwrap();

    assert!(result.accepted);
    assert_eq!(result.identity, Some(IdentityId::new("a")));
    assert_eq!(result.name.as_deref(), Some("person a"));
    assert_eq!(result.code.as_deref(), Some("code-a"));
    assert!((result.score - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn orthogonal_query_is_rejected_without_identity() {
    let engine = engine_over(vec![record("a", basis(0))], 0.38).await;
    let result = engine.identify(&basis(1)).await.unwrap();

    assert!(!result.accepted);
    assert!(result.identity.is_none());
    assert!(result.name.is_none());
    assert!(result.score.abs() < 1e-6);
}

#[tokio::test]
async fn near_duplicate_query_scores_high() {
    let engine = engine_over(vec![record("e1", basis(0))], 0.45).await;

    let mut query = vec![0.0_f32; EMBEDDING_DIM];
    query[0] = 0.99;
    query[1] = 0.01;
    let result = engine.identify(&query).await.unwrap();

    assert!(result.accepted);
    assert_eq!(result.identity, Some(IdentityId::new("e1")));
    assert!(result.score > 0.999, "score was {}", result.score);
}

#[tokio::test]
async fn tie_break_prefers_first_enrolled() {
    let shared = basis(3);
    let engine = engine_over(
        vec![record("first", shared.clone()), record("second", shared.clone())],
        0.38,
    )
    .await;

    let result = engine.identify(&shared).await.unwrap();
    assert!(result.accepted);
    assert_eq!(result.identity, Some(IdentityId::new("first")));
}

#[tokio::test]
async fn empty_index_returns_sentinel_without_error() {
    let engine = engine_over(Vec::new(), 0.38).await;
    let result = engine.identify(&basis(0)).await.unwrap();

    assert!(!result.accepted);
    assert!(result.identity.is_none());
    assert_eq!(result.score, SENTINEL_SCORE);
}

#[tokio::test]
async fn first_identify_lazily_populates_the_index() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert_enrollment_record(record("a", basis(0)))
        .await
        .unwrap();
    let index = Arc::new(IdentityIndex::new(store));
    let engine = MatchEngine::new(Arc::clone(&index), MatchConfig::default()).unwrap();

    assert!(!index.is_populated());
    let result = engine.identify(&basis(0)).await.unwrap();
    assert!(result.accepted);
    assert!(index.is_populated());
    assert_eq!(result.generation, 1);
}

#[tokio::test]
async fn populated_index_is_not_refreshed_per_call() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert_enrollment_record(record("a", basis(0)))
        .await
        .unwrap();
    let index = Arc::new(IdentityIndex::new(Arc::clone(&store) as Arc<dyn EnrollmentStore>));
    index.refresh().await.unwrap();
    let engine = MatchEngine::new(Arc::clone(&index), MatchConfig::default()).unwrap();

    // A later store mutation is invisible until an explicit refresh.
    store
        .upsert_enrollment_record(record("b", basis(1)))
        .await
        .unwrap();
    let result = engine.identify(&basis(1)).await.unwrap();
    assert!(!result.accepted);
    assert_eq!(index.generation(), 1);
}

#[tokio::test]
async fn lazy_refresh_failure_is_an_error_not_a_miss() {
    let index = Arc::new(IdentityIndex::new(Arc::new(DownStore)));
    let engine = MatchEngine::new(index, MatchConfig::default()).unwrap();

    let err = engine.identify(&basis(0)).await.expect_err("store is down");
    assert!(matches!(err, MatchError::Refresh(_)));
}

#[tokio::test]
async fn wrong_dimension_query_is_rejected() {
    let engine = engine_over(vec![record("a", basis(0))], 0.38).await;
    let err = engine
        .identify(&[1.0_f32, 0.0, 0.0])
        .await
        .expect_err("wrong dimension");
    assert!(matches!(err, MatchError::InvalidEmbedding(_)));
}

#[tokio::test]
async fn non_finite_query_is_rejected() {
    let engine = engine_over(vec![record("a", basis(0))], 0.38).await;
    let mut query = basis(0);
    query[2] = f32::NAN;
    let err = engine.identify(&query).await.expect_err("non-finite");
    assert!(matches!(err, MatchError::InvalidEmbedding(_)));
}

#[tokio::test]
async fn identify_is_deterministic_on_a_stable_index() {
    let engine = engine_over(
        vec![
            record("a", basis(0)),
            record("b", basis(1)),
            record("c", basis(2)),
        ],
        0.38,
    )
    .await;

    let mut query = vec![0.0_f32; EMBEDDING_DIM];
    query[0] = 0.7;
    query[1] = 0.3;

    let first = engine.identify(&query).await.unwrap();
    for _ in 0..10 {
        let again = engine.identify(&query).await.unwrap();
        assert_eq!(first, again);
    }
}

#[tokio::test]
async fn score_equal_to_threshold_is_accepted() {
    // An exact self-match on a basis vector scores exactly 1.0.
    let engine = engine_over(vec![record("a", basis(0))], 1.0).await;
    let result = engine.identify(&basis(0)).await.unwrap();
    assert!(result.accepted);
}

#[tokio::test]
async fn picks_highest_scoring_identity_among_several() {
    let mut near_b = basis(1);
    near_b[0] = 0.2;
    let engine = engine_over(
        vec![record("a", basis(0)), record("b", basis(1)), record("c", basis(2))],
        0.38,
    )
    .await;

    let result = engine.identify(&near_b).await.unwrap();
    assert_eq!(result.identity, Some(IdentityId::new("b")));
}

#[tokio::test]
async fn result_reports_snapshot_generation() {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert_enrollment_record(record("a", basis(0)))
        .await
        .unwrap();
    let index = Arc::new(IdentityIndex::new(Arc::clone(&store) as Arc<dyn EnrollmentStore>));
    index.refresh().await.unwrap();
    index.refresh().await.unwrap();
    let engine = MatchEngine::new(index, MatchConfig::default()).unwrap();

    let result = engine.identify(&basis(0)).await.unwrap();
    assert_eq!(result.generation, 2);
}

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let index = Arc::new(IdentityIndex::new(Arc::new(MemoryStore::new())));
    let err = MatchEngine::new(index, MatchConfig::with_threshold(2.0)).expect_err("invalid");
    assert!(matches!(err, MatchError::InvalidConfig(_)));
}
