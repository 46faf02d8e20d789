//! Most-recent result set per job, keyed by job id.
//!
//! No TTL: freshness is the caller's decision, exercised through `rematch`.

mod redis_store;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::matching::result_set::MatchResultSet;
use crate::models::job::JobId;

pub use redis_store::RedisMatchCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("match cache unavailable: {0}")]
    Backend(String),

    #[error("cached match results for job {job_id} are corrupt: {reason}")]
    Corrupt { job_id: JobId, reason: String },
}

/// Storage port for result sets. `put` replaces the whole set.
#[async_trait]
pub trait MatchCache: Send + Sync {
    async fn get(&self, job_id: &JobId) -> Result<Option<Arc<MatchResultSet>>, CacheError>;

    async fn put(&self, job_id: &JobId, set: Arc<MatchResultSet>) -> Result<(), CacheError>;

    /// Must stay O(1) in the size of the stored set.
    async fn exists(&self, job_id: &JobId) -> Result<bool, CacheError>;
}

/// Process-local cache. Readers share the lock; a `put` is exclusive only for
/// the map swap, never while a caller holds a result set.
#[derive(Default)]
pub struct InMemoryMatchCache {
    sets: RwLock<HashMap<JobId, Arc<MatchResultSet>>>,
}

impl InMemoryMatchCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MatchCache for InMemoryMatchCache {
    async fn get(&self, job_id: &JobId) -> Result<Option<Arc<MatchResultSet>>, CacheError> {
        Ok(self.sets.read().await.get(job_id).cloned())
    }

    async fn put(&self, job_id: &JobId, set: Arc<MatchResultSet>) -> Result<(), CacheError> {
        self.sets.write().await.insert(job_id.clone(), set);
        Ok(())
    }

    async fn exists(&self, job_id: &JobId) -> Result<bool, CacheError> {
        Ok(self.sets.read().await.contains_key(job_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::scorer::ScoredCandidate;
    use chrono::Utc;

    fn set(job: &str) -> Arc<MatchResultSet> {
        Arc::new(MatchResultSet::fresh(
            JobId::new(job),
            vec![ScoredCandidate {
                candidate_id: "a@x.org".into(),
                score: 0.4,
            }],
            Utc::now(),
        ))
    }

    #[tokio::test]
    async fn test_missing_job_is_absent() {
        let cache = InMemoryMatchCache::new();
        let job = JobId::new("J");
        assert!(cache.get(&job).await.unwrap().is_none());
        assert!(!cache.exists(&job).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_replaces_whole_set() {
        let cache = InMemoryMatchCache::new();
        let job = JobId::new("J");
        let first = set("J");
        let second = set("J");

        cache.put(&job, first.clone()).await.unwrap();
        cache.put(&job, second.clone()).await.unwrap();

        let stored = cache.get(&job).await.unwrap().unwrap();
        assert_eq!(stored.run_id, second.run_id);
        assert!(cache.exists(&job).await.unwrap());
    }

    #[tokio::test]
    async fn test_jobs_are_isolated() {
        let cache = InMemoryMatchCache::new();
        cache.put(&JobId::new("J1"), set("J1")).await.unwrap();
        assert!(!cache.exists(&JobId::new("J2")).await.unwrap());
    }
}
