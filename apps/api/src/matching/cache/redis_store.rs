use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::{CacheError, MatchCache};
use crate::matching::result_set::{MatchEntry, MatchResultSet};
use crate::matching::status::MatchStatus;
use crate::models::candidate::CandidateId;
use crate::models::job::JobId;

const KEY_PREFIX: &str = "match_results";

/// Redis-backed cache. One JSON document per job under `match_results:{job_id}`.
#[derive(Clone)]
pub struct RedisMatchCache {
    conn: MultiplexedConnection,
}

impl RedisMatchCache {
    pub async fn connect(client: &redis::Client) -> Result<Self, CacheError> {
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis match cache connected");
        Ok(Self { conn })
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(value: redis::RedisError) -> Self {
        CacheError::Backend(value.to_string())
    }
}

pub(crate) fn match_key(job_id: &JobId) -> String {
    format!("{KEY_PREFIX}:{job_id}")
}

/// Stored documents are either the full set, or the bare entry list written
/// by earlier deployments.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredResultSet {
    Full(MatchResultSet),
    Bare(Vec<BareEntry>),
}

#[derive(Deserialize)]
struct BareEntry {
    #[serde(alias = "email")]
    candidate_id: CandidateId,
    score: f64,
    #[serde(default)]
    status: MatchStatus,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

pub(crate) fn decode_stored(job_id: &JobId, raw: &str) -> Result<MatchResultSet, CacheError> {
    let stored: StoredResultSet =
        serde_json::from_str(raw).map_err(|e| CacheError::Corrupt {
            job_id: job_id.clone(),
            reason: e.to_string(),
        })?;

    match stored {
        StoredResultSet::Full(set) => {
            let revision = set.revision;
            let mut set = MatchResultSet::from_parts(set.job_id, set.run_id, set.scored_at, set.entries);
            set.revision = revision;
            Ok(set)
        }
        StoredResultSet::Bare(rows) => {
            // Bare lists carry no pass metadata; the epoch marks "unknown".
            let unknown = DateTime::<Utc>::default();
            let entries = rows
                .into_iter()
                .map(|row| MatchEntry {
                    candidate_id: row.candidate_id,
                    score: row.score,
                    status: row.status,
                    updated_at: row.updated_at.unwrap_or(unknown),
                })
                .collect();
            Ok(MatchResultSet::from_parts(
                job_id.clone(),
                Uuid::nil(),
                unknown,
                entries,
            ))
        }
    }
}

#[async_trait]
impl MatchCache for RedisMatchCache {
    async fn get(&self, job_id: &JobId) -> Result<Option<Arc<MatchResultSet>>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(match_key(job_id)).await?;
        raw.map(|raw| decode_stored(job_id, &raw).map(Arc::new))
            .transpose()
    }

    async fn put(&self, job_id: &JobId, set: Arc<MatchResultSet>) -> Result<(), CacheError> {
        let payload = serde_json::to_string(set.as_ref()).map_err(|e| CacheError::Corrupt {
            job_id: job_id.clone(),
            reason: e.to_string(),
        })?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(match_key(job_id), payload).await?;
        Ok(())
    }

    async fn exists(&self, job_id: &JobId) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let present: bool = conn.exists(match_key(job_id)).await?;
        Ok(present)
    }
}
