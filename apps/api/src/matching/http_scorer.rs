//! Ranking service client. The single point of entry for the external scorer.
//!
//! No retry loop here: a failed or slow call surfaces as `ScoringUnavailable`
//! and the caller decides when to try again.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::matching::scorer::{MatchScorer, ScoredCandidate, ScorerError};
use crate::models::candidate::Candidate;
use crate::models::job::Job;

#[derive(Debug, Serialize)]
struct RankingRequest<'a> {
    job: &'a Job,
    candidates: &'a [Candidate],
}

#[derive(Debug, Deserialize)]
struct RankingResponse {
    results: Vec<ScoredCandidate>,
}

#[derive(Debug, Deserialize)]
struct RankingError {
    error: String,
}

/// Calls `POST {endpoint}` with the job and the eligible pool.
#[derive(Clone)]
pub struct HttpMatchScorer {
    client: Client,
    endpoint: String,
}

impl HttpMatchScorer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ScorerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScorerError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl MatchScorer for HttpMatchScorer {
    async fn score(
        &self,
        job: &Job,
        pool: &[Candidate],
    ) -> Result<Vec<ScoredCandidate>, ScorerError> {
        let request = RankingRequest {
            job,
            candidates: pool,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ScorerError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("ranking service returned {}: {}", status, body);
            return Err(ScorerError::Rejected {
                status: status.as_u16(),
                message: parse_error_message(body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScorerError::Unavailable(e.to_string()))?;
        let results = parse_ranking(&body)?;

        debug!(
            "ranking service scored {} of {} candidates for job {}",
            results.len(),
            pool.len(),
            job.id
        );

        Ok(results)
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

fn parse_ranking(body: &str) -> Result<Vec<ScoredCandidate>, ScorerError> {
    serde_json::from_str::<RankingResponse>(body)
        .map(|r| r.results)
        .map_err(|e| ScorerError::Malformed(e.to_string()))
}

fn parse_error_message(body: String) -> String {
    serde_json::from_str::<RankingError>(&body)
        .map(|e| e.error)
        .unwrap_or(body)
}
