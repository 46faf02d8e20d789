//! Match scoring: a pluggable, trait-based scorer that ranks a candidate pool against a job.
//!
//! Default: `KeywordMatchScorer` (pure-Rust, deterministic, fully testable).
//! Remote: `HttpMatchScorer` in `http_scorer`, calling the external ranking service.
//!
//! The pipeline holds an `Arc<dyn MatchScorer>`, chosen at startup via config.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::candidate::{Candidate, CandidateId};
use crate::models::job::Job;

/// Affinity of one candidate for a job. Higher is a better fit; no fixed bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate_id: CandidateId,
    pub score: f64,
}

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("ranking service unreachable: {0}")]
    Unavailable(String),

    #[error("ranking service returned status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed ranking response: {0}")]
    Malformed(String),
}

/// Implement this to swap scoring backends without touching the pipeline.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(
        &self,
        job: &Job,
        pool: &[Candidate],
    ) -> Result<Vec<ScoredCandidate>, ScorerError>;

    /// Short backend label for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordMatchScorer
// ────────────────────────────────────────────────────────────────────────────

const SKILL_MATCH: f64 = 1.0;
const SUMMARY_MATCH: f64 = 0.5;

/// Skill-overlap scorer.
///
/// For each desired skill on the job:
/// - listed in the candidate's skills (case-insensitive) → 1.0
/// - mentioned in the experience summary → 0.5
/// - otherwise → 0.0
///
/// The score is the mean over desired skills, so it lands in [0, 1].
pub struct KeywordMatchScorer;

#[async_trait]
impl MatchScorer for KeywordMatchScorer {
    async fn score(
        &self,
        job: &Job,
        pool: &[Candidate],
    ) -> Result<Vec<ScoredCandidate>, ScorerError> {
        Ok(pool
            .iter()
            .map(|candidate| ScoredCandidate {
                candidate_id: candidate.id.clone(),
                score: keyword_affinity(job, candidate),
            })
            .collect())
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

fn keyword_affinity(job: &Job, candidate: &Candidate) -> f64 {
    let desired: HashSet<String> = job
        .desired_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if desired.is_empty() {
        return 0.0;
    }

    let skills: HashSet<String> = candidate
        .skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .collect();
    let summary = candidate
        .experience_summary
        .as_deref()
        .map(str::to_lowercase)
        .unwrap_or_default();

    let total: f64 = desired
        .iter()
        .map(|skill| {
            if skills.contains(skill) {
                SKILL_MATCH
            } else if summary.contains(skill.as_str()) {
                SUMMARY_MATCH
            } else {
                0.0
            }
        })
        .sum();

    total / desired.len() as f64
}
