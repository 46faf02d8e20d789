use thiserror::Error;

use crate::auth::Role;
use crate::directory::DirectoryError;
use crate::matching::cache::CacheError;
use crate::matching::status::{MatchEvent, MatchStatus};
use crate::models::candidate::CandidateId;
use crate::models::job::JobId;

/// Failures surfaced by the matching pipeline and workflow engine.
///
/// Guard violations never mutate state; callers can retry or correct the request.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Ranking service unreachable, failed, or timed out. Retryable by the caller.
    #[error("scoring service unavailable: {0}")]
    ScoringUnavailable(String),

    #[error("no match results exist for job {0}")]
    NotFound(JobId),

    #[error("job {0} is not in the directory")]
    UnknownJob(JobId),

    #[error("cannot {event} a candidate who is {from}")]
    InvalidTransition { from: MatchStatus, event: MatchEvent },

    #[error("job {job_id} already has {limit} candidates selected")]
    SelectionLimitExceeded { job_id: JobId, limit: usize },

    #[error("candidate {candidate_id} was never scored for job {job_id}")]
    CandidateNotScored {
        job_id: JobId,
        candidate_id: CandidateId,
    },

    #[error("role '{0}' may not place candidates")]
    Forbidden(Role),

    #[error(transparent)]
    Storage(#[from] CacheError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl MatchError {
    /// Stable machine-readable code so callers can tell "try later" from "not allowed".
    pub fn kind(&self) -> &'static str {
        match self {
            MatchError::ScoringUnavailable(_) => "scoring_unavailable",
            MatchError::NotFound(_) | MatchError::UnknownJob(_) => "not_found",
            MatchError::InvalidTransition { .. } => "invalid_transition",
            MatchError::SelectionLimitExceeded { .. } => "selection_limit_exceeded",
            MatchError::CandidateNotScored { .. } => "candidate_not_scored",
            MatchError::Forbidden(_) => "forbidden",
            MatchError::Storage(_) => "storage_error",
            MatchError::Directory(_) => "directory_error",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MatchError::ScoringUnavailable(_) | MatchError::Storage(_) | MatchError::Directory(_)
        )
    }
}
