use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::matching::MatchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Match(#[from] MatchError),
}

impl AppError {
    /// Backend failures surfaced as 5xx. Scorer outages are already logged by
    /// the pipeline at `warn` and are not repeated here.
    fn is_infrastructure_failure(&self) -> bool {
        matches!(
            self,
            AppError::Match(MatchError::Storage(_) | MatchError::Directory(_))
        )
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Match(err) => match err {
                MatchError::ScoringUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SCORING_UNAVAILABLE",
                    err.to_string(),
                ),
                MatchError::NotFound(_) | MatchError::UnknownJob(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
                }
                MatchError::InvalidTransition { .. } => {
                    (StatusCode::CONFLICT, "INVALID_TRANSITION", err.to_string())
                }
                MatchError::SelectionLimitExceeded { .. } => (
                    StatusCode::CONFLICT,
                    "SELECTION_LIMIT_EXCEEDED",
                    err.to_string(),
                ),
                MatchError::CandidateNotScored { .. } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "CANDIDATE_NOT_SCORED",
                    err.to_string(),
                ),
                MatchError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
                MatchError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                ),
                MatchError::Directory(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DIRECTORY_ERROR",
                    "A directory lookup error occurred".to_string(),
                ),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if self.is_infrastructure_failure() {
            tracing::error!(code, "Matching infrastructure error: {self}");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::cache::CacheError;
    use crate::matching::status::{MatchEvent, MatchStatus};
    use crate::models::job::JobId;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_match_errors_map_to_http_status() {
        let job = || JobId::new("J");
        assert_eq!(
            status_of(MatchError::ScoringUnavailable("down".into()).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(MatchError::NotFound(job()).into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(MatchError::UnknownJob(job()).into()), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(
                MatchError::InvalidTransition {
                    from: MatchStatus::Placed,
                    event: MatchEvent::Assign,
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(MatchError::SelectionLimitExceeded { job_id: job(), limit: 3 }.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(
                MatchError::CandidateNotScored {
                    job_id: job(),
                    candidate_id: "a@x.org".into(),
                }
                .into()
            ),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(MatchError::Storage(CacheError::Backend("boom".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_only_backend_failures_log_as_errors() {
        let storage: AppError = MatchError::Storage(CacheError::Backend("down".into())).into();
        let scorer: AppError = MatchError::ScoringUnavailable("timed out".into()).into();
        let guard: AppError = MatchError::NotFound(JobId::new("J")).into();

        assert!(storage.is_infrastructure_failure());
        assert!(!scorer.is_infrastructure_failure());
        assert!(!guard.is_infrastructure_failure());
    }

    #[test]
    fn test_storage_detail_not_leaked() {
        let err: AppError = MatchError::Storage(CacheError::Backend("secret host".into())).into();
        let (_, code, message) = err.parts();
        assert_eq!(code, "STORAGE_ERROR");
        assert!(!message.contains("secret"));
    }
}
