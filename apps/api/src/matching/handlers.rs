use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::Caller;
use crate::errors::AppError;
use crate::matching::pipeline::BulkAssignOutcome;
use crate::matching::result_set::{MatchEntry, MatchResultSet};
use crate::matching::roster::RosterView;
use crate::models::candidate::CandidateId;
use crate::models::job::JobId;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ExistsResponse {
    pub job_id: JobId,
    pub exists: bool,
}

#[derive(Serialize)]
pub struct SelectionResponse {
    pub job_id: JobId,
    pub limit: usize,
    pub selected: Vec<CandidateId>,
}

#[derive(Deserialize)]
pub struct BulkAssignRequest {
    pub candidate_ids: Vec<CandidateId>,
}

#[derive(Serialize)]
pub struct BulkAssignResponse {
    pub job_id: JobId,
    pub assigned: usize,
    pub failed: usize,
    pub outcomes: Vec<BulkAssignOutcome>,
}

/// POST /api/v1/jobs/:job_id/matches
pub async fn handle_match(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<MatchResultSet>, AppError> {
    let set = state.pipeline.match_job(&JobId::new(job_id)).await?;
    Ok(Json(Arc::unwrap_or_clone(set)))
}

/// POST /api/v1/jobs/:job_id/matches/rescore
pub async fn handle_rematch(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<MatchResultSet>, AppError> {
    let set = state.pipeline.rematch(&JobId::new(job_id)).await?;
    Ok(Json(Arc::unwrap_or_clone(set)))
}

/// GET /api/v1/jobs/:job_id/matches
pub async fn handle_load_existing(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<MatchResultSet>, AppError> {
    let set = state.pipeline.load_existing(&JobId::new(job_id)).await?;
    Ok(Json(Arc::unwrap_or_clone(set)))
}

/// GET /api/v1/jobs/:job_id/matches/exists
pub async fn handle_has_match(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<ExistsResponse>, AppError> {
    let job_id = JobId::new(job_id);
    let exists = state.pipeline.has_match(&job_id).await?;
    Ok(Json(ExistsResponse { job_id, exists }))
}

/// GET /api/v1/jobs/:job_id/roster
pub async fn handle_roster(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<RosterView>, AppError> {
    let view = state.pipeline.roster(&JobId::new(job_id)).await?;
    Ok(Json(view))
}

/// GET /api/v1/jobs/:job_id/selection
pub async fn handle_selection(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<SelectionResponse>, AppError> {
    let job_id = JobId::new(job_id);
    let selected = state.pipeline.selection(&job_id).await?;
    Ok(Json(SelectionResponse {
        job_id,
        limit: state.pipeline.selection_limit(),
        selected,
    }))
}

/// POST /api/v1/jobs/:job_id/candidates/:candidate_id/interested
pub async fn handle_mark_interested(
    State(state): State<AppState>,
    Path((job_id, candidate_id)): Path<(String, String)>,
) -> Result<Json<MatchEntry>, AppError> {
    let entry = state
        .pipeline
        .mark_interested(&JobId::new(job_id), &CandidateId::new(candidate_id))
        .await?;
    Ok(Json(entry))
}

/// POST /api/v1/jobs/:job_id/candidates/:candidate_id/not-interested
pub async fn handle_mark_not_interested(
    State(state): State<AppState>,
    Path((job_id, candidate_id)): Path<(String, String)>,
) -> Result<Json<MatchEntry>, AppError> {
    let entry = state
        .pipeline
        .mark_not_interested(&JobId::new(job_id), &CandidateId::new(candidate_id))
        .await?;
    Ok(Json(entry))
}

/// POST /api/v1/jobs/:job_id/candidates/:candidate_id/assign
pub async fn handle_assign(
    State(state): State<AppState>,
    Path((job_id, candidate_id)): Path<(String, String)>,
) -> Result<Json<MatchEntry>, AppError> {
    let entry = state
        .pipeline
        .assign(&JobId::new(job_id), &CandidateId::new(candidate_id))
        .await?;
    Ok(Json(entry))
}

/// POST /api/v1/jobs/:job_id/candidates/:candidate_id/place
pub async fn handle_place(
    State(state): State<AppState>,
    caller: Caller,
    Path((job_id, candidate_id)): Path<(String, String)>,
) -> Result<Json<MatchEntry>, AppError> {
    let entry = state
        .pipeline
        .place(&caller, &JobId::new(job_id), &CandidateId::new(candidate_id))
        .await?;
    Ok(Json(entry))
}

/// POST /api/v1/jobs/:job_id/assignments
pub async fn handle_bulk_assign(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    Json(req): Json<BulkAssignRequest>,
) -> Result<Json<BulkAssignResponse>, AppError> {
    if req.candidate_ids.is_empty() {
        return Err(AppError::Validation(
            "candidate_ids must not be empty".to_string(),
        ));
    }

    let job_id = JobId::new(job_id);
    let outcomes = state
        .pipeline
        .bulk_assign(&job_id, &req.candidate_ids)
        .await;
    let assigned = outcomes.iter().filter(|o| o.is_success()).count();

    Ok(Json(BulkAssignResponse {
        job_id,
        assigned,
        failed: outcomes.len() - assigned,
        outcomes,
    }))
}
