pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Match results
        .route(
            "/api/v1/jobs/:job_id/matches",
            get(handlers::handle_load_existing).post(handlers::handle_match),
        )
        .route(
            "/api/v1/jobs/:job_id/matches/rescore",
            post(handlers::handle_rematch),
        )
        .route(
            "/api/v1/jobs/:job_id/matches/exists",
            get(handlers::handle_has_match),
        )
        .route("/api/v1/jobs/:job_id/roster", get(handlers::handle_roster))
        .route(
            "/api/v1/jobs/:job_id/selection",
            get(handlers::handle_selection),
        )
        // Candidate workflow
        .route(
            "/api/v1/jobs/:job_id/candidates/:candidate_id/interested",
            post(handlers::handle_mark_interested),
        )
        .route(
            "/api/v1/jobs/:job_id/candidates/:candidate_id/not-interested",
            post(handlers::handle_mark_not_interested),
        )
        .route(
            "/api/v1/jobs/:job_id/candidates/:candidate_id/assign",
            post(handlers::handle_assign),
        )
        .route(
            "/api/v1/jobs/:job_id/candidates/:candidate_id/place",
            post(handlers::handle_place),
        )
        .route(
            "/api/v1/jobs/:job_id/assignments",
            post(handlers::handle_bulk_assign),
        )
        .with_state(state)
}
