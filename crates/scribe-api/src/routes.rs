//! Route table for the generation API
//!
//! - `POST /generation/estimate` - pricing preview
//! - `POST /projects/{project_id}/manuscripts/{manuscript_id}/generate` - submit
//! - `GET  /generation-jobs/{job_id}` - poll a job
//! - `GET  /projects/{project_id}/manuscripts/{manuscript_id}/generation-jobs` - list
//! - `POST /generation-jobs/{job_id}/cancel` - request cancellation
//! - `POST /generation-jobs/{job_id}/retry` - replay a failed/cancelled job

use crate::handlers;
use actix_web::web;

/// Register all generation routes on the given service config
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/generation/estimate",
        web::post().to(handlers::estimate_handler),
    )
    .route(
        "/projects/{project_id}/manuscripts/{manuscript_id}/generate",
        web::post().to(handlers::generate_handler),
    )
    .route(
        "/projects/{project_id}/manuscripts/{manuscript_id}/generation-jobs",
        web::get().to(handlers::list_jobs_handler),
    )
    .route(
        "/generation-jobs/{job_id}",
        web::get().to(handlers::get_job_handler),
    )
    .route(
        "/generation-jobs/{job_id}/cancel",
        web::post().to(handlers::cancel_handler),
    )
    .route(
        "/generation-jobs/{job_id}/retry",
        web::post().to(handlers::retry_handler),
    );
}
