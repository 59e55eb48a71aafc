//! Per-job status and command handlers

use crate::error::ApiError;
use crate::models::{parse_job_id, ListQuery, DEFAULT_LIST_LIMIT};
use crate::AppState;
use actix_web::{web, HttpResponse};
use scribe_engine::ManuscriptId;

/// GET /generation-jobs/{job_id} - current job state
///
/// Safe to poll arbitrarily often; reflects the most recently
/// committed store state.
pub async fn get_job_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_job_id(&path)?;
    let job = state.engine.get_job(id)?;
    Ok(HttpResponse::Ok().json(job))
}

/// GET /projects/{project_id}/manuscripts/{manuscript_id}/generation-jobs
///
/// Most recent jobs for the manuscript, newest first.
pub async fn list_jobs_handler(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let (_project_id, manuscript_id) = path.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let jobs = state
        .engine
        .list_jobs(&ManuscriptId::new(manuscript_id), limit);
    Ok(HttpResponse::Ok().json(jobs))
}

/// POST /generation-jobs/{job_id}/cancel - request cooperative cancellation
pub async fn cancel_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_job_id(&path)?;
    let job = state.engine.cancel(id)?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /generation-jobs/{job_id}/retry - replay a failed/cancelled job
pub async fn retry_handler(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_job_id(&path)?;
    let job = state.engine.retry(id).await?;
    Ok(HttpResponse::Created().json(job))
}
