//! Job submission handler

use crate::error::ApiError;
use crate::models::{parse_sections, GenerateRequest};
use crate::AppState;
use actix_web::{web, HttpResponse};
use scribe_engine::{GenerationRequest, ManuscriptId, ProjectId};

/// POST /projects/{project_id}/manuscripts/{manuscript_id}/generate
///
/// Runs the full admission path; on success the job is returned in
/// `queued` state and the caller polls the status routes.
pub async fn generate_handler(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<GenerateRequest>,
) -> Result<HttpResponse, ApiError> {
    let (project_id, manuscript_id) = path.into_inner();
    let body = body.into_inner();
    let sections = parse_sections(&body.sections)?;

    let mut request = GenerationRequest::new(sections, body.notes_context);
    request.max_estimated_cost_usd = body.max_estimated_cost_usd;
    request.project_daily_budget_usd = body.project_daily_budget_usd;

    let job = state
        .engine
        .submit(
            ProjectId::new(project_id),
            ManuscriptId::new(manuscript_id),
            request,
        )
        .await?;
    tracing::info!(job_id = %job.id, "generation job accepted");
    Ok(HttpResponse::Created().json(job))
}
