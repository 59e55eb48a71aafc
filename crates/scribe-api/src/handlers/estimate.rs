//! Informational pricing preview handler

use crate::error::ApiError;
use crate::models::{parse_sections, EstimateRequest};
use crate::AppState;
use actix_web::{web, HttpResponse};

/// POST /generation/estimate - price a proposed section set
///
/// Purely informational; touches no state. An empty section list is a
/// legal preview and yields all-zero bounds.
pub async fn estimate_handler(
    state: web::Data<AppState>,
    body: web::Json<EstimateRequest>,
) -> Result<HttpResponse, ApiError> {
    let sections = parse_sections(&body.sections)?;
    let estimate = state.engine.estimate(&sections, &body.notes_context);
    Ok(HttpResponse::Ok().json(estimate))
}
