//! Request/response payloads for the generation routes
//!
//! Section names arrive as plain strings on the wire and are parsed
//! into the engine's closed [`Section`] vocabulary at the boundary;
//! unknown names are an `INVALID_SECTIONS` rejection.

use crate::error::ApiError;
use scribe_engine::{AdmissionError, EngineError, JobId, Section};
use serde::Deserialize;

/// Body of `POST /generation/estimate`
#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    /// Section names to price
    pub sections: Vec<String>,
    /// Generation brief; length drives the input-token estimate
    #[serde(default)]
    pub notes_context: String,
}

/// Body of `POST /projects/{project_id}/manuscripts/{manuscript_id}/generate`
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Section names to generate, in execution order
    pub sections: Vec<String>,
    /// Generation brief passed through to the provider
    #[serde(default)]
    pub notes_context: String,
    /// Optional per-run spend cap in USD
    pub max_estimated_cost_usd: Option<f64>,
    /// Optional project daily budget in USD
    pub project_daily_budget_usd: Option<f64>,
}

/// Query string of the job listing route
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum number of jobs to return
    pub limit: Option<usize>,
}

/// Default page size for job listings
pub(crate) const DEFAULT_LIST_LIMIT: usize = 20;

/// Parse wire section names into the engine vocabulary
pub(crate) fn parse_sections(raw: &[String]) -> Result<Vec<Section>, ApiError> {
    raw.iter()
        .map(|name| name.parse::<Section>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            ApiError::Engine(EngineError::Admission(AdmissionError::InvalidSections(
                e.to_string(),
            )))
        })
}

/// Parse a path segment into a job id; malformed ids read as not-found
pub(crate) fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::UnknownJobId(raw.to_string()))
}
