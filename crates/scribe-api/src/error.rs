//! HTTP error mapping
//!
//! Engine errors carry stable machine-readable codes; this module maps
//! them onto status codes and a uniform JSON error body.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use scribe_engine::{AdmissionError, EngineError};
use serde::Serialize;

/// Error surfaced by any API handler
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Engine-level rejection or failure
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Path parameter was not a well-formed job id
    #[error("job not found: {0}")]
    UnknownJobId(String),
}

impl ApiError {
    /// Stable machine-readable code included in the error body
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Engine(e) => e.code(),
            ApiError::UnknownJobId(_) => "JOB_NOT_FOUND",
        }
    }
}

/// Uniform JSON error body
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Engine(EngineError::Admission(admission)) => match admission {
                AdmissionError::InvalidSections(_) => StatusCode::BAD_REQUEST,
                AdmissionError::PerRunCapExceeded { .. }
                | AdmissionError::DailyCapExceeded { .. } => StatusCode::PAYMENT_REQUIRED,
                AdmissionError::ManuscriptBusy(_) => StatusCode::CONFLICT,
            },
            ApiError::Engine(EngineError::Transition(_)) => StatusCode::CONFLICT,
            ApiError::Engine(EngineError::JobNotFound(_)) | ApiError::UnknownJobId(_) => {
                StatusCode::NOT_FOUND
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            code: self.code(),
            message: self.to_string(),
        })
    }
}
