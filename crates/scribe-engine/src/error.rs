//! Error types for the generation job engine
//!
//! Three local error families mirror the propagation policy:
//! - Admission errors are synchronous and create no job
//! - Transition errors are synchronous and leave the job untouched
//! - Provider errors are asynchronous, recorded on the job as
//!   `error_detail` and observed only through polling

use crate::types::{JobId, JobStatus, ManuscriptId};

/// Main engine error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// Submission rejected at admission time
    #[error("admission rejected: {0}")]
    Admission(#[from] AdmissionError),

    /// Illegal state-machine command
    #[error("transition rejected: {0}")]
    Transition(#[from] TransitionError),

    /// Unknown job id
    #[error("job not found: {0}")]
    JobNotFound(JobId),
}

impl EngineError {
    /// Stable machine-readable code for wire surfaces
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Admission(e) => e.code(),
            EngineError::Transition(e) => e.code(),
            EngineError::JobNotFound(_) => "JOB_NOT_FOUND",
        }
    }
}

/// Admission errors, reported synchronously at submission time
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdmissionError {
    /// Empty, duplicated or unknown section list
    #[error("invalid sections: {0}")]
    InvalidSections(String),

    /// High-side estimate exceeds the per-run cap
    #[error("estimated cost {estimated_usd} USD exceeds per-run cap {cap_usd} USD")]
    PerRunCapExceeded {
        /// High-side cost estimate of the candidate job
        estimated_usd: f64,
        /// The per-run cap that was violated
        cap_usd: f64,
    },

    /// Admitting the job would push the project over its daily budget
    #[error(
        "daily budget exceeded: {spent_usd} USD spent + {estimated_usd} USD estimated > {cap_usd} USD cap"
    )]
    DailyCapExceeded {
        /// Cumulative high-side spend for the project today
        spent_usd: f64,
        /// High-side cost estimate of the candidate job
        estimated_usd: f64,
        /// The daily budget that was violated
        cap_usd: f64,
    },

    /// Another job for the same manuscript is queued or running
    #[error("manuscript {0} already has an active generation job")]
    ManuscriptBusy(ManuscriptId),
}

impl AdmissionError {
    /// Stable machine-readable code for wire surfaces
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionError::InvalidSections(_) => "INVALID_SECTIONS",
            AdmissionError::PerRunCapExceeded { .. } => "PER_RUN_CAP_EXCEEDED",
            AdmissionError::DailyCapExceeded { .. } => "DAILY_CAP_EXCEEDED",
            AdmissionError::ManuscriptBusy(_) => "MANUSCRIPT_BUSY",
        }
    }
}

/// State-transition errors, reported synchronously
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransitionError {
    /// Transition not present in the state machine
    #[error("illegal status transition {from:?} -> {to:?}")]
    Illegal {
        /// Status before the attempted transition
        from: JobStatus,
        /// Requested target status
        to: JobStatus,
    },

    /// Cancel command on a job that is not queued/running
    #[error("job {id} is {status:?} and cannot be cancelled")]
    NotCancellable {
        /// Target job
        id: JobId,
        /// Status at the time of the command
        status: JobStatus,
    },

    /// Retry command on a job that is not failed/cancelled
    #[error("job {id} is {status:?} and cannot be retried")]
    NotRetryable {
        /// Source job
        id: JobId,
        /// Status at the time of the command
        status: JobStatus,
    },
}

impl TransitionError {
    /// Stable machine-readable code for wire surfaces
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            TransitionError::Illegal { .. } => "ILLEGAL_TRANSITION",
            TransitionError::NotCancellable { .. } => "NOT_CANCELLABLE",
            TransitionError::NotRetryable { .. } => "NOT_RETRYABLE",
        }
    }
}

/// External collaborator failures observed by the executor
///
/// Never surfaced synchronously to the submitter; the executor records
/// the message on the job and moves it to `failed`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// The generation provider returned an error for a section
    #[error("generation failed: {0}")]
    Generation(String),

    /// The manuscript store rejected a section patch
    #[error("persistence failed: {0}")]
    Persistence(String),
}
