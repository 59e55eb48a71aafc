//! Job state machine
//!
//! Every mutation of a job's status passes through
//! [`validate_transition`]; the store never overwrites the field
//! directly. `cancel_requested` always resolves to `cancelled` and
//! terminal states have no outgoing transitions.

use crate::error::TransitionError;
use crate::types::JobStatus;

/// Validates a status transition.
pub fn validate_transition(from: JobStatus, to: JobStatus) -> Result<(), TransitionError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError::Illegal { from, to })
    }
}

/// Transitions permitted out of a given status.
pub fn allowed_transitions(from: JobStatus) -> Vec<JobStatus> {
    use JobStatus::*;
    match from {
        Queued => vec![Running, CancelRequested, Cancelled],
        Running => vec![Completed, Failed, CancelRequested],
        CancelRequested => vec![Cancelled],
        Completed => vec![],
        Failed => vec![],
        Cancelled => vec![],
    }
}

fn allowed(from: JobStatus, to: JobStatus) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
