//! Budget guard
//!
//! Admission control over the high-side cost estimate of a candidate
//! job. Both caps are optional and evaluated independently; the caller
//! must hold the project admission lock so the daily-spend read and
//! the subsequent insert are atomic with respect to concurrent
//! submissions.

use crate::error::AdmissionError;

/// Decide whether a candidate job may be admitted.
///
/// # Arguments
/// * `candidate_cost_high` - High-side cost estimate of the proposed job
/// * `per_run_cap` - Optional cap on a single run's estimate
/// * `daily_cap` - Optional cap on the project's cumulative daily estimate
/// * `daily_spent` - Sum of `estimated_cost_usd_high` over the
///   project's non-cancelled jobs created in the current UTC day
///
/// # Errors
/// - `AdmissionError::PerRunCapExceeded` if the estimate alone breaks the per-run cap
/// - `AdmissionError::DailyCapExceeded` if admitting would break the daily budget
pub fn check_admission(
    candidate_cost_high: f64,
    per_run_cap: Option<f64>,
    daily_cap: Option<f64>,
    daily_spent: f64,
) -> Result<(), AdmissionError> {
    if let Some(cap) = per_run_cap {
        if candidate_cost_high > cap {
            return Err(AdmissionError::PerRunCapExceeded {
                estimated_usd: candidate_cost_high,
                cap_usd: cap,
            });
        }
    }

    if let Some(cap) = daily_cap {
        if daily_spent + candidate_cost_high > cap {
            return Err(AdmissionError::DailyCapExceeded {
                spent_usd: daily_spent,
                estimated_usd: candidate_cost_high,
                cap_usd: cap,
            });
        }
    }

    Ok(())
}
