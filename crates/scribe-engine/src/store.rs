//! Job store
//!
//! Durable record of every job and the single source of truth for the
//! other components. All writes go through named transition methods
//! that run [`state_machine::validate_transition`]; no caller mutates
//! job fields directly. Jobs are never deleted, so terminal jobs stay
//! queryable for audit and retry-chain traversal.

use crate::error::EngineError;
use crate::state_machine;
use crate::types::{Job, JobId, JobStatus, ManuscriptId, ProjectId, Section};
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Maximum progress a non-completed job can report
const PROGRESS_CEILING: u8 = 99;

/// Outcome of an executor pickup attempt
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// Job moved to `running`; snapshot taken at pickup time
    Started(Job),
    /// Job reached a terminal state before pickup; nothing to run
    AlreadyFinished,
}

/// In-memory job table keyed by [`JobId`]
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<JobId, Job>,
}

impl JobStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly admitted job
    ///
    /// The job must be in `queued` state; admission is the only path
    /// that creates jobs.
    pub fn insert(&self, job: Job) -> Job {
        debug_assert_eq!(job.status, JobStatus::Queued);
        self.jobs.insert(job.id, job.clone());
        job
    }

    /// Look up a job by id
    pub fn get(&self, id: JobId) -> Result<Job, EngineError> {
        self.jobs
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(EngineError::JobNotFound(id))
    }

    /// Most recent jobs for a manuscript, newest first
    #[must_use]
    pub fn list_for_manuscript(&self, manuscript_id: &ManuscriptId, limit: usize) -> Vec<Job> {
        let mut jobs: Vec<Job> = self
            .jobs
            .iter()
            .filter(|entry| &entry.manuscript_id == manuscript_id)
            .map(|entry| entry.clone())
            .collect();
        // ULIDs from the same millisecond carry random low bits, so
        // order on the insert timestamp and tie-break on id.
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        jobs.truncate(limit);
        jobs
    }

    /// Whether any non-terminal job exists for the manuscript
    #[must_use]
    pub fn has_active_for_manuscript(&self, manuscript_id: &ManuscriptId) -> bool {
        self.jobs.iter().any(|entry| {
            &entry.manuscript_id == manuscript_id && entry.status.is_active()
        })
    }

    /// Cumulative high-side estimate for the project's non-cancelled
    /// jobs created in the UTC day of `now`
    #[must_use]
    pub fn daily_spent_usd(&self, project_id: &ProjectId, now: DateTime<Utc>) -> f64 {
        let day = now.date_naive();
        self.jobs
            .iter()
            .filter(|entry| {
                &entry.project_id == project_id
                    && entry.created_at.date_naive() == day
                    && entry.status != JobStatus::Cancelled
            })
            .map(|entry| entry.pricing.estimated_cost_usd_high)
            .sum()
    }

    /// Executor pickup: `queued` moves to `running`
    ///
    /// Handles the cancelled-while-queued race: a job that went
    /// terminal (or had cancellation requested) before pickup is
    /// finalized without starting.
    pub fn try_start(&self, id: JobId) -> Result<StartOutcome, EngineError> {
        let mut entry = self.jobs.get_mut(&id).ok_or(EngineError::JobNotFound(id))?;
        match entry.status {
            JobStatus::Queued => {
                state_machine::validate_transition(entry.status, JobStatus::Running)?;
                entry.status = JobStatus::Running;
                entry.started_at = Some(Utc::now());
                Ok(StartOutcome::Started(entry.clone()))
            }
            JobStatus::CancelRequested => {
                state_machine::validate_transition(entry.status, JobStatus::Cancelled)?;
                entry.status = JobStatus::Cancelled;
                entry.completed_at = Some(Utc::now());
                Ok(StartOutcome::AlreadyFinished)
            }
            JobStatus::Cancelled => Ok(StartOutcome::AlreadyFinished),
            other => Err(EngineError::Transition(
                crate::error::TransitionError::Illegal {
                    from: other,
                    to: JobStatus::Running,
                },
            )),
        }
    }

    /// Point the job at the section about to be generated
    pub fn begin_section(&self, id: JobId, section: Section) -> Result<(), EngineError> {
        self.update(id, |job| {
            // A cancel may land between the checkpoint and the call;
            // the in-flight section still runs to completion.
            if !matches!(job.status, JobStatus::Running | JobStatus::CancelRequested) {
                return Err(EngineError::Transition(
                    crate::error::TransitionError::Illegal {
                        from: job.status,
                        to: JobStatus::Running,
                    },
                ));
            }
            job.current_section = Some(section);
            Ok(())
        })
        .map(|_| ())
    }

    /// Record one successfully generated and persisted section
    pub fn record_section_done(&self, id: JobId) -> Result<Job, EngineError> {
        self.update(id, |job| {
            if !matches!(job.status, JobStatus::Running | JobStatus::CancelRequested) {
                return Err(EngineError::Transition(
                    crate::error::TransitionError::Illegal {
                        from: job.status,
                        to: JobStatus::Running,
                    },
                ));
            }
            job.run_count += 1;
            job.progress_percent = derived_progress(job.run_count, job.total_sections());
            Ok(())
        })
    }

    /// Final transition: all sections generated
    pub fn mark_completed(&self, id: JobId) -> Result<Job, EngineError> {
        self.update(id, |job| {
            state_machine::validate_transition(job.status, JobStatus::Completed)?;
            job.status = JobStatus::Completed;
            job.progress_percent = 100;
            job.current_section = None;
            job.completed_at = Some(Utc::now());
            Ok(())
        })
    }

    /// Final transition: a section call failed
    pub fn mark_failed(&self, id: JobId, detail: impl Into<String>) -> Result<Job, EngineError> {
        self.update(id, |job| {
            state_machine::validate_transition(job.status, JobStatus::Failed)?;
            job.status = JobStatus::Failed;
            job.error_detail = Some(detail.into());
            job.current_section = None;
            job.completed_at = Some(Utc::now());
            Ok(())
        })
    }

    /// Cancellation command
    ///
    /// Queued jobs finalize immediately; running jobs move to
    /// `cancel_requested` and rely on the executor's next checkpoint.
    /// Anything else is rejected so callers can distinguish "already
    /// stopped" from "request accepted".
    pub fn request_cancel(&self, id: JobId) -> Result<Job, EngineError> {
        self.update(id, |job| match job.status {
            JobStatus::Queued => {
                state_machine::validate_transition(job.status, JobStatus::Cancelled)?;
                job.cancel_requested = true;
                job.status = JobStatus::Cancelled;
                job.completed_at = Some(Utc::now());
                Ok(())
            }
            JobStatus::Running => {
                state_machine::validate_transition(job.status, JobStatus::CancelRequested)?;
                job.cancel_requested = true;
                job.status = JobStatus::CancelRequested;
                Ok(())
            }
            status => Err(EngineError::Transition(
                crate::error::TransitionError::NotCancellable { id: job.id, status },
            )),
        })
    }

    /// Executor checkpoint observed the cancellation flag
    pub fn finalize_cancelled(&self, id: JobId) -> Result<Job, EngineError> {
        self.update(id, |job| {
            state_machine::validate_transition(job.status, JobStatus::Cancelled)?;
            job.status = JobStatus::Cancelled;
            job.current_section = None;
            job.completed_at = Some(Utc::now());
            Ok(())
        })
    }

    /// Read the cooperative cancellation flag
    pub fn is_cancel_requested(&self, id: JobId) -> Result<bool, EngineError> {
        self.jobs
            .get(&id)
            .map(|entry| entry.cancel_requested)
            .ok_or(EngineError::JobNotFound(id))
    }

    /// Total number of stored jobs
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    fn update<F>(&self, id: JobId, f: F) -> Result<Job, EngineError>
    where
        F: FnOnce(&mut Job) -> Result<(), EngineError>,
    {
        let mut entry = self.jobs.get_mut(&id).ok_or(EngineError::JobNotFound(id))?;
        f(&mut entry)?;
        Ok(entry.clone())
    }
}

/// Progress derived from completed sections; capped below 100 until
/// the completed transition itself reports 100.
fn derived_progress(run_count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (run_count as f64 / total as f64 * 100.0).round() as u8;
    pct.min(PROGRESS_CEILING)
}
