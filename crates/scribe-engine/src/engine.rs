//! Generation engine facade
//!
//! The entry point the rest of the application talks to:
//! - Informational pricing previews
//! - Admission (section validation, budget guard, atomic insert)
//! - Scheduling admitted jobs onto the executor
//! - Cancellation and retry commands
//! - Read-only status queries for polling callers
//!
//! The engine holds no ambient "current job" state; every operation
//! takes the relevant ids as parameters.

use crate::budget;
use crate::error::{AdmissionError, EngineError, TransitionError};
use crate::executor::Executor;
use crate::pricing::{self, PricingEstimate};
use crate::provider::{GenerationProvider, ManuscriptStore};
use crate::store::JobStore;
use crate::types::{EngineConfig, Job, JobId, ManuscriptId, ProjectId, Section};
use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A submission to draft one or more manuscript sections
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Sections to generate, in execution order
    pub sections: Vec<Section>,
    /// Free-text generation brief passed through to the provider
    pub notes_context: String,
    /// Optional per-run spend cap in USD
    pub max_estimated_cost_usd: Option<f64>,
    /// Optional project daily budget in USD
    pub project_daily_budget_usd: Option<f64>,
}

impl GenerationRequest {
    /// Create a request with no caps
    #[inline]
    #[must_use]
    pub fn new(sections: Vec<Section>, notes_context: impl Into<String>) -> Self {
        Self {
            sections,
            notes_context: notes_context.into(),
            max_estimated_cost_usd: None,
            project_daily_budget_usd: None,
        }
    }

    /// With a per-run spend cap
    #[inline]
    #[must_use]
    pub fn with_max_cost_usd(mut self, cap: f64) -> Self {
        self.max_estimated_cost_usd = Some(cap);
        self
    }

    /// With a project daily budget
    #[inline]
    #[must_use]
    pub fn with_daily_budget_usd(mut self, cap: f64) -> Self {
        self.project_daily_budget_usd = Some(cap);
        self
    }
}

/// The generation job engine
///
/// Owns the job store, runs admission atomically per project, and
/// schedules one executor task per admitted job. Jobs for different
/// manuscripts run concurrently; jobs for the same manuscript are
/// serialized by rejecting a second submission while one is active.
pub struct GenerationEngine {
    config: EngineConfig,
    store: Arc<JobStore>,
    executor: Arc<Executor>,
    /// Per-project admission locks: the daily-spend read and the job
    /// insert must be atomic under concurrent submissions.
    admission_locks: DashMap<ProjectId, Arc<Mutex<()>>>,
}

impl GenerationEngine {
    /// Create an engine over the given collaborators
    #[must_use]
    pub fn new(
        config: EngineConfig,
        provider: Arc<dyn GenerationProvider>,
        manuscripts: Arc<dyn ManuscriptStore>,
    ) -> Self {
        let store = Arc::new(JobStore::new());
        let executor = Arc::new(Executor::new(store.clone(), provider, manuscripts));
        Self {
            config,
            store,
            executor,
            admission_locks: DashMap::new(),
        }
    }

    /// Informational pricing preview; no state is touched
    #[must_use]
    pub fn estimate(&self, sections: &[Section], notes_context: &str) -> PricingEstimate {
        pricing::estimate(sections, notes_context, &self.config.pricing)
    }

    /// Submit a generation request
    ///
    /// Runs the full admission path and, on success, inserts the job
    /// as `queued` and spawns its executor task.
    ///
    /// # Errors
    /// Any [`AdmissionError`]; no job is created on rejection.
    pub async fn submit(
        &self,
        project_id: ProjectId,
        manuscript_id: ManuscriptId,
        request: GenerationRequest,
    ) -> Result<Job, EngineError> {
        let job = self
            .admit(project_id, manuscript_id, request, None)
            .await?;
        self.spawn_executor(job.id);
        Ok(job)
    }

    /// Request cancellation of a job
    ///
    /// Queued jobs finalize to `cancelled` immediately; running jobs
    /// move to `cancel_requested` and finalize at the executor's next
    /// per-section checkpoint.
    ///
    /// # Errors
    /// [`TransitionError::NotCancellable`] if the job is already
    /// terminal or cancellation was already requested.
    pub fn cancel(&self, job_id: JobId) -> Result<Job, EngineError> {
        let job = self.store.request_cancel(job_id)?;
        tracing::info!(job_id = %job_id, status = ?job.status, "cancellation requested");
        Ok(job)
    }

    /// Retry a terminal failed/cancelled job
    ///
    /// Creates a new job replaying the source configuration, linked
    /// via `parent_job_id`, and re-runs the full admission path; a
    /// retry is not exempt from budget checks. The source job is left
    /// untouched.
    pub async fn retry(&self, job_id: JobId) -> Result<Job, EngineError> {
        let source = self.store.get(job_id)?;
        if !matches!(
            source.status,
            crate::types::JobStatus::Failed | crate::types::JobStatus::Cancelled
        ) {
            return Err(EngineError::Transition(TransitionError::NotRetryable {
                id: job_id,
                status: source.status,
            }));
        }

        let request = GenerationRequest {
            sections: source.sections.clone(),
            notes_context: source.notes_context.clone(),
            max_estimated_cost_usd: source.max_estimated_cost_usd,
            project_daily_budget_usd: source.project_daily_budget_usd,
        };

        let job = self
            .admit(
                source.project_id.clone(),
                source.manuscript_id.clone(),
                request,
                Some(job_id),
            )
            .await?;
        tracing::info!(job_id = %job.id, parent_job_id = %job_id, "retry admitted");
        self.spawn_executor(job.id);
        Ok(job)
    }

    /// Look up a job by id
    pub fn get_job(&self, job_id: JobId) -> Result<Job, EngineError> {
        self.store.get(job_id)
    }

    /// Most recent jobs for a manuscript, newest first
    #[must_use]
    pub fn list_jobs(&self, manuscript_id: &ManuscriptId, limit: usize) -> Vec<Job> {
        self.store.list_for_manuscript(manuscript_id, limit)
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared job store handle
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// Full admission path: validate sections, snapshot pricing, then
    /// check-and-insert atomically under the project lock.
    async fn admit(
        &self,
        project_id: ProjectId,
        manuscript_id: ManuscriptId,
        request: GenerationRequest,
        parent: Option<JobId>,
    ) -> Result<Job, EngineError> {
        validate_sections(&request.sections)?;

        let estimate = pricing::estimate(
            &request.sections,
            &request.notes_context,
            &self.config.pricing,
        );
        let per_run_cap = request
            .max_estimated_cost_usd
            .or(self.config.default_max_cost_usd);
        let daily_cap = request
            .project_daily_budget_usd
            .or(self.config.default_daily_budget_usd);

        let lock = self
            .admission_locks
            .entry(project_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        if self.store.has_active_for_manuscript(&manuscript_id) {
            return Err(EngineError::Admission(AdmissionError::ManuscriptBusy(
                manuscript_id,
            )));
        }

        let daily_spent = self.store.daily_spent_usd(&project_id, Utc::now());
        budget::check_admission(
            estimate.estimated_cost_usd_high,
            per_run_cap,
            daily_cap,
            daily_spent,
        )?;

        let mut job = Job::new(
            project_id,
            manuscript_id,
            request.sections,
            request.notes_context,
            estimate,
        )
        .with_caps(request.max_estimated_cost_usd, request.project_daily_budget_usd);
        if let Some(parent) = parent {
            job = job.with_parent(parent);
        }

        let job = self.store.insert(job);
        tracing::info!(
            job_id = %job.id,
            manuscript_id = %job.manuscript_id,
            estimated_cost_usd_high = job.pricing.estimated_cost_usd_high,
            "job admitted"
        );
        Ok(job)
    }

    fn spawn_executor(&self, job_id: JobId) {
        let executor = self.executor.clone();
        tokio::spawn(async move {
            executor.run(job_id).await;
        });
    }
}

/// Reject empty, duplicated section lists before any budget work
fn validate_sections(sections: &[Section]) -> Result<(), AdmissionError> {
    if sections.is_empty() {
        return Err(AdmissionError::InvalidSections(
            "at least one section is required".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for section in sections {
        if !seen.insert(section) {
            return Err(AdmissionError::InvalidSections(format!(
                "duplicate section: {section}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_sections_are_invalid() {
        let err = validate_sections(&[]).unwrap_err();
        assert_eq!(err.code(), "INVALID_SECTIONS");
    }

    #[test]
    fn duplicate_sections_are_invalid() {
        let err =
            validate_sections(&[Section::Methods, Section::Methods]).unwrap_err();
        assert!(err.to_string().contains("duplicate section: methods"));
    }

    #[test]
    fn distinct_sections_are_valid() {
        assert!(validate_sections(&[Section::Introduction, Section::Methods]).is_ok());
    }

    #[test]
    fn request_builder_carries_caps() {
        let request = GenerationRequest::new(vec![Section::Results], "notes")
            .with_max_cost_usd(1.0)
            .with_daily_budget_usd(10.0);
        assert_eq!(request.max_estimated_cost_usd, Some(1.0));
        assert_eq!(request.project_daily_budget_usd, Some(10.0));
    }
}
