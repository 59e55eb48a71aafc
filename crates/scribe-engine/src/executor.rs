//! Executor
//!
//! Turns one admitted `queued` job into a terminal job. Sections run
//! strictly sequentially; the per-section generation call is the only
//! suspension point and the cancellation flag is checked at every
//! section boundary. A single job's failure never propagates beyond
//! its own record.

use crate::provider::{GenerationProvider, ManuscriptStore};
use crate::store::{JobStore, StartOutcome};
use crate::types::JobId;
use std::sync::Arc;

/// Runs admitted jobs section by section
pub struct Executor {
    store: Arc<JobStore>,
    provider: Arc<dyn GenerationProvider>,
    manuscripts: Arc<dyn ManuscriptStore>,
}

impl Executor {
    /// Create a new executor over the shared store and collaborators
    #[must_use]
    pub fn new(
        store: Arc<JobStore>,
        provider: Arc<dyn GenerationProvider>,
        manuscripts: Arc<dyn ManuscriptStore>,
    ) -> Self {
        Self {
            store,
            provider,
            manuscripts,
        }
    }

    /// Run one job to a terminal state
    ///
    /// Infallible by contract: every failure mode ends up on the job
    /// record, not in a return value. The scheduler spawns this once
    /// per admitted job; `try_start` rejects any second pickup.
    pub async fn run(&self, id: JobId) {
        let job = match self.store.try_start(id) {
            Ok(StartOutcome::Started(job)) => job,
            Ok(StartOutcome::AlreadyFinished) => {
                tracing::debug!(job_id = %id, "job reached a terminal state before pickup");
                return;
            }
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "executor pickup rejected");
                return;
            }
        };

        tracing::info!(
            job_id = %id,
            manuscript_id = %job.manuscript_id,
            sections = job.sections.len(),
            "job started"
        );

        for section in &job.sections {
            match self.store.is_cancel_requested(id) {
                Ok(true) => {
                    self.finalize_cancel(id);
                    return;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(job_id = %id, error = %e, "checkpoint read failed");
                    return;
                }
            }

            if let Err(e) = self.store.begin_section(id, *section) {
                tracing::warn!(job_id = %id, error = %e, "could not begin section");
                return;
            }

            let generated = match self.provider.generate(*section, &job.notes_context).await {
                Ok(generated) => generated,
                Err(e) => {
                    self.fail(id, e.to_string());
                    return;
                }
            };

            if let Err(e) = self
                .manuscripts
                .patch_section(&job.project_id, &job.manuscript_id, *section, &generated.text)
                .await
            {
                self.fail(id, e.to_string());
                return;
            }

            match self.store.record_section_done(id) {
                Ok(updated) => {
                    tracing::debug!(
                        job_id = %id,
                        section = %section,
                        progress = updated.progress_percent,
                        "section completed"
                    );
                }
                Err(e) => {
                    tracing::warn!(job_id = %id, error = %e, "could not record section");
                    return;
                }
            }
        }

        // A cancel that landed during the last section still wins.
        if self.store.is_cancel_requested(id).unwrap_or(false) {
            self.finalize_cancel(id);
            return;
        }

        match self.store.mark_completed(id) {
            Ok(job) => {
                tracing::info!(job_id = %id, run_count = job.run_count, "job completed");
            }
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "completion rejected");
                self.finalize_cancel(id);
            }
        }
    }

    /// Failure path; a pending cancel takes precedence over `failed`
    fn fail(&self, id: JobId, detail: String) {
        if self.store.is_cancel_requested(id).unwrap_or(false) {
            self.finalize_cancel(id);
            return;
        }
        match self.store.mark_failed(id, &detail) {
            Ok(_) => tracing::warn!(job_id = %id, detail = %detail, "job failed"),
            Err(e) => {
                // A cancel that raced in between the flag read and the
                // transition still has to resolve the job.
                tracing::warn!(job_id = %id, error = %e, "failure could not be recorded");
                self.finalize_cancel(id);
            }
        }
    }

    fn finalize_cancel(&self, id: JobId) {
        match self.store.finalize_cancelled(id) {
            Ok(job) => {
                tracing::info!(job_id = %id, run_count = job.run_count, "job cancelled");
            }
            Err(e) => {
                tracing::warn!(job_id = %id, error = %e, "cancel finalization rejected");
            }
        }
    }
}
