//! Core types for the generation job engine
//!
//! Defines the fundamental types of the engine:
//! - Identifiers (jobs, projects, manuscripts)
//! - Manuscript section vocabulary
//! - Job status and the job record itself
//! - Engine configuration

use crate::pricing::{PricingConfig, PricingEstimate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ulid::Ulid;

/// Unique job identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(pub Ulid);

impl JobId {
    /// Generate new job ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

/// Opaque project identifier, supplied by the caller on every request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Create from any string-like value
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque manuscript identifier; a job always belongs to exactly one manuscript
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManuscriptId(pub String);

impl ManuscriptId {
    /// Create from any string-like value
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ManuscriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Manuscript section vocabulary
///
/// The closed set of sections a job may request. Request order is
/// execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Abstract
    Abstract,
    /// Introduction
    Introduction,
    /// Background
    Background,
    /// Methods
    Methods,
    /// Results
    Results,
    /// Discussion
    Discussion,
    /// Limitations
    Limitations,
    /// Conclusion
    Conclusion,
}

impl Section {
    /// Stable wire name of the section
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Abstract => "abstract",
            Section::Introduction => "introduction",
            Section::Background => "background",
            Section::Methods => "methods",
            Section::Results => "results",
            Section::Discussion => "discussion",
            Section::Limitations => "limitations",
            Section::Conclusion => "conclusion",
        }
    }

    /// All known sections, in conventional manuscript order
    #[must_use]
    pub fn all() -> &'static [Section] {
        &[
            Section::Abstract,
            Section::Introduction,
            Section::Background,
            Section::Methods,
            Section::Results,
            Section::Discussion,
            Section::Limitations,
            Section::Conclusion,
        ]
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::all()
            .iter()
            .find(|section| section.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

/// Error returned when parsing an unrecognized section name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

/// Job status
///
/// Tagged state of the job state machine. Terminal states are
/// `completed`, `failed` and `cancelled`; no transition leaves a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Admitted, waiting for the executor to pick it up
    Queued,
    /// Executor is generating sections
    Running,
    /// Cancellation requested while running; resolves to `Cancelled`
    /// at the next per-section checkpoint
    CancelRequested,
    /// All requested sections generated and persisted
    Completed,
    /// A section generation or persistence call failed
    Failed,
    /// Cancellation observed and finalized
    Cancelled,
}

impl JobStatus {
    /// Check if no further transitions can occur
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    /// Check if the job still occupies its manuscript
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }
}

/// One request to generate a set of manuscript sections
///
/// The central entity of the engine. Created only through the
/// admission path and never deleted; terminal jobs stay queryable for
/// audit and retry-chain traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Opaque unique identifier, immutable after creation
    pub id: JobId,
    /// Owning project
    pub project_id: ProjectId,
    /// Owning manuscript
    pub manuscript_id: ManuscriptId,
    /// Current state-machine status
    pub status: JobStatus,
    /// Cooperative cancellation flag; set once, never cleared
    pub cancel_requested: bool,
    /// Number of sections successfully completed so far
    pub run_count: usize,
    /// Back-reference to the job this one retries, if any
    pub parent_job_id: Option<JobId>,
    /// Requested sections, in execution order
    pub sections: Vec<Section>,
    /// Free-text generation brief, opaque to the engine
    pub notes_context: String,
    /// Per-run spend cap replayed on retry, if the caller set one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_estimated_cost_usd: Option<f64>,
    /// Project daily budget replayed on retry, if the caller set one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_daily_budget_usd: Option<f64>,
    /// Derived completion percentage, 0-100
    pub progress_percent: u8,
    /// Section currently being generated; null when not running
    pub current_section: Option<Section>,
    /// Failure message, populated only on `failed`
    pub error_detail: Option<String>,
    /// Set at insert
    pub created_at: DateTime<Utc>,
    /// Set on first transition to `running`
    pub started_at: Option<DateTime<Utc>>,
    /// Set on any terminal transition
    pub completed_at: Option<DateTime<Utc>>,
    /// Pricing snapshot captured at admission time, never recomputed
    #[serde(flatten)]
    pub pricing: PricingEstimate,
}

impl Job {
    /// Create a freshly admitted job in `queued` state
    ///
    /// Only the admission path should call this; the pricing snapshot
    /// must come from the estimator run during admission.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        manuscript_id: ManuscriptId,
        sections: Vec<Section>,
        notes_context: impl Into<String>,
        pricing: PricingEstimate,
    ) -> Self {
        Self {
            id: JobId::new(),
            project_id,
            manuscript_id,
            status: JobStatus::Queued,
            cancel_requested: false,
            run_count: 0,
            parent_job_id: None,
            sections,
            notes_context: notes_context.into(),
            max_estimated_cost_usd: None,
            project_daily_budget_usd: None,
            progress_percent: 0,
            current_section: None,
            error_detail: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            pricing,
        }
    }

    /// With parent job linkage (retry chain)
    #[inline]
    #[must_use]
    pub fn with_parent(mut self, parent: JobId) -> Self {
        self.parent_job_id = Some(parent);
        self
    }

    /// With the caller-supplied spend caps
    #[inline]
    #[must_use]
    pub fn with_caps(mut self, per_run: Option<f64>, daily: Option<f64>) -> Self {
        self.max_estimated_cost_usd = per_run;
        self.project_daily_budget_usd = daily;
        self
    }

    /// Total number of requested sections
    #[inline]
    #[must_use]
    pub fn total_sections(&self) -> usize {
        self.sections.len()
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pricing model parameters used for every estimate
    pub pricing: PricingConfig,
    /// Per-run cap applied when a request does not carry one
    pub default_max_cost_usd: Option<f64>,
    /// Daily budget applied when a request does not carry one
    pub default_daily_budget_usd: Option<f64>,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a default per-run cap
    #[inline]
    #[must_use]
    pub fn with_max_cost_usd(mut self, cap: f64) -> Self {
        self.default_max_cost_usd = Some(cap);
        self
    }

    /// With a default daily budget
    #[inline]
    #[must_use]
    pub fn with_daily_budget_usd(mut self, cap: f64) -> Self {
        self.default_daily_budget_usd = Some(cap);
        self
    }

    /// With pricing parameters
    #[inline]
    #[must_use]
    pub fn with_pricing(mut self, pricing: PricingConfig) -> Self {
        self.pricing = pricing;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            default_max_cost_usd: None,
            default_daily_budget_usd: None,
        }
    }
}
