//! Scribe Engine - manuscript generation job engine
//!
//! The subsystem that turns a request to draft manuscript sections
//! into a tracked, budget-guarded, cancellable background job:
//! - Estimates token/cost bounds before committing
//! - Enforces per-run and daily spend caps at admission
//! - Executes sections sequentially with progress reporting
//! - Supports cooperative cancellation and explicit retry
//! - Answers idempotent status polls
//!
//! # Example
//!
//! ```rust,ignore
//! use scribe_engine::{
//!     EngineConfig, GenerationEngine, GenerationRequest, ManuscriptId, ProjectId, Section,
//! };
//!
//! # async fn example(provider: std::sync::Arc<dyn scribe_engine::GenerationProvider>,
//! #                  store: std::sync::Arc<dyn scribe_engine::ManuscriptStore>)
//! # -> Result<(), Box<dyn std::error::Error>> {
//! let engine = GenerationEngine::new(EngineConfig::new(), provider, store);
//!
//! let request = GenerationRequest::new(
//!     vec![Section::Introduction, Section::Methods],
//!     "randomized trial of X vs Y",
//! )
//! .with_max_cost_usd(2.0);
//!
//! let job = engine
//!     .submit(ProjectId::new("p1"), ManuscriptId::new("m1"), request)
//!     .await?;
//! println!("queued {}", job.id);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod budget;
pub mod engine;
pub mod error;
pub mod executor;
pub mod pricing;
pub mod provider;
pub mod state_machine;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use engine::{GenerationEngine, GenerationRequest};
pub use error::{AdmissionError, EngineError, ProviderError, TransitionError};
pub use executor::Executor;
pub use pricing::{PricingConfig, PricingEstimate};
pub use provider::{
    GeneratedSection, GenerationProvider, InMemoryManuscriptStore, ManuscriptStore,
};
pub use store::{JobStore, StartOutcome};
pub use types::{
    EngineConfig, Job, JobId, JobStatus, ManuscriptId, ProjectId, Section, UnknownSection,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the engine
    pub use crate::{
        EngineConfig, EngineError, GenerationEngine, GenerationRequest, Job, JobId, JobStatus,
        ManuscriptId, ProjectId, Section,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
