//! Route handlers
//!
//! Thin translation layer: parse path/body, call the engine, map
//! errors through [`crate::error::ApiError`].

pub mod estimate;
pub mod generate;
pub mod jobs;

pub use estimate::estimate_handler;
pub use generate::generate_handler;
pub use jobs::{cancel_handler, get_job_handler, list_jobs_handler, retry_handler};
