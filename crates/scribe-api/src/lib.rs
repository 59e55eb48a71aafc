//! HTTP surface for the manuscript generation engine
//!
//! A thin actix-web layer over [`scribe_engine`]: request DTOs, the
//! route table and the engine-error to status-code mapping. The crate
//! exposes [`configure_routes`] so an embedding server mounts the
//! routes on whatever `App` it already runs:
//!
//! ```no_run
//! use actix_web::{web, App, HttpServer};
//! use scribe_api::{configure_routes, AppState};
//! use scribe_engine::{EngineConfig, GenerationEngine, InMemoryManuscriptStore};
//! # use std::sync::Arc;
//! # use scribe_engine::provider::GenerationProvider;
//! # fn provider() -> Arc<dyn GenerationProvider> { unimplemented!() }
//!
//! # async fn run() -> std::io::Result<()> {
//! let manuscripts = Arc::new(InMemoryManuscriptStore::new());
//! let engine = Arc::new(GenerationEngine::new(
//!     EngineConfig::default(),
//!     provider(),
//!     manuscripts,
//! ));
//! let state = web::Data::new(AppState { engine });
//!
//! HttpServer::new(move || {
//!     App::new()
//!         .app_data(state.clone())
//!         .configure(configure_routes)
//! })
//! .bind(("127.0.0.1", 8080))?
//! .run()
//! .await
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

pub use error::ApiError;
pub use models::{EstimateRequest, GenerateRequest, ListQuery};
pub use routes::configure_routes;

use scribe_engine::GenerationEngine;
use std::sync::Arc;

/// Shared application state injected into every handler
#[derive(Clone)]
pub struct AppState {
    /// The generation engine backing all routes
    pub engine: Arc<GenerationEngine>,
}
