//! Testing utilities for the Scribe workspace
//!
//! Shared test doubles and fixtures: scripted generation providers,
//! polling helpers and engine constructors.

#![allow(missing_docs)]

use dashmap::DashMap;
use parking_lot::Mutex;
use scribe_engine::{
    EngineConfig, GeneratedSection, GenerationEngine, GenerationProvider, InMemoryManuscriptStore,
    Job, JobId, ManuscriptId, ProjectId, ProviderError, Section,
};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::sync::Notify;

static TRACING: Once = Once::new();

/// Install a process-wide test subscriber honoring `RUST_LOG`.
///
/// Called by the engine constructors below so every suite gets engine
/// traces captured per test; safe to call repeatedly.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Generation provider with scripted per-section outcomes.
///
/// Succeeds for every section unless a failure was scripted; records
/// the order of generation calls.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    fail_on: DashMap<Section, String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<Section>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a failure for one section
    pub fn fail_on(self, section: Section, message: impl Into<String>) -> Self {
        self.fail_on.insert(section, message.into());
        self
    }

    /// Sleep this long inside every generation call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sections generated so far, in call order
    pub fn calls(&self) -> Vec<Section> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn generate(
        &self,
        section: Section,
        notes_context: &str,
    ) -> Result<GeneratedSection, ProviderError> {
        self.calls.lock().push(section);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.fail_on.get(&section) {
            return Err(ProviderError::Generation(message.value().clone()));
        }
        Ok(GeneratedSection {
            text: format!("generated {section} ({} bytes of notes)", notes_context.len()),
            input_tokens: 120,
            output_tokens: 480,
        })
    }
}

/// Generation provider that parks inside configured sections until
/// released, so tests can interleave commands with a running job
/// deterministically.
#[derive(Debug, Default)]
pub struct GatedProvider {
    gates: DashMap<Section, Arc<Notify>>,
}

impl GatedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park the provider at the start of this section's call
    pub fn hold(&self, section: Section) {
        self.gates.insert(section, Arc::new(Notify::new()));
    }

    /// Let a held section call proceed
    pub fn release(&self, section: Section) {
        if let Some(gate) = self.gates.get(&section) {
            // Stores a permit if the call has not parked yet
            gate.notify_one();
        }
    }
}

#[async_trait::async_trait]
impl GenerationProvider for GatedProvider {
    async fn generate(
        &self,
        section: Section,
        _notes_context: &str,
    ) -> Result<GeneratedSection, ProviderError> {
        let gate = self.gates.get(&section).map(|g| Arc::clone(g.value()));
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(GeneratedSection {
            text: format!("generated {section}"),
            input_tokens: 80,
            output_tokens: 300,
        })
    }
}

/// Engine over the given provider and a fresh in-memory manuscript store
pub fn engine_with(
    config: EngineConfig,
    provider: Arc<dyn GenerationProvider>,
) -> (GenerationEngine, Arc<InMemoryManuscriptStore>) {
    init_tracing();
    let manuscripts = Arc::new(InMemoryManuscriptStore::new());
    let engine = GenerationEngine::new(config, provider, manuscripts.clone());
    (engine, manuscripts)
}

/// Engine with default config and an always-succeeding provider
pub fn default_engine() -> (GenerationEngine, Arc<InMemoryManuscriptStore>) {
    engine_with(EngineConfig::new(), Arc::new(ScriptedProvider::new()))
}

pub fn test_project() -> ProjectId {
    ProjectId::new("proj-1")
}

pub fn test_manuscript() -> ManuscriptId {
    ManuscriptId::new("ms-1")
}

/// Poll until the job satisfies the predicate; panics after 5 seconds.
pub async fn wait_for<F>(engine: &GenerationEngine, id: JobId, predicate: F) -> Job
where
    F: Fn(&Job) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let job = engine.get_job(id).expect("job should exist while polling");
        if predicate(&job) {
            return job;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting on job {id}, last status {:?}", job.status);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Poll until the job reaches any terminal status
pub async fn wait_for_terminal(engine: &GenerationEngine, id: JobId) -> Job {
    wait_for(engine, id, |job| job.status.is_terminal()).await
}
