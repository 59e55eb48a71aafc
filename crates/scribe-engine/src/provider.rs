//! External collaborator seams
//!
//! The engine consumes two opaque collaborators:
//! - a generation provider (one completion call per section)
//! - a manuscript store (one section patch per successful generation)
//!
//! Both are async traits so real adapters and test doubles plug in
//! the same way. The provider is assumed to carry its own
//! retry/timeout policy; the executor treats any error as job failure.

use crate::error::ProviderError;
use crate::types::{ManuscriptId, ProjectId, Section};
use dashmap::DashMap;
use std::collections::HashMap;

/// Output of one per-section completion call
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSection {
    /// Generated prose for the section
    pub text: String,
    /// Input tokens reported by the provider
    pub input_tokens: u64,
    /// Output tokens reported by the provider
    pub output_tokens: u64,
}

/// Generation provider seam
///
/// May block for the duration of the external round trip; this is the
/// only suspension point in the executor loop.
#[async_trait::async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate prose for one section against the job's notes context
    async fn generate(
        &self,
        section: Section,
        notes_context: &str,
    ) -> Result<GeneratedSection, ProviderError>;
}

/// Manuscript persistence seam
#[async_trait::async_trait]
pub trait ManuscriptStore: Send + Sync {
    /// Persist one generated section onto the manuscript record
    async fn patch_section(
        &self,
        project_id: &ProjectId,
        manuscript_id: &ManuscriptId,
        section: Section,
        text: &str,
    ) -> Result<(), ProviderError>;
}

/// In-memory manuscript store
///
/// Default store for tests and embedders that do not wire a real
/// persistence driver.
#[derive(Debug, Default)]
pub struct InMemoryManuscriptStore {
    records: DashMap<(ProjectId, ManuscriptId), HashMap<Section, String>>,
}

impl InMemoryManuscriptStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read back a persisted section, if present
    #[must_use]
    pub fn section_text(
        &self,
        project_id: &ProjectId,
        manuscript_id: &ManuscriptId,
        section: Section,
    ) -> Option<String> {
        self.records
            .get(&(project_id.clone(), manuscript_id.clone()))
            .and_then(|record| record.get(&section).cloned())
    }

    /// Number of sections persisted for a manuscript
    #[must_use]
    pub fn section_count(&self, project_id: &ProjectId, manuscript_id: &ManuscriptId) -> usize {
        self.records
            .get(&(project_id.clone(), manuscript_id.clone()))
            .map(|record| record.len())
            .unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl ManuscriptStore for InMemoryManuscriptStore {
    async fn patch_section(
        &self,
        project_id: &ProjectId,
        manuscript_id: &ManuscriptId,
        section: Section,
        text: &str,
    ) -> Result<(), ProviderError> {
        self.records
            .entry((project_id.clone(), manuscript_id.clone()))
            .or_default()
            .insert(section, text.to_string());
        Ok(())
    }
}
