//! Ordered fallback over the registered text sources.

use std::sync::Arc;
use std::time::Duration;

use crate::sources::{Source, SourceRegistry};
use crate::utils::text_len;

/// Text obtained for one paper and the sources it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedText {
    /// Texts of every contributing source, separated by blank lines
    pub text: String,

    /// Contributing source ids in retrieval order
    pub sources: Vec<String>,
}

impl RetrievedText {
    /// Provenance label, e.g. `europe_pmc+crossref`
    pub fn label(&self) -> String {
        self.sources.join("+")
    }
}

/// Retrieval chain over a [`SourceRegistry`]
///
/// 1. Full-text sources in priority order; the first hit wins.
/// 2. Every references source; hits are appended.
/// 3. Fallback sources, only when step 1 found nothing; the first hit wins.
///
/// Failures are logged and skipped.
#[derive(Debug, Clone)]
pub struct RetrievalChain {
    registry: SourceRegistry,
    source_delay: Duration,
}

impl RetrievalChain {
    pub fn new(registry: SourceRegistry, source_delay: Duration) -> Self {
        Self {
            registry,
            source_delay,
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Retrieve the best available text for a DOI, or `None` when every source misses
    pub async fn retrieve(&self, doi: &str) -> Option<RetrievedText> {
        let mut parts: Vec<String> = Vec::new();
        let mut used: Vec<String> = Vec::new();
        let mut attempts = 0usize;

        for source in self.registry.full_text() {
            if let Some(text) = self.attempt(source, doi, &mut attempts).await {
                parts.push(text);
                used.push(source.id().to_string());
                break;
            }
        }
        let has_full_text = !used.is_empty();

        for source in self.registry.references() {
            if used.iter().any(|id| id == source.id()) {
                continue;
            }
            if let Some(text) = self.attempt(source, doi, &mut attempts).await {
                parts.push(text);
                used.push(source.id().to_string());
            }
        }

        if !has_full_text {
            for source in self.registry.fallback() {
                if let Some(text) = self.attempt(source, doi, &mut attempts).await {
                    parts.push(text);
                    used.push(source.id().to_string());
                    break;
                }
            }
        }

        if parts.is_empty() {
            tracing::debug!("No source returned text for {}", doi);
            return None;
        }

        Some(RetrievedText {
            text: parts.join("\n\n"),
            sources: used,
        })
    }

    /// One source request, preceded by the politeness pause
    async fn attempt(
        &self,
        source: &Arc<dyn Source>,
        doi: &str,
        attempts: &mut usize,
    ) -> Option<String> {
        if *attempts > 0 && !self.source_delay.is_zero() {
            tokio::time::sleep(self.source_delay).await;
        }
        *attempts += 1;

        tracing::debug!("Trying {} for {}", source.name(), doi);
        match source.fetch_text(doi).await {
            Ok(text) => {
                let len = text_len(&text);
                if len > source.min_text_len() {
                    tracing::debug!("Got text from {} ({} chars)", source.id(), len);
                    Some(text)
                } else {
                    tracing::debug!("Insufficient text from {} ({} chars)", source.id(), len);
                    None
                }
            }
            Err(e) => {
                tracing::debug!("{} failed for {}: {}", source.name(), doi, e);
                None
            }
        }
    }
}
