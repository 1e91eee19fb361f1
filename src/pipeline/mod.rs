//! The per-DOI pipeline: retrieve text, scan it, report.
//!
//! [`ArchiveFinder`] ties the [`RetrievalChain`] to the archive pattern
//! table. Papers are processed strictly one after another.

mod discovery;
mod retrieval;

pub use discovery::{default_query, is_descriptor_doi, DiscoveryOptions};
pub use retrieval::{RetrievalChain, RetrievedText};

use std::time::Duration;

use crate::config::{Config, PolitenessConfig};
use crate::models::{FindResult, NO_TEXT_ERROR};
use crate::patterns::{archives, scan_text, ArchiveDefinition};
use crate::sources::{SourceError, SourceRegistry};
use crate::utils::normalize_doi;

/// Finds dataset references in papers
#[derive(Debug, Clone)]
pub struct ArchiveFinder {
    chain: RetrievalChain,
    archives: Vec<ArchiveDefinition>,
    paper_delay: Duration,
}

impl ArchiveFinder {
    pub fn new(registry: SourceRegistry, politeness: &PolitenessConfig) -> Self {
        Self {
            chain: RetrievalChain::new(registry, politeness.source_delay()),
            archives: archives().to_vec(),
            paper_delay: politeness.paper_delay(),
        }
    }

    /// Build the sources and pauses from configuration
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let registry = SourceRegistry::from_config(config)?;
        Ok(Self::new(registry, &config.politeness))
    }

    /// Scan for a different set of archives
    pub fn with_archives(mut self, archives: Vec<ArchiveDefinition>) -> Self {
        self.archives = archives;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        self.chain.registry()
    }

    /// Find dataset references in one paper
    ///
    /// Never fails: invalid DOIs and missing text are reported in the
    /// result's `error` field with empty `archives`.
    pub async fn find_references(&self, doi: &str) -> FindResult {
        let doi = match normalize_doi(doi) {
            Ok(doi) => doi,
            Err(e) => return FindResult::failed(doi.trim(), e.to_string()),
        };

        let Some(retrieved) = self.chain.retrieve(&doi).await else {
            return FindResult::failed(doi, NO_TEXT_ERROR);
        };

        let mut result = FindResult::new(doi);
        result.source = retrieved.label();
        result.archives = scan_text(&retrieved.text, &self.archives);

        tracing::debug!(
            "{}: {} datasets via {}",
            result.doi,
            result.dataset_count(),
            result.source
        );
        result
    }

    /// Find dataset references in several papers, in order
    ///
    /// `on_result` is called as each paper finishes.
    pub async fn find_all<F>(&self, dois: &[String], mut on_result: F) -> Vec<FindResult>
    where
        F: FnMut(&FindResult),
    {
        let mut results = Vec::with_capacity(dois.len());

        for (index, doi) in dois.iter().enumerate() {
            if index > 0 {
                self.pause_between_papers().await;
            }
            let result = self.find_references(doi).await;
            on_result(&result);
            results.push(result);
        }

        results
    }

    async fn pause_between_papers(&self) {
        if !self.paper_delay.is_zero() {
            tokio::time::sleep(self.paper_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::mock::padded_text;
    use crate::sources::{MockSource, SourceCapabilities};
    use std::sync::Arc;

    fn finder(sources: Vec<MockSource>) -> ArchiveFinder {
        let mut registry = SourceRegistry::new();
        for source in sources {
            registry.register(Arc::new(source));
        }
        ArchiveFinder::new(registry, &PolitenessConfig::none())
    }

    #[tokio::test]
    async fn test_find_references() {
        let text = padded_text(
            "Data available at 10.18112/openneuro.ds000117 and physionet.org/content/mimic-iii",
        );
        let finder = finder(vec![MockSource::new("europe_pmc").with_text("10.1234/a", text)]);

        let result = finder.find_references("https://doi.org/10.1234/a").await;

        assert_eq!(result.doi, "10.1234/a");
        assert_eq!(result.source, "europe_pmc");
        assert!(result.error.is_none());
        assert_eq!(result.archives["OpenNeuro"].dataset_ids, vec!["000117"]);
        assert_eq!(result.archives["PhysioNet"].dataset_ids, vec!["mimic-iii"]);
        assert!(!result.archives.contains_key("DANDI Archive"));
        assert_eq!(result.dataset_count(), 2);
    }

    #[tokio::test]
    async fn test_restricted_archives() {
        let text = padded_text("DANDI:000130 and ds000117");
        let openneuro = crate::patterns::archive("OpenNeuro").unwrap().clone();
        let finder = finder(vec![MockSource::new("europe_pmc").with_text("10.1234/a", text)])
            .with_archives(vec![openneuro]);

        let result = finder.find_references("10.1234/a").await;

        assert_eq!(result.archives.len(), 1);
        assert_eq!(result.archives["OpenNeuro"].dataset_ids, vec!["000117"]);
    }

    #[tokio::test]
    async fn test_no_text_is_an_error() {
        let finder = finder(vec![MockSource::new("europe_pmc").offline()]);

        let result = finder.find_references("10.1234/missing").await;

        assert_eq!(result.error.as_deref(), Some(NO_TEXT_ERROR));
        assert!(result.archives.is_empty());
        assert_eq!(result.source, "");
    }

    #[tokio::test]
    async fn test_invalid_doi_skips_sources() {
        let source = Arc::new(MockSource::new("europe_pmc"));
        let mut registry = SourceRegistry::new();
        registry.register(source.clone());
        let finder = ArchiveFinder::new(registry, &PolitenessConfig::none());

        let result = finder.find_references("  not-a-doi ").await;

        assert_eq!(result.doi, "not-a-doi");
        assert_eq!(result.error.as_deref(), Some("Invalid DOI format: not-a-doi"));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_references_only_result() {
        let finder = finder(vec![
            MockSource::new("europe_pmc"),
            MockSource::new("crossref")
                .with_capabilities(SourceCapabilities::REFERENCES)
                .with_text("10.1234/r", padded_text("10.48324/dandi.000130")),
        ]);

        let result = finder.find_references("10.1234/r").await;

        assert!(result.is_references_only());
        assert_eq!(result.archives["DANDI Archive"].dataset_ids, vec!["000130"]);
    }

    #[tokio::test]
    async fn test_find_all_keeps_order() {
        let finder = finder(vec![MockSource::new("europe_pmc")
            .with_text("10.1234/a", padded_text("DANDI:000001"))
            .with_text("10.1234/b", padded_text("ds000002"))]);

        let dois = vec!["10.1234/b".to_string(), "bad".to_string(), "10.1234/a".to_string()];
        let mut seen = Vec::new();
        let results = finder
            .find_all(&dois, |r| seen.push(r.doi.clone()))
            .await;

        assert_eq!(seen, vec!["10.1234/b", "bad", "10.1234/a"]);
        assert_eq!(results.len(), 3);
        assert!(results[1].error.is_some());
        assert_eq!(results[2].archives["DANDI Archive"].dataset_ids, vec!["000001"]);
    }
}
