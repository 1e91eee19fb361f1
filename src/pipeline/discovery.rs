//! Discovery mode: search the literature index and scan every hit.
//!
//! Candidates come from the first search-capable source. Unless disabled,
//! each candidate's reference list is checked for data descriptor papers
//! (Scientific Data, Data in Brief, GigaScience, ...), which are scanned too
//! and tagged with `cited_by`.

use std::collections::{HashSet, VecDeque};

use crate::config::DiscoveryConfig;
use crate::models::{FindResult, SearchQuery};
use crate::patterns::ArchiveDefinition;
use crate::pipeline::ArchiveFinder;
use crate::sources::SourceError;
use crate::utils::normalize_doi;

/// Settings for one discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub query: String,
    pub max_results: usize,
    pub follow_citations: bool,
    pub open_access_only: bool,
    pub descriptor_prefixes: Vec<String>,
}

impl DiscoveryOptions {
    /// Options from configuration; the query defaults to the archive names
    pub fn from_config(config: &DiscoveryConfig, archives: &[ArchiveDefinition]) -> Self {
        Self {
            query: config
                .query
                .clone()
                .filter(|q| !q.trim().is_empty())
                .unwrap_or_else(|| default_query(archives)),
            max_results: config.max_results,
            follow_citations: config.follow_citations,
            open_access_only: config.open_access_only,
            descriptor_prefixes: config.descriptor_prefixes.clone(),
        }
    }
}

/// `"DANDI Archive" OR "OpenNeuro" OR ...` over the given archives
pub fn default_query(archives: &[ArchiveDefinition]) -> String {
    archives
        .iter()
        .map(|a| format!("\"{}\"", a.name))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Whether a DOI belongs to one of the data descriptor venues
pub fn is_descriptor_doi(doi: &str, prefixes: &[String]) -> bool {
    let doi = doi.to_ascii_lowercase();
    prefixes
        .iter()
        .any(|prefix| doi.starts_with(&prefix.to_ascii_lowercase()))
}

impl ArchiveFinder {
    /// Run a discovery search and scan every candidate paper
    ///
    /// Each DOI is scanned at most once. Only the search itself can fail the
    /// run; per-paper problems end up in the individual results.
    pub async fn discover<F>(
        &self,
        options: &DiscoveryOptions,
        mut on_result: F,
    ) -> Result<Vec<FindResult>, SourceError>
    where
        F: FnMut(&FindResult),
    {
        let searcher = self
            .registry()
            .searcher()
            .ok_or_else(|| SourceError::NotFound("No source supports search".to_string()))?;

        let query = SearchQuery::new(&options.query)
            .max_results(options.max_results)
            .open_access_only(options.open_access_only);
        let response = searcher.search(&query).await?;

        tracing::info!(
            "Discovery query {} matched {} papers, scanning {}",
            options.query,
            response
                .total_results
                .map_or_else(|| "?".to_string(), |n| n.to_string()),
            response.papers.len()
        );

        let mut seen: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, Option<String>)> = VecDeque::new();
        for paper in response.papers {
            match normalize_doi(&paper.doi) {
                Ok(doi) if seen.insert(doi.to_ascii_lowercase()) => queue.push_back((doi, None)),
                Ok(_) => {}
                Err(e) => tracing::debug!("Skipping search hit: {}", e),
            }
        }

        let mut results = Vec::with_capacity(queue.len());
        while let Some((doi, cited_by)) = queue.pop_front() {
            if !results.is_empty() {
                self.pause_between_papers().await;
            }

            let mut result = self.find_references(&doi).await;
            if let Some(citing) = &cited_by {
                result = result.cited_by(citing.clone());
            }
            on_result(&result);
            results.push(result);

            if options.follow_citations && cited_by.is_none() {
                for descriptor in self.descriptor_references(&doi, options).await {
                    if seen.insert(descriptor.to_ascii_lowercase()) {
                        tracing::info!("Following {} cited by {}", descriptor, doi);
                        queue.push_back((descriptor, Some(doi.clone())));
                    }
                }
            }
        }

        Ok(results)
    }

    /// Data descriptor DOIs in a paper's reference list
    async fn descriptor_references(&self, doi: &str, options: &DiscoveryOptions) -> Vec<String> {
        let Some(source) = self.registry().citation_source() else {
            return Vec::new();
        };

        match source.get_references(doi).await {
            Ok(references) => references
                .iter()
                .filter(|r| is_descriptor_doi(r, &options.descriptor_prefixes))
                .filter_map(|r| normalize_doi(r).ok())
                .collect(),
            Err(e) => {
                tracing::debug!("Could not list references of {}: {}", doi, e);
                Vec::new()
            }
        }
    }
}
