//! Search request and response models used by discovery mode.

use serde::{Deserialize, Serialize};

use crate::models::PaperRef;

/// Search query parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Main search query string
    pub query: String,

    /// Maximum number of results to return
    pub max_results: usize,

    /// Only return papers with open-access full text
    pub open_access_only: bool,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            max_results: 25,
            open_access_only: false,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Restrict to open-access papers
    pub fn open_access_only(mut self, open_access_only: bool) -> Self {
        self.open_access_only = open_access_only;
        self
    }
}

/// Response from a literature search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Papers found (only those with a DOI)
    pub papers: Vec<PaperRef>,

    /// Total number of hits reported by the index
    pub total_results: Option<usize>,

    /// Source of the results
    pub source: String,

    /// Query that was executed
    pub query: String,
}

impl SearchResponse {
    /// Create a new search response
    pub fn new(papers: Vec<PaperRef>, source: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            papers,
            total_results: None,
            source: source.into(),
            query: query.into(),
        }
    }

    /// Set total results
    pub fn total_results(mut self, total: usize) -> Self {
        self.total_results = Some(total);
        self
    }
}
