//! Mock source for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::models::{PaperRef, SearchQuery, SearchResponse};
use crate::sources::{Source, SourceCapabilities, SourceError, DEFAULT_MIN_TEXT_LEN};

/// A mock source for testing that returns predefined responses.
///
/// Every `fetch_text` call is recorded so tests can check which sources the
/// retrieval chain actually consulted.
#[derive(Debug)]
pub struct MockSource {
    id: String,
    capabilities: SourceCapabilities,
    min_text_len: usize,
    texts: HashMap<String, String>,
    references: HashMap<String, Vec<String>>,
    offline: bool,
    search_response: Mutex<Option<SearchResponse>>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    /// Create a full-text mock source with no papers.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            capabilities: SourceCapabilities::FULL_TEXT,
            min_text_len: DEFAULT_MIN_TEXT_LEN,
            texts: HashMap::new(),
            references: HashMap::new(),
            offline: false,
            search_response: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capabilities(mut self, capabilities: SourceCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_min_text_len(mut self, len: usize) -> Self {
        self.min_text_len = len;
        self
    }

    /// Text returned for one DOI
    pub fn with_text(mut self, doi: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(doi.into(), text.into());
        self
    }

    /// Outgoing reference DOIs for one DOI
    pub fn with_references(mut self, doi: impl Into<String>, refs: &[&str]) -> Self {
        self.references
            .insert(doi.into(), refs.iter().map(|r| r.to_string()).collect());
        self
    }

    /// Fail every request with a network error
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Papers returned by `search`
    pub fn with_search_results(self, dois: &[&str]) -> Self {
        let papers = dois.iter().map(|d| PaperRef::new(*d)).collect();
        self.set_search_response(SearchResponse::new(papers, "Mock Source", ""));
        self
    }

    /// Set the search response to return.
    pub fn set_search_response(&self, response: SearchResponse) {
        let mut guard = self
            .search_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(response);
    }

    /// DOIs passed to `fetch_text`, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_online(&self) -> Result<(), SourceError> {
        if self.offline {
            Err(SourceError::Network(format!("{} is offline", self.id)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    fn capabilities(&self) -> SourceCapabilities {
        self.capabilities
    }

    fn min_text_len(&self) -> usize {
        self.min_text_len
    }

    async fn fetch_text(&self, doi: &str) -> Result<String, SourceError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(doi.to_string());
        self.check_online()?;

        self.texts
            .get(doi)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(doi.to_string()))
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        if !self.supports_search() {
            return Err(SourceError::NotImplemented);
        }
        self.check_online()?;

        let guard = self
            .search_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut response = match &*guard {
            Some(response) => response.clone(),
            None => SearchResponse::new(Vec::new(), "Mock Source", &query.query),
        };
        response.papers.truncate(query.max_results);
        response.query = query.query.clone();
        Ok(response)
    }

    async fn get_references(&self, doi: &str) -> Result<Vec<String>, SourceError> {
        if !self.supports_citations() {
            return Err(SourceError::NotImplemented);
        }
        self.check_online()?;

        Ok(self.references.get(doi).cloned().unwrap_or_default())
    }
}

/// Text long enough to pass the default length threshold, embedding `content`.
pub fn padded_text(content: &str) -> String {
    format!("{} {}", content, "Lorem ipsum dolor sit amet. ".repeat(8))
}
