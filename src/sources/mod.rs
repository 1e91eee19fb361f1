//! Text source plugins with a trait-based architecture.
//!
//! This module defines the [`Source`] trait that every text source implements.
//! A source plays one or more roles in the retrieval chain, advertised through
//! [`SourceCapabilities`]:
//!
//! - `FULL_TEXT` - open-access full text (Europe PMC, NCBI PMC)
//! - `REFERENCES` - bibliographic metadata and reference lists (CrossRef)
//! - `FALLBACK_TEXT` - last-resort text when no full text exists (publisher HTML)
//! - `SEARCH` - literature search for discovery runs (Europe PMC)
//! - `CITATIONS` - outgoing reference DOIs for citation following (CrossRef)
//!
//! # Feature Flags
//!
//! Individual sources can be left out at compile time:
//!
//! - `europe_pmc` - Europe PMC full text and search (default: enabled)
//! - `pmc` - NCBI PubMed Central full text (default: enabled)
//! - `crossref` - CrossRef metadata and references (default: enabled)
//! - `publisher` - publisher landing page scraping (default: enabled)
//!
//! # Runtime Source Configuration
//!
//! Compiled-in sources are ordered and filtered by the `[sources]` section of
//! the configuration:
//!
//! ```bash
//! # Skip the publisher scraper
//! export ARCHIVE_FINDER_SOURCES__DISABLED="publisher_html"
//!
//! # Prefer NCBI PMC over Europe PMC
//! export ARCHIVE_FINDER_SOURCES__ORDER="ncbi_pmc,europe_pmc,crossref,publisher_html"
//! ```

#[cfg(feature = "source-crossref")]
mod crossref;
#[cfg(feature = "source-europe_pmc")]
mod europe_pmc;
#[cfg(feature = "source-pmc")]
mod pmc;
#[cfg(feature = "source-publisher")]
mod publisher;
mod registry;

pub mod mock;

pub use mock::MockSource;

pub use registry::{SourceCapabilities, SourceRegistry};

#[cfg(feature = "source-crossref")]
pub use crossref::CrossRefSource;
#[cfg(feature = "source-europe_pmc")]
pub use europe_pmc::EuropePmcSource;
#[cfg(feature = "source-pmc")]
pub use pmc::PmcSource;
#[cfg(feature = "source-publisher")]
pub use publisher::PublisherSource;

use crate::models::{SearchQuery, SearchResponse};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};

/// Minimum text length a source must return to count as a hit
pub const DEFAULT_MIN_TEXT_LEN: usize = 100;

/// The Source trait defines the interface for all text source plugins.
///
/// # Implementing a New Source
///
/// 1. Create a new struct that implements `Source`
/// 2. Implement `id`, `name` and `capabilities`
/// 3. Implement the methods matching the advertised capabilities
/// 4. Add the source to [`SourceRegistry::from_config`] or register it dynamically
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Unique identifier, also used as the provenance label (e.g. "europe_pmc")
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Describe the capabilities of this source
    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::FULL_TEXT
    }

    /// Whether this source provides full text
    fn supports_full_text(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::FULL_TEXT)
    }

    /// Whether this source supports literature search
    fn supports_search(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::SEARCH)
    }

    /// Whether this source can list a paper's outgoing references
    fn supports_citations(&self) -> bool {
        self.capabilities().contains(SourceCapabilities::CITATIONS)
    }

    /// Texts of this length or shorter are treated as a miss
    fn min_text_len(&self) -> usize {
        DEFAULT_MIN_TEXT_LEN
    }

    /// Retrieve plain text for the paper with this DOI
    async fn fetch_text(&self, _doi: &str) -> Result<String, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// Search for papers matching the query
    async fn search(&self, _query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        Err(SourceError::NotImplemented)
    }

    /// DOIs referenced by the paper with this DOI
    async fn get_references(&self, _doi: &str) -> Result<Vec<String>, SourceError> {
        Err(SourceError::NotImplemented)
    }
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The requested operation is not implemented for this source
    #[error("Operation not implemented for this source")]
    NotImplemented,

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON, HTML, etc.)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Paper not found, or no open-access copy
    #[error("Paper not found: {0}")]
    NotFound(String),

    /// API error from the source
    #[error("API error: {0}")]
    Api(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

/// Map a non-success HTTP status to the matching [`SourceError`]
pub(crate) fn check_status(response: Response, source: &str) -> Result<Response, SourceError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::TOO_MANY_REQUESTS => Err(SourceError::RateLimit),
        StatusCode::NOT_FOUND => Err(SourceError::NotFound(format!(
            "{} returned 404 for {}",
            source,
            response.url()
        ))),
        status => Err(SourceError::Api(format!(
            "{} returned status: {}",
            source, status
        ))),
    }
}
