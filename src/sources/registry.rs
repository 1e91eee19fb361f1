//! Registry holding the text sources in priority order.

use std::sync::Arc;

use super::{Source, SourceError};
use crate::config::Config;
use crate::utils::{HttpClient, BROWSER_USER_AGENT, DEFAULT_USER_AGENT};

bitflags::bitflags! {
    /// Roles a source can play
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SourceCapabilities: u32 {
        const FULL_TEXT = 1 << 0;
        const REFERENCES = 1 << 1;
        const FALLBACK_TEXT = 1 << 2;
        const SEARCH = 1 << 3;
        const CITATIONS = 1 << 4;
    }
}

/// Registry of the active text sources
///
/// Iteration order is priority order: the retrieval chain tries full-text
/// sources in the order they were registered.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<Arc<dyn Source>>,
}

impl SourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry described by the configuration
    ///
    /// Sources appear in `sources.order`; ids in `sources.disabled`, unknown
    /// ids and sources compiled out by Cargo features are skipped.
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let endpoints = &config.endpoints;
        for (name, value) in [
            ("europe_pmc", &endpoints.europe_pmc),
            ("ncbi_idconv", &endpoints.ncbi_idconv),
            ("ncbi_eutils", &endpoints.ncbi_eutils),
            ("crossref", &endpoints.crossref),
            ("doi_resolver", &endpoints.doi_resolver),
        ] {
            url::Url::parse(value).map_err(|e| {
                SourceError::InvalidRequest(format!("Invalid {} endpoint '{}': {}", name, value, e))
            })?;
        }

        let clients = Clients::from_config(config)?;
        let mut registry = Self::new();

        for id in &config.sources.order {
            if config.sources.disabled.iter().any(|d| d == id) {
                tracing::debug!("Source '{}' disabled by configuration", id);
                continue;
            }
            match build_source(id, config, &clients) {
                Some(source) => registry.register(source),
                None => tracing::warn!("Ignoring unknown or unavailable source '{}'", id),
            }
        }

        Ok(registry)
    }

    /// Register a source at the end of the priority order
    ///
    /// A source with the same id is replaced in place.
    pub fn register(&mut self, source: Arc<dyn Source>) {
        match self.sources.iter().position(|s| s.id() == source.id()) {
            Some(index) => self.sources[index] = source,
            None => self.sources.push(source),
        }
    }

    /// Get a source by ID
    pub fn get(&self, id: &str) -> Option<&Arc<dyn Source>> {
        self.sources.iter().find(|s| s.id() == id)
    }

    /// Get a source by ID, returning an error if not found
    pub fn get_required(&self, id: &str) -> Result<&Arc<dyn Source>, SourceError> {
        self.get(id)
            .ok_or_else(|| SourceError::NotFound(format!("Source '{}' not found", id)))
    }

    /// All registered sources in priority order
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn Source>> {
        self.sources.iter()
    }

    /// All source IDs in priority order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.id())
    }

    /// Sources that support a specific capability, in priority order
    pub fn with_capability(&self, capability: SourceCapabilities) -> Vec<&Arc<dyn Source>> {
        self.all()
            .filter(|s| s.capabilities().contains(capability))
            .collect()
    }

    pub fn full_text(&self) -> Vec<&Arc<dyn Source>> {
        self.with_capability(SourceCapabilities::FULL_TEXT)
    }

    pub fn references(&self) -> Vec<&Arc<dyn Source>> {
        self.with_capability(SourceCapabilities::REFERENCES)
    }

    pub fn fallback(&self) -> Vec<&Arc<dyn Source>> {
        self.with_capability(SourceCapabilities::FALLBACK_TEXT)
    }

    /// First source that supports search
    pub fn searcher(&self) -> Option<&Arc<dyn Source>> {
        self.all().find(|s| s.supports_search())
    }

    /// First source that can list outgoing references
    pub fn citation_source(&self) -> Option<&Arc<dyn Source>> {
        self.all().find(|s| s.supports_citations())
    }

    /// Check if a source exists
    pub fn has(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Get the number of registered sources
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// HTTP clients shared by the sources
#[allow(dead_code)]
struct Clients {
    api: Arc<HttpClient>,
    browser: Arc<HttpClient>,
}

impl Clients {
    fn from_config(config: &Config) -> Result<Self, SourceError> {
        let http = &config.http;
        let user_agent = match (&http.user_agent, &http.contact_email) {
            (Some(agent), _) => agent.clone(),
            (None, Some(email)) => format!("{} (mailto:{})", DEFAULT_USER_AGENT, email),
            (None, None) => DEFAULT_USER_AGENT.to_string(),
        };

        let api = HttpClient::builder()
            .user_agent(user_agent)
            .timeout(http.timeout())
            .rate_limit_per_second(http.requests_per_second)
            .build()?;
        let browser = HttpClient::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(http.timeout())
            .rate_limit_per_second(http.requests_per_second)
            .build()?;

        Ok(Self {
            api: Arc::new(api),
            browser: Arc::new(browser),
        })
    }
}

#[allow(unused_variables)]
fn build_source(id: &str, config: &Config, clients: &Clients) -> Option<Arc<dyn Source>> {
    let endpoints = &config.endpoints;
    let email = config.http.contact_email.clone();

    match id {
        #[cfg(feature = "source-europe_pmc")]
        "europe_pmc" => Some(Arc::new(super::EuropePmcSource::with_client(
            Arc::clone(&clients.api),
            &endpoints.europe_pmc,
        ))),
        #[cfg(feature = "source-pmc")]
        "ncbi_pmc" => Some(Arc::new(
            super::PmcSource::with_client(
                Arc::clone(&clients.api),
                &endpoints.ncbi_idconv,
                &endpoints.ncbi_eutils,
            )
            .contact_email(email),
        )),
        #[cfg(feature = "source-crossref")]
        "crossref" => Some(Arc::new(
            super::CrossRefSource::with_client(Arc::clone(&clients.api), &endpoints.crossref)
                .contact_email(email),
        )),
        #[cfg(feature = "source-publisher")]
        "publisher_html" => Some(Arc::new(super::PublisherSource::with_client(
            Arc::clone(&clients.browser),
            &endpoints.doi_resolver,
        ))),
        _ => None,
    }
}
