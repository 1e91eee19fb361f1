//! Publisher landing page source.
//!
//! Resolves the DOI through doi.org and scrapes the article body from the
//! publisher's HTML. Only used when no full-text service has the paper.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use std::sync::Arc;

use crate::models::SourceType;
use crate::sources::{check_status, Source, SourceCapabilities, SourceError};
use crate::utils::{html_to_text, text_len, HttpClient, BROWSER_USER_AGENT};

const DOI_RESOLVER_URL: &str = "https://doi.org";

/// Pages shorter than this are paywalls, cookie walls or landing stubs
const MIN_ARTICLE_LEN: usize = 1000;

/// Publisher HTML source
#[derive(Debug, Clone)]
pub struct PublisherSource {
    client: Arc<HttpClient>,
    resolver_url: String,
}

impl PublisherSource {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(
            Arc::new(HttpClient::with_user_agent(BROWSER_USER_AGENT)?),
            DOI_RESOLVER_URL,
        ))
    }

    /// Create with a custom HTTP client and DOI resolver
    ///
    /// Publishers often reject API user agents, so the client should send a
    /// browser one.
    pub fn with_client(client: Arc<HttpClient>, resolver_url: impl Into<String>) -> Self {
        Self {
            client,
            resolver_url: resolver_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Source for PublisherSource {
    fn id(&self) -> &str {
        SourceType::PublisherHtml.id()
    }

    fn name(&self) -> &str {
        "Publisher HTML"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::FALLBACK_TEXT
    }

    fn min_text_len(&self) -> usize {
        MIN_ARTICLE_LEN
    }

    async fn fetch_text(&self, doi: &str) -> Result<String, SourceError> {
        let url = format!("{}/{}", self.resolver_url, doi);
        let request = self
            .client
            .get(&url)
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.5");

        let response = check_status(self.client.send(request).await?, self.name())?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains("text/html") {
            return Err(SourceError::InvalidRequest(format!(
                "{} resolved to non-HTML content: {}",
                doi, content_type
            )));
        }

        let final_url = response.url().to_string();
        let html = response.text().await?;
        let text = html_to_text(&html);
        tracing::debug!("Publisher page {} gave {} chars", final_url, text_len(&text));

        Ok(text)
    }
}
