//! CrossRef source: bibliographic metadata and reference lists.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::SourceType;
use crate::sources::{check_status, Source, SourceCapabilities, SourceError};
use crate::utils::{html_fragment_to_text, HttpClient};

const CROSSREF_API_BASE: &str = "https://api.crossref.org";

/// CrossRef source
///
/// Dataset DOIs often appear in reference lists even when no full text is
/// open, so the text this source produces is the title, the abstract and
/// every reference (DOI and unstructured citation string).
#[derive(Debug, Clone)]
pub struct CrossRefSource {
    client: Arc<HttpClient>,
    base_url: String,
    mailto: Option<String>,
}

impl CrossRefSource {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(
            Arc::new(HttpClient::new()?),
            CROSSREF_API_BASE,
        ))
    }

    /// Create with a custom HTTP client and base URL
    pub fn with_client(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mailto: None,
        }
    }

    /// Join CrossRef's polite pool with a contact address
    pub fn contact_email(mut self, email: Option<String>) -> Self {
        self.mailto = email;
        self
    }

    async fn get_work(&self, doi: &str) -> Result<CRWork, SourceError> {
        let mut url = format!("{}/works/{}", self.base_url, urlencoding::encode(doi));
        if let Some(mailto) = &self.mailto {
            url.push_str(&format!("?mailto={}", urlencoding::encode(mailto)));
        }

        let response = self.client.send(self.client.get(&url)).await?;
        let body = check_status(response, self.name())?.text().await?;
        let data: CRResponse = serde_json::from_str(&body)
            .map_err(|e| SourceError::Parse(format!("Failed to parse CrossRef JSON: {}", e)))?;

        Ok(data.message)
    }
}

#[async_trait]
impl Source for CrossRefSource {
    fn id(&self) -> &str {
        SourceType::CrossRef.id()
    }

    fn name(&self) -> &str {
        "CrossRef"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::REFERENCES | SourceCapabilities::CITATIONS
    }

    async fn fetch_text(&self, doi: &str) -> Result<String, SourceError> {
        let work = self.get_work(doi).await?;
        let parts = work.text_parts();

        if parts.is_empty() {
            return Err(SourceError::NotFound(format!(
                "CrossRef has no title, abstract or references for {}",
                doi
            )));
        }

        Ok(parts.join("\n\n"))
    }

    async fn get_references(&self, doi: &str) -> Result<Vec<String>, SourceError> {
        let work = self.get_work(doi).await?;

        Ok(work
            .reference
            .into_iter()
            .filter_map(|r| r.doi)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .collect())
    }
}

// ===== CrossRef API Types =====

#[derive(Debug, Deserialize)]
struct CRResponse {
    message: CRWork,
}

#[derive(Debug, Default, Deserialize)]
struct CRWork {
    #[serde(default)]
    title: Vec<String>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    #[serde(default)]
    reference: Vec<CRReference>,
}

impl CRWork {
    fn text_parts(&self) -> Vec<String> {
        let mut parts: Vec<String> = self.title.clone();

        if let Some(abstract_html) = &self.abstract_text {
            parts.push(html_fragment_to_text(abstract_html));
        }

        for reference in &self.reference {
            if let Some(doi) = &reference.doi {
                parts.push(doi.clone());
            }
            if let Some(unstructured) = &reference.unstructured {
                parts.push(unstructured.clone());
            }
        }

        parts
    }
}

#[derive(Debug, Deserialize)]
struct CRReference {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    unstructured: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const WORK_JSON: &str = r#"{
        "status": "ok",
        "message": {
            "title": ["Reanalysis of public recordings"],
            "abstract": "<jats:p>We reuse <jats:italic>DANDI</jats:italic> data.</jats:p>",
            "reference": [
                {"key": "r1", "DOI": "10.48324/dandi.000130/0.230101.0000"},
                {"key": "r2", "unstructured": "OpenNeuro ds000117"},
                {"key": "r3", "DOI": "10.1038/s41597-019-0104-8", "unstructured": "A descriptor"}
            ]
        }
    }"#;

    fn test_source(server: &mockito::Server) -> CrossRefSource {
        let client = HttpClient::builder().rate_limit_per_second(0).build().unwrap();
        CrossRefSource::with_client(Arc::new(client), server.url())
    }

    #[tokio::test]
    async fn test_fetch_text() {
        let mut server = mockito::Server::new_async().await;
        let work = server
            .mock("GET", "/works/10.1234%2Fabc")
            .with_body(WORK_JSON)
            .create_async()
            .await;

        let source = test_source(&server);
        let text = source.fetch_text("10.1234/abc").await.unwrap();

        assert_eq!(
            text,
            "Reanalysis of public recordings\n\nWe reuse DANDI data.\n\n\
             10.48324/dandi.000130/0.230101.0000\n\nOpenNeuro ds000117\n\n\
             10.1038/s41597-019-0104-8\n\nA descriptor"
        );
        work.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_references() {
        let mut server = mockito::Server::new_async().await;
        let _work = server
            .mock("GET", "/works/10.1234%2Fabc")
            .match_query(Matcher::UrlEncoded("mailto".into(), "lab@example.org".into()))
            .with_body(WORK_JSON)
            .create_async()
            .await;

        let source = test_source(&server).contact_email(Some("lab@example.org".to_string()));
        let refs = source.get_references("10.1234/abc").await.unwrap();

        assert_eq!(
            refs,
            vec!["10.48324/dandi.000130/0.230101.0000", "10.1038/s41597-019-0104-8"]
        );
    }

    #[tokio::test]
    async fn test_empty_work_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _work = server
            .mock("GET", "/works/10.1234%2Fempty")
            .with_body(r#"{"status":"ok","message":{"DOI":"10.1234/empty"}}"#)
            .create_async()
            .await;

        let source = test_source(&server);
        assert!(matches!(
            source.fetch_text("10.1234/empty").await,
            Err(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unknown_doi() {
        let mut server = mockito::Server::new_async().await;
        let _work = server
            .mock("GET", "/works/10.1234%2Fmissing")
            .with_status(404)
            .with_body("Resource not found.")
            .create_async()
            .await;

        let source = test_source(&server);
        assert!(matches!(
            source.get_references("10.1234/missing").await,
            Err(SourceError::NotFound(_))
        ));
    }
}
