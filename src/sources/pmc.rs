//! PubMed Central (PMC) source using the NCBI ID converter and E-utilities.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::SourceType;
use crate::sources::{check_status, Source, SourceCapabilities, SourceError};
use crate::utils::{xml_to_text, HttpClient};

const PMC_IDCONV_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/";
const PMC_EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Tool name NCBI asks API clients to send
const NCBI_TOOL: &str = "archive_finder";

/// PMC full-text source
///
/// Converts the DOI to a PMCID, then fetches the JATS XML via `efetch`.
#[derive(Debug, Clone)]
pub struct PmcSource {
    client: Arc<HttpClient>,
    idconv_url: String,
    eutils_base: String,
    contact_email: Option<String>,
}

impl PmcSource {
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(
            Arc::new(HttpClient::new()?),
            PMC_IDCONV_URL,
            PMC_EUTILS_BASE,
        ))
    }

    /// Create with a custom HTTP client and endpoints
    pub fn with_client(
        client: Arc<HttpClient>,
        idconv_url: impl Into<String>,
        eutils_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            idconv_url: idconv_url.into(),
            eutils_base: eutils_base.into().trim_end_matches('/').to_string(),
            contact_email: None,
        }
    }

    /// Contact address sent with every NCBI request
    pub fn contact_email(mut self, email: Option<String>) -> Self {
        self.contact_email = email;
        self
    }

    fn identify(&self, mut params: Vec<(&'static str, String)>) -> String {
        params.push(("tool", NCBI_TOOL.to_string()));
        if let Some(email) = &self.contact_email {
            params.push(("email", email.clone()));
        }

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Convert a DOI to a PMCID
    async fn convert_doi(&self, doi: &str) -> Result<Option<String>, SourceError> {
        let params = self.identify(vec![("ids", doi.to_string()), ("format", "json".to_string())]);
        let url = format!("{}?{}", self.idconv_url, params);

        let response = self.client.send(self.client.get(&url)).await?;
        let body = check_status(response, self.name())?.text().await?;
        let converted: IdConvResponse = serde_json::from_str(&body)?;

        Ok(converted
            .records
            .into_iter()
            .next()
            .and_then(|record| record.pmcid)
            .filter(|pmcid| !pmcid.is_empty()))
    }
}

#[async_trait]
impl Source for PmcSource {
    fn id(&self) -> &str {
        SourceType::NcbiPmc.id()
    }

    fn name(&self) -> &str {
        "NCBI PMC"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::FULL_TEXT
    }

    async fn fetch_text(&self, doi: &str) -> Result<String, SourceError> {
        let pmcid = self
            .convert_doi(doi)
            .await?
            .ok_or_else(|| SourceError::NotFound(format!("{} is not in PMC", doi)))?;
        tracing::debug!("NCBI PMC: {} has PMCID {}", doi, pmcid);

        let params = self.identify(vec![
            ("db", "pmc".to_string()),
            ("id", pmcid),
            ("rettype", "xml".to_string()),
        ]);
        let url = format!("{}/efetch.fcgi?{}", self.eutils_base, params);

        let response = self.client.send(self.client.get(&url)).await?;
        let xml = check_status(response, self.name())?.text().await?;

        xml_to_text(&xml)
    }
}

#[derive(Debug, Deserialize)]
struct IdConvResponse {
    #[serde(default)]
    records: Vec<IdConvRecord>,
}

#[derive(Debug, Deserialize)]
struct IdConvRecord {
    pmcid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_source(server: &mockito::Server) -> PmcSource {
        let client = HttpClient::builder().rate_limit_per_second(0).build().unwrap();
        PmcSource::with_client(
            Arc::new(client),
            format!("{}/idconv/", server.url()),
            format!("{}/eutils", server.url()),
        )
    }

    #[tokio::test]
    async fn test_fetch_text() {
        let mut server = mockito::Server::new_async().await;
        let idconv = server
            .mock("GET", "/idconv/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ids".into(), "10.1234/abc".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
                Matcher::UrlEncoded("tool".into(), "archive_finder".into()),
                Matcher::UrlEncoded("email".into(), "lab@example.org".into()),
            ]))
            .with_body(r#"{"status":"ok","records":[{"doi":"10.1234/abc","pmcid":"PMC777"}]}"#)
            .create_async()
            .await;
        let efetch = server
            .mock("GET", "/eutils/efetch.fcgi")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("db".into(), "pmc".into()),
                Matcher::UrlEncoded("id".into(), "PMC777".into()),
                Matcher::UrlEncoded("rettype".into(), "xml".into()),
            ]))
            .with_body("<pmc-articleset><article><p>OpenNeuro ds000117</p></article></pmc-articleset>")
            .create_async()
            .await;

        let source = test_source(&server).contact_email(Some("lab@example.org".to_string()));
        let text = source.fetch_text("10.1234/abc").await.unwrap();

        assert_eq!(text, "OpenNeuro ds000117");
        idconv.assert_async().await;
        efetch.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_text_not_in_pmc() {
        let mut server = mockito::Server::new_async().await;
        let _idconv = server
            .mock("GET", "/idconv/")
            .match_query(Matcher::Any)
            .with_body(r#"{"status":"ok","records":[{"doi":"10.1234/abc","status":"error","errmsg":"invalid article id"}]}"#)
            .create_async()
            .await;

        let source = test_source(&server);
        assert!(matches!(
            source.fetch_text("10.1234/abc").await,
            Err(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_text_bad_json() {
        let mut server = mockito::Server::new_async().await;
        let _idconv = server
            .mock("GET", "/idconv/")
            .match_query(Matcher::Any)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let source = test_source(&server);
        assert!(matches!(
            source.fetch_text("10.1234/abc").await,
            Err(SourceError::Parse(_))
        ));
    }
}
