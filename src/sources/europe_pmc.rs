//! Europe PMC source using the REST API.
//!
//! Full text comes from the `fullTextXML` endpoint, which only exists for
//! papers with a PMC identifier. The same API backs discovery searches, and
//! the identifiers seen in search hits are remembered so scanning those hits
//! skips the DOI lookup.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::models::{PaperRef, SearchQuery, SearchResponse, SourceType};
use crate::sources::{check_status, Source, SourceCapabilities, SourceError};
use crate::utils::{xml_to_text, HttpClient};

/// Europe PMC REST API base URL
const EUROPE_PMC_BASE_URL: &str = "https://www.ebi.ac.uk/europepmc/webservices/rest";

/// Largest page the search endpoint serves
const MAX_PAGE_SIZE: usize = 1000;

/// Europe PMC full-text and search source
#[derive(Debug, Clone)]
pub struct EuropePmcSource {
    client: Arc<HttpClient>,
    base_url: String,
    /// Lower-cased DOI to PMCID, filled from search results
    known_pmcids: Arc<Mutex<HashMap<String, String>>>,
}

impl EuropePmcSource {
    /// Create a new Europe PMC source against the public API
    pub fn new() -> Result<Self, SourceError> {
        Ok(Self::with_client(
            Arc::new(HttpClient::new()?),
            EUROPE_PMC_BASE_URL,
        ))
    }

    /// Create with a custom HTTP client and base URL
    pub fn with_client(client: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            known_pmcids: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn remember_pmcids(&self, papers: &[PaperRef]) {
        let mut known = self.known_pmcids.lock().unwrap_or_else(PoisonError::into_inner);
        for paper in papers.iter().filter(|p| p.has_pmcid()) {
            if let Some(pmcid) = &paper.pmcid {
                known.insert(paper.doi.to_ascii_lowercase(), pmcid.clone());
            }
        }
    }

    fn known_pmcid(&self, doi: &str) -> Option<String> {
        self.known_pmcids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&doi.to_ascii_lowercase())
            .cloned()
    }

    /// Build search query parameters
    fn build_search_params(query: &str, cursor: &str, page_size: usize) -> String {
        let page_size = page_size.to_string();
        let params = [
            ("query", query),
            ("format", "json"),
            ("resultType", "core"),
            ("pageSize", page_size.as_str()),
            ("cursorMark", cursor),
        ];

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    async fn search_page(
        &self,
        query: &str,
        cursor: &str,
        page_size: usize,
    ) -> Result<SearchResult, SourceError> {
        let url = format!(
            "{}/search?{}",
            self.base_url,
            Self::build_search_params(query, cursor, page_size)
        );

        let response = self.client.send(self.client.get(&url)).await?;
        let response = check_status(response, self.name())?;
        let json = response.text().await?;

        serde_json::from_str(&json)
            .map_err(|e| SourceError::Parse(format!("Failed to parse Europe PMC JSON: {}", e)))
    }

    /// Look up the PMC identifier of a DOI
    async fn lookup_pmcid(&self, doi: &str) -> Result<Option<String>, SourceError> {
        let query = format!("DOI:\"{}\"", doi);
        let page = self.search_page(&query, "*", 1).await?;

        Ok(page
            .result_list
            .result
            .into_iter()
            .next()
            .and_then(|item| item.pmcid)
            .filter(|pmcid| !pmcid.is_empty()))
    }
}

#[async_trait]
impl Source for EuropePmcSource {
    fn id(&self) -> &str {
        SourceType::EuropePmc.id()
    }

    fn name(&self) -> &str {
        "Europe PMC"
    }

    fn capabilities(&self) -> SourceCapabilities {
        SourceCapabilities::FULL_TEXT | SourceCapabilities::SEARCH
    }

    async fn fetch_text(&self, doi: &str) -> Result<String, SourceError> {
        // Abstract-only records are skipped; only PMC full text is used
        let pmcid = match self.known_pmcid(doi) {
            Some(pmcid) => pmcid,
            None => self.lookup_pmcid(doi).await?.ok_or_else(|| {
                SourceError::NotFound(format!("No PMC full text for {}", doi))
            })?,
        };
        tracing::debug!("Europe PMC: {} has PMCID {}", doi, pmcid);

        let url = format!("{}/{}/fullTextXML", self.base_url, pmcid);
        let response = self.client.send(self.client.get(&url)).await?;
        let xml = check_status(response, self.name())?.text().await?;

        xml_to_text(&xml)
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        let effective_query = if query.open_access_only {
            format!("({}) AND OPEN_ACCESS:y", query.query)
        } else {
            query.query.clone()
        };

        let mut papers: Vec<PaperRef> = Vec::new();
        let mut total_results = None;
        let mut cursor = "*".to_string();

        while papers.len() < query.max_results {
            let page_size = (query.max_results - papers.len()).min(MAX_PAGE_SIZE);
            let page = self.search_page(&effective_query, &cursor, page_size).await?;

            if total_results.is_none() {
                total_results = page.hit_count;
            }
            if page.result_list.result.is_empty() {
                break;
            }

            for item in page.result_list.result {
                if papers.len() >= query.max_results {
                    break;
                }
                if let Some(paper) = item.into_paper_ref() {
                    papers.push(paper);
                }
            }

            match page.next_cursor_mark {
                Some(next) if next != cursor => cursor = next,
                _ => break,
            }
        }

        tracing::debug!(
            "Europe PMC search '{}' returned {} papers",
            effective_query,
            papers.len()
        );
        self.remember_pmcids(&papers);

        let response = SearchResponse::new(papers, self.name(), &query.query);
        Ok(match total_results {
            Some(total) => response.total_results(total),
            None => response,
        })
    }
}

// ===== Europe PMC API Types =====

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "hitCount")]
    hit_count: Option<usize>,
    #[serde(rename = "nextCursorMark")]
    next_cursor_mark: Option<String>,
    #[serde(rename = "resultList", default)]
    result_list: ResultList,
}

#[derive(Debug, Default, Deserialize)]
struct ResultList {
    #[serde(default)]
    result: Vec<SearchResultItem>,
}

#[derive(Debug, Deserialize)]
struct SearchResultItem {
    doi: Option<String>,
    pmcid: Option<String>,
    title: Option<String>,
}

impl SearchResultItem {
    /// Results without a DOI cannot be scanned and are dropped
    fn into_paper_ref(self) -> Option<PaperRef> {
        let doi = self.doi.filter(|d| !d.trim().is_empty())?;
        let mut paper = PaperRef::new(doi.trim());
        if let Some(pmcid) = self.pmcid {
            paper = paper.pmcid(pmcid);
        }
        if let Some(title) = self.title {
            paper = paper.title(title);
        }
        Some(paper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_source(server: &mockito::Server) -> EuropePmcSource {
        let client = HttpClient::builder().rate_limit_per_second(0).build().unwrap();
        EuropePmcSource::with_client(Arc::new(client), server.url())
    }

    #[tokio::test]
    async fn test_fetch_text_via_pmcid() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("query".into(), "DOI:\"10.1234/abc\"".into()),
                Matcher::UrlEncoded("format".into(), "json".into()),
                Matcher::UrlEncoded("resultType".into(), "core".into()),
            ]))
            .with_body(r#"{"hitCount":1,"resultList":{"result":[{"doi":"10.1234/abc","pmcid":"PMC42"}]}}"#)
            .create_async()
            .await;
        let full_text = server
            .mock("GET", "/PMC42/fullTextXML")
            .with_header("content-type", "application/xml")
            .with_body("<article><body><p>Data at DANDI:000130</p></body></article>")
            .create_async()
            .await;

        let source = test_source(&server);
        let text = source.fetch_text("10.1234/abc").await.unwrap();

        assert_eq!(text, "Data at DANDI:000130");
        search.assert_async().await;
        full_text.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_text_without_pmcid_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body(r#"{"hitCount":1,"resultList":{"result":[{"doi":"10.1234/abc"}]}}"#)
            .create_async()
            .await;

        let source = test_source(&server);
        let result = source.fetch_text("10.1234/abc").await;

        assert!(matches!(result, Err(SourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_text_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let source = test_source(&server);
        assert!(matches!(
            source.fetch_text("10.1234/abc").await,
            Err(SourceError::Api(_))
        ));
    }

    #[tokio::test]
    async fn test_search_follows_cursor() {
        let mut server = mockito::Server::new_async().await;
        let _first = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("cursorMark".into(), "*".into()))
            .with_body(
                r#"{"hitCount":3,"nextCursorMark":"AoE1",
                    "resultList":{"result":[
                      {"doi":"10.1/a","pmcid":"PMC1","title":"First"},
                      {"title":"No DOI"}]}}"#,
            )
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("cursorMark".into(), "AoE1".into()))
            .with_body(
                r#"{"hitCount":3,"nextCursorMark":"AoE1",
                    "resultList":{"result":[{"doi":"10.1/b"}]}}"#,
            )
            .create_async()
            .await;

        let source = test_source(&server);
        let response = source
            .search(&SearchQuery::new("\"OpenNeuro\"").max_results(10))
            .await
            .unwrap();

        let dois: Vec<&str> = response.papers.iter().map(|p| p.doi.as_str()).collect();
        assert_eq!(dois, vec!["10.1/a", "10.1/b"]);
        assert_eq!(response.papers[0].pmcid.as_deref(), Some("PMC1"));
        assert_eq!(response.total_results, Some(3));
        assert_eq!(response.query, "\"OpenNeuro\"");
    }

    #[tokio::test]
    async fn test_search_respects_max_results() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("pageSize".into(), "2".into()),
                Matcher::UrlEncoded(
                    "query".into(),
                    "(\"DANDI Archive\") AND OPEN_ACCESS:y".into(),
                ),
            ]))
            .with_body(
                r#"{"hitCount":50,"nextCursorMark":"next",
                    "resultList":{"result":[{"doi":"10.1/a"},{"doi":"10.1/b"}]}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let source = test_source(&server);
        let response = source
            .search(
                &SearchQuery::new("\"DANDI Archive\"")
                    .max_results(2)
                    .open_access_only(true),
            )
            .await
            .unwrap();

        assert_eq!(response.papers.len(), 2);
        page.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_text_reuses_pmcid_from_search() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("query".into(), "\"PhysioNet\"".into()))
            .with_body(
                r#"{"hitCount":1,"resultList":{"result":[{"doi":"10.1234/ABC","pmcid":"PMC7"}]}}"#,
            )
            .create_async()
            .await;
        let lookup = server
            .mock("GET", "/search")
            .match_query(Matcher::UrlEncoded("pageSize".into(), "1".into()))
            .expect(0)
            .create_async()
            .await;
        let full_text = server
            .mock("GET", "/PMC7/fullTextXML")
            .with_body("<article><body><p>See physionet.org/content/mitdb</p></body></article>")
            .create_async()
            .await;

        let source = test_source(&server);
        source
            .search(&SearchQuery::new("\"PhysioNet\"").max_results(2))
            .await
            .unwrap();
        let text = source.fetch_text("10.1234/abc").await.unwrap();

        assert_eq!(text, "See physionet.org/content/mitdb");
        lookup.assert_async().await;
        full_text.assert_async().await;
    }

    #[test]
    fn test_capabilities() {
        let source = EuropePmcSource::new().unwrap();
        assert_eq!(source.id(), "europe_pmc");
        assert!(source.supports_full_text());
        assert!(source.supports_search());
        assert!(!source.supports_citations());
    }
}
