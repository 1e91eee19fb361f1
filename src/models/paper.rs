//! Paper references and the text sources they can be read from.

use serde::{Deserialize, Serialize};

/// The service a paper's text was retrieved from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    EuropePmc,
    NcbiPmc,
    CrossRef,
    PublisherHtml,
    #[serde(untagged)]
    Other(String),
}

impl SourceType {
    /// Returns the display name of the source
    pub fn name(&self) -> &str {
        match self {
            SourceType::EuropePmc => "Europe PMC",
            SourceType::NcbiPmc => "NCBI PubMed Central",
            SourceType::CrossRef => "CrossRef",
            SourceType::PublisherHtml => "Publisher HTML",
            SourceType::Other(s) => s,
        }
    }

    /// Returns the source identifier used in result labels
    pub fn id(&self) -> &str {
        match self {
            SourceType::EuropePmc => "europe_pmc",
            SourceType::NcbiPmc => "ncbi_pmc",
            SourceType::CrossRef => "crossref",
            SourceType::PublisherHtml => "publisher_html",
            SourceType::Other(s) => s,
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A paper to scan, identified by DOI
///
/// Search results may already know the PMC identifier and title; single-DOI
/// input only carries the DOI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRef {
    /// Digital Object Identifier
    pub doi: String,

    /// PubMed Central identifier (e.g. "PMC1234567")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmcid: Option<String>,

    /// Paper title, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PaperRef {
    pub fn new(doi: impl Into<String>) -> Self {
        Self {
            doi: doi.into(),
            pmcid: None,
            title: None,
        }
    }

    /// Set the PMC identifier
    pub fn pmcid(mut self, pmcid: impl Into<String>) -> Self {
        self.pmcid = Some(pmcid.into());
        self
    }

    /// Set the title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether the paper is known to be in PubMed Central
    pub fn has_pmcid(&self) -> bool {
        self.pmcid.as_deref().is_some_and(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_type_ids() {
        assert_eq!(SourceType::EuropePmc.id(), "europe_pmc");
        assert_eq!(SourceType::NcbiPmc.id(), "ncbi_pmc");
        assert_eq!(SourceType::PublisherHtml.id(), "publisher_html");
        assert_eq!(SourceType::CrossRef.to_string(), "CrossRef");
    }

    #[test]
    fn test_paper_ref_builder() {
        let paper = PaperRef::new("10.1038/s41597-023-02214-y")
            .pmcid("PMC10250000")
            .title("A dataset");

        assert!(paper.has_pmcid());
        assert_eq!(paper.title.as_deref(), Some("A dataset"));
        assert!(!PaperRef::new("10.1/x").pmcid("").has_pmcid());
    }
}
