//! Report types produced for each scanned paper.
//!
//! These serialize to the tool's JSON output:
//!
//! ```json
//! {
//!   "doi": "10.1038/s41586-023-06031-6",
//!   "archives": {
//!     "DANDI Archive": {
//!       "dataset_ids": ["000130"],
//!       "matches": [
//!         {"id": "000130", "pattern_type": "doi", "matched_string": "10.48324/dandi.000130"}
//!       ]
//!     }
//!   },
//!   "source": "europe_pmc+crossref",
//!   "error": null
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error reported when no source yields usable text
pub const NO_TEXT_ERROR: &str = "Could not retrieve paper text";

/// One pattern hit in a paper's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMatch {
    /// Normalized dataset identifier
    pub id: String,

    /// Surface form that matched (doi, url, text_colon, ...)
    pub pattern_type: String,

    /// The literal matched substring
    pub matched_string: String,
}

impl DatasetMatch {
    pub fn new(
        id: impl Into<String>,
        pattern_type: impl Into<String>,
        matched_string: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            pattern_type: pattern_type.into(),
            matched_string: matched_string.into(),
        }
    }
}

/// All datasets of one archive referenced by a paper
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReport {
    /// Unique dataset identifiers, sorted
    pub dataset_ids: Vec<String>,

    /// Every distinct (id, pattern type) hit in first-seen order
    pub matches: Vec<DatasetMatch>,
}

/// Scan result for a single paper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindResult {
    pub doi: String,

    /// Archive name to report; archives without matches are absent
    pub archives: BTreeMap<String, ArchiveReport>,

    /// Retrieval sources that contributed text, joined with '+'
    pub source: String,

    pub error: Option<String>,

    /// DOI of the paper whose reference list led to this one (discovery mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cited_by: Option<String>,
}

impl FindResult {
    /// An empty result for a DOI
    pub fn new(doi: impl Into<String>) -> Self {
        Self {
            doi: doi.into(),
            archives: BTreeMap::new(),
            source: String::new(),
            error: None,
            cited_by: None,
        }
    }

    /// A failed result; archives stay empty
    pub fn failed(doi: impl Into<String>, error: impl Into<String>) -> Self {
        let mut result = Self::new(doi);
        result.error = Some(error.into());
        result
    }

    /// Mark the result as reached through another paper's references
    pub fn cited_by(mut self, doi: impl Into<String>) -> Self {
        self.cited_by = Some(doi.into());
        self
    }

    /// Whether any archive has at least one dataset
    pub fn has_datasets(&self) -> bool {
        self.archives.values().any(|a| !a.dataset_ids.is_empty())
    }

    /// Total number of unique datasets across archives
    pub fn dataset_count(&self) -> usize {
        self.archives.values().map(|a| a.dataset_ids.len()).sum()
    }

    /// Whether only a references source contributed text
    pub fn is_references_only(&self) -> bool {
        self.source == crate::models::SourceType::CrossRef.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_result_serialization() {
        let result = FindResult::failed("10.1234/none", NO_TEXT_ERROR);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value,
            json!({
                "doi": "10.1234/none",
                "archives": {},
                "source": "",
                "error": "Could not retrieve paper text"
            })
        );
    }

    #[test]
    fn test_result_keys_and_null_error() {
        let mut result = FindResult::new("10.1/abc");
        result.source = "europe_pmc".to_string();
        result.archives.insert(
            "OpenNeuro".to_string(),
            ArchiveReport {
                dataset_ids: vec!["000117".to_string()],
                matches: vec![DatasetMatch::new("000117", "dataset_id", "ds000117")],
            },
        );

        let value = serde_json::to_value(&result).unwrap();
        assert!(value["error"].is_null());
        assert!(value.get("cited_by").is_none());
        assert_eq!(value["archives"]["OpenNeuro"]["dataset_ids"][0], "000117");
        assert_eq!(
            value["archives"]["OpenNeuro"]["matches"][0]["matched_string"],
            "ds000117"
        );
        assert!(result.has_datasets());
        assert_eq!(result.dataset_count(), 1);
    }

    #[test]
    fn test_cited_by_is_serialized_when_set() {
        let result = FindResult::new("10.1038/s41597-020-0001-1").cited_by("10.1/citing");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["cited_by"], "10.1/citing");
    }

    #[test]
    fn test_references_only() {
        let mut result = FindResult::new("10.1/abc");
        result.source = "crossref".to_string();
        assert!(result.is_references_only());

        result.source = "europe_pmc+crossref".to_string();
        assert!(!result.is_references_only());
    }
}
