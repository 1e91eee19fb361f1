//! Input validation for DOIs and DOI list files.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Validation error types
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid DOI format: {0}")]
    InvalidDoi(String),
}

static DOI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^10\.\d{4,9}/\S+$").expect("DOI regex must compile"));

const DOI_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
    "doi.org/",
    "doi:",
];

/// Normalize a DOI given as a bare DOI, `doi:` form, or doi.org URL.
///
/// Returns the bare `10.xxxx/...` form, or an error when the input is not a DOI.
pub fn normalize_doi(input: &str) -> Result<String, ValidationError> {
    let mut doi = input.trim();

    for prefix in DOI_PREFIXES {
        if doi.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(prefix)) {
            doi = doi[prefix.len()..].trim();
            break;
        }
    }

    if DOI_RE.is_match(doi) {
        Ok(doi.to_string())
    } else {
        Err(ValidationError::InvalidDoi(input.trim().to_string()))
    }
}

/// Parse a DOI list file: one DOI per line, blank lines and `#` comments skipped
pub fn parse_doi_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_doi() {
        assert_eq!(
            normalize_doi(" 10.1038/s41597-023-02214-y ").unwrap(),
            "10.1038/s41597-023-02214-y"
        );
    }

    #[test]
    fn test_normalize_prefixed_doi() {
        assert_eq!(
            normalize_doi("https://doi.org/10.48324/dandi.000130").unwrap(),
            "10.48324/dandi.000130"
        );
        assert_eq!(normalize_doi("DOI:10.1016/j.neuron.2020.01.001").unwrap(), "10.1016/j.neuron.2020.01.001");
    }

    #[test]
    fn test_invalid_doi() {
        assert_eq!(
            normalize_doi("not-a-doi"),
            Err(ValidationError::InvalidDoi("not-a-doi".to_string()))
        );
        assert!(normalize_doi("").is_err());
        assert!(normalize_doi("10.1/short-prefix").is_err());
        assert!(normalize_doi("10.1234/with space").is_err());
    }

    #[test]
    fn test_parse_doi_list() {
        let content = "# reuse candidates\n10.1/a\n\n  10.2/b  \n#10.3/c\n";
        assert_eq!(parse_doi_list(content), vec!["10.1/a", "10.2/b"]);
    }
}
