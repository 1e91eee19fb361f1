//! Utility modules supporting paper retrieval.
//!
//! - [`HttpClient`]: HTTP client with built-in rate limiting
//! - [`HttpClientBuilder`]: configure timeouts, user agent and request rate
//! - [`normalize_doi`]: accept bare DOIs, `doi:` and doi.org URL forms
//! - [`parse_doi_list`]: read batch input files
//! - [`xml_to_text`], [`html_to_text`]: flatten full text into plain text
//!
//! # HTTP Client with Rate Limiting
//!
//! ```rust,no_run
//! use archive_finder::utils::HttpClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::builder().rate_limit_per_second(5).build()?;
//! let response = client.send(client.get("https://api.crossref.org/works")).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod text;
mod validate;

pub use http::{HttpClient, HttpClientBuilder, BROWSER_USER_AGENT, DEFAULT_USER_AGENT};
pub use text::{html_fragment_to_text, html_to_text, text_len, xml_to_text};
pub use validate::{normalize_doi, parse_doi_list, ValidationError};
