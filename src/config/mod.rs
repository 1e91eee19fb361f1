//! Configuration management.
//!
//! Settings come from an optional TOML file layered under environment
//! variables prefixed with `ARCHIVE_FINDER`, using `__` between section and
//! key:
//!
//! ```toml
//! [http]
//! timeout_secs = 30
//! contact_email = "you@example.org"
//! requests_per_second = 5
//!
//! [sources]
//! order = ["europe_pmc", "ncbi_pmc", "crossref", "publisher_html"]
//! disabled = []
//!
//! [politeness]
//! source_delay_ms = 500
//! paper_delay_ms = 1000
//!
//! [discovery]
//! max_results = 25
//! follow_citations = true
//! descriptor_prefixes = ["10.1038/s41597", "10.1016/j.dib"]
//! ```
//!
//! ```bash
//! export ARCHIVE_FINDER_HTTP__TIMEOUT_SECS=60
//! export ARCHIVE_FINDER_SOURCES__ORDER="crossref,publisher_html"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "ARCHIVE_FINDER";
const CONFIG_FILE_NAME: &str = "archive-finder.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Text source ordering
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Pauses between requests
    #[serde(default)]
    pub politeness: PolitenessConfig,

    /// Discovery mode settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Service base URLs
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Override the API user agent
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Contact address sent to CrossRef and NCBI
    #[serde(default)]
    pub contact_email: Option<String>,

    /// Outgoing request cap per source client (0 = unlimited)
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
            contact_email: None,
            requests_per_second: default_rps(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_rps() -> u32 {
    5
}

/// Which text sources to use, in priority order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_source_order")]
    pub order: Vec<String>,

    #[serde(default)]
    pub disabled: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            order: default_source_order(),
            disabled: Vec::new(),
        }
    }
}

fn default_source_order() -> Vec<String> {
    ["europe_pmc", "ncbi_pmc", "crossref", "publisher_html"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Pauses that keep request bursts polite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolitenessConfig {
    /// Pause between two sources for the same paper
    #[serde(default = "default_source_delay")]
    pub source_delay_ms: u64,

    /// Pause between two papers in batch and discovery runs
    #[serde(default = "default_paper_delay")]
    pub paper_delay_ms: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            source_delay_ms: default_source_delay(),
            paper_delay_ms: default_paper_delay(),
        }
    }
}

impl PolitenessConfig {
    /// No pauses at all
    pub fn none() -> Self {
        Self {
            source_delay_ms: 0,
            paper_delay_ms: 0,
        }
    }

    pub fn source_delay(&self) -> Duration {
        Duration::from_millis(self.source_delay_ms)
    }

    pub fn paper_delay(&self) -> Duration {
        Duration::from_millis(self.paper_delay_ms)
    }
}

fn default_source_delay() -> u64 {
    500
}

fn default_paper_delay() -> u64 {
    1000
}

/// Discovery mode configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Maximum number of candidate papers taken from the search index
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Follow references to data descriptor journals
    #[serde(default = "default_true")]
    pub follow_citations: bool,

    /// Search query; derived from the archive names when unset
    #[serde(default)]
    pub query: Option<String>,

    /// Only consider open-access candidates
    #[serde(default)]
    pub open_access_only: bool,

    /// DOI prefixes of data descriptor venues
    #[serde(default = "default_descriptor_prefixes")]
    pub descriptor_prefixes: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            follow_citations: true,
            query: None,
            open_access_only: false,
            descriptor_prefixes: default_descriptor_prefixes(),
        }
    }
}

fn default_max_results() -> usize {
    25
}

fn default_true() -> bool {
    true
}

fn default_descriptor_prefixes() -> Vec<String> {
    [
        // Scientific Data
        "10.1038/s41597",
        "10.1038/sdata",
        // Data in Brief
        "10.1016/j.dib",
        // GigaScience
        "10.1093/gigascience",
        "10.1186/s13742",
        // Journal of Open Psychology Data
        "10.5334/jopd",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Base URLs of the external services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_europe_pmc")]
    pub europe_pmc: String,

    #[serde(default = "default_ncbi_idconv")]
    pub ncbi_idconv: String,

    #[serde(default = "default_ncbi_eutils")]
    pub ncbi_eutils: String,

    #[serde(default = "default_crossref")]
    pub crossref: String,

    #[serde(default = "default_doi_resolver")]
    pub doi_resolver: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            europe_pmc: default_europe_pmc(),
            ncbi_idconv: default_ncbi_idconv(),
            ncbi_eutils: default_ncbi_eutils(),
            crossref: default_crossref(),
            doi_resolver: default_doi_resolver(),
        }
    }
}

impl EndpointsConfig {
    /// Point every service at one host, one path per service
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            europe_pmc: format!("{}/europepmc", base),
            ncbi_idconv: format!("{}/idconv", base),
            ncbi_eutils: format!("{}/eutils", base),
            crossref: format!("{}/crossref", base),
            doi_resolver: format!("{}/doi", base),
        }
    }
}

fn default_europe_pmc() -> String {
    "https://www.ebi.ac.uk/europepmc/webservices/rest".to_string()
}

fn default_ncbi_idconv() -> String {
    "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/".to_string()
}

fn default_ncbi_eutils() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string()
}

fn default_crossref() -> String {
    "https://api.crossref.org".to_string()
}

fn default_doi_resolver() -> String {
    "https://doi.org".to_string()
}

/// Load configuration from an optional file plus `ARCHIVE_FINDER_*` environment variables
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    load_layered(path, environment())
}

/// `ARCHIVE_FINDER_<SECTION>__<KEY>`, with comma-separated list values
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("sources.order")
        .with_list_parse_key("sources.disabled")
        .with_list_parse_key("discovery.descriptor_prefixes")
}

fn load_layered(
    path: Option<&Path>,
    env: config::Environment,
) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder.add_source(env).build()?.try_deserialize()
}

/// Find a configuration file in the default locations
///
/// Checks `./archive-finder.toml`, then `<config dir>/archive-finder/config.toml`.
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("archive-finder").join("config.toml"))
        .filter(|path| path.is_file())
}
