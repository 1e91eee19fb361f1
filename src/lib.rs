//! # Archive Finder
//!
//! Finds references to datasets hosted on DANDI Archive, OpenNeuro, Figshare
//! and PhysioNet in scientific papers identified by DOI.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (PaperRef, FindResult, etc.)
//! - [`sources`]: Text source plugins (Europe PMC, NCBI PMC, CrossRef, publisher HTML)
//! - [`patterns`]: Archive identifier patterns, matching and aggregation
//! - [`pipeline`]: Retrieval chain, per-DOI pipeline and discovery mode
//! - [`utils`]: HTTP client, text extraction and DOI validation
//! - [`config`]: Configuration management
//! - [`ui`]: Progress and summary output for the command line
//!
//! ```no_run
//! use archive_finder::config::Config;
//! use archive_finder::pipeline::ArchiveFinder;
//!
//! # async fn run() -> Result<(), archive_finder::sources::SourceError> {
//! let finder = ArchiveFinder::from_config(&Config::default())?;
//! let result = finder.find_references("10.1038/s41597-023-02214-y").await;
//! println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod models;
pub mod patterns;
pub mod pipeline;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::{ArchiveReport, DatasetMatch, FindResult};
pub use pipeline::ArchiveFinder;
pub use sources::{Source, SourceRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
