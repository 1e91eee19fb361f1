//! Core data models for papers, search, and scan reports.

mod paper;
mod report;
mod search;

pub use paper::{PaperRef, SourceType};
pub use report::{ArchiveReport, DatasetMatch, FindResult, NO_TEXT_ERROR};
pub use search::{SearchQuery, SearchResponse};
