//! Dataset identifier extraction.
//!
//! - [`table`]: the static archive → pattern rules configuration
//! - [`find_archive_ids`]: evaluate one archive's rules over text
//! - [`aggregate`] / [`scan_text`]: collapse hits into per-archive reports
//!
//! ```rust
//! use archive_finder::patterns::{archives, scan_text};
//!
//! let found = scan_text("Data: 10.48324/dandi.000130", archives());
//! assert_eq!(found["DANDI Archive"].dataset_ids, vec!["000130"]);
//! ```

mod aggregate;
mod matcher;
pub mod table;

pub use aggregate::{aggregate, scan_text};
pub use matcher::find_archive_ids;
pub use table::{
    archive, archive_names, archives, ArchiveDefinition, IdNormalization, PatternRule,
    DANDI_ARCHIVE, FIGSHARE, OPENNEURO, PHYSIONET,
};
