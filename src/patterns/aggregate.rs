//! Merging raw pattern hits into per-archive reports.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::models::{ArchiveReport, DatasetMatch};
use crate::patterns::{find_archive_ids, ArchiveDefinition};

/// Collapse the hits of one archive into a report.
///
/// Returns `None` when there are no hits, so empty archives never reach the
/// output. Repeated (id, pattern type) pairs keep their first occurrence.
pub fn aggregate(matches: Vec<DatasetMatch>) -> Option<ArchiveReport> {
    if matches.is_empty() {
        return None;
    }

    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(matches.len());
    let mut ids = BTreeSet::new();

    for m in matches {
        if seen.insert((m.id.clone(), m.pattern_type.clone())) {
            ids.insert(m.id.clone());
            kept.push(m);
        }
    }

    Some(ArchiveReport {
        dataset_ids: ids.into_iter().collect(),
        matches: kept,
    })
}

/// Scan text against every archive and build the `archives` map of a result
pub fn scan_text(text: &str, archives: &[ArchiveDefinition]) -> BTreeMap<String, ArchiveReport> {
    archives
        .iter()
        .filter_map(|archive| {
            aggregate(find_archive_ids(text, archive)).map(|report| (archive.name.clone(), report))
        })
        .collect()
}
