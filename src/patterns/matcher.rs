//! Pattern evaluation over free text.

use crate::models::DatasetMatch;
use crate::patterns::ArchiveDefinition;

/// Find every dataset reference of one archive in `text`.
///
/// Each rule is evaluated independently over the whole text, in rule order,
/// and every hit is returned. Collapsing duplicates is left to the
/// aggregator.
pub fn find_archive_ids(text: &str, archive: &ArchiveDefinition) -> Vec<DatasetMatch> {
    let mut matches = Vec::new();

    for rule in &archive.rules {
        for caps in rule.regex.captures_iter(text) {
            let (Some(whole), Some(raw)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            let id = rule.normalization.apply(raw.as_str());
            if id.is_empty() || rule.rejected_ids.contains(&id.as_str()) {
                continue;
            }

            matches.push(DatasetMatch::new(id, &rule.pattern_type, whole.as_str()));
        }
    }

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{archive, DANDI_ARCHIVE, FIGSHARE, OPENNEURO, PHYSIONET};

    fn ids(matches: &[DatasetMatch]) -> Vec<&str> {
        matches.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn test_dandi_doi() {
        let dandi = archive(DANDI_ARCHIVE).unwrap();
        let matches = find_archive_ids("see https://doi.org/10.48324/dandi.000130/0.210914.1539", dandi);

        let doi_hit = matches.iter().find(|m| m.pattern_type == "doi").unwrap();
        assert_eq!(doi_hit.id, "000130");
        assert_eq!(doi_hit.matched_string, "10.48324/dandi.000130");
    }

    #[test]
    fn test_dandi_surface_forms_normalize_to_same_id() {
        let dandi = archive(DANDI_ARCHIVE).unwrap();
        let matches = find_archive_ids(
            "Recordings are available as DANDI:000130 (https://dandiarchive.org/dandiset/000130).",
            dandi,
        );

        assert!(!matches.is_empty());
        assert!(matches.iter().all(|m| m.id == "000130"));
        let types: Vec<&str> = matches.iter().map(|m| m.pattern_type.as_str()).collect();
        assert!(types.contains(&"text_colon"));
        assert!(types.contains(&"url"));
        assert!(types.contains(&"dandiset_path"));
    }

    #[test]
    fn test_openneuro_bare_accession() {
        let openneuro = archive(OPENNEURO).unwrap();
        let matches = find_archive_ids("We used ds123456 from the repository.", openneuro);

        assert_eq!(ids(&matches), vec!["123456"]);
        assert_eq!(matches[0].pattern_type, "dataset_id");
        assert_eq!(matches[0].matched_string, "ds123456");
    }

    #[test]
    fn test_openneuro_accession_inside_word_is_ignored() {
        let openneuro = archive(OPENNEURO).unwrap();
        assert!(find_archive_ids("checksum: ads1234567x", openneuro).is_empty());
    }

    #[test]
    fn test_figshare_forms() {
        let figshare = archive(FIGSHARE).unwrap();
        let matches = find_archive_ids(
            "Data: 10.6084/m9.figshare.9598406.v2 and \
             https://figshare.com/articles/dataset/Some_title/12345678",
            figshare,
        );

        assert!(ids(&matches).contains(&"9598406"));
        assert!(ids(&matches).contains(&"12345678"));
    }

    #[test]
    fn test_figshare_versioned_urls_keep_article_id() {
        let figshare = archive(FIGSHARE).unwrap();

        let old_style =
            find_archive_ids("Data: https://figshare.com/articles/Spike_data/5558224/1", figshare);
        assert_eq!(ids(&old_style), vec!["5558224"]);
        assert_eq!(old_style[0].matched_string, "figshare.com/articles/Spike_data/5558224");

        let new_style = find_archive_ids(
            "Data: https://figshare.com/articles/dataset/Spike_data/12345678/2",
            figshare,
        );
        assert_eq!(ids(&new_style), vec!["12345678"]);
    }

    #[test]
    fn test_physionet_database_mention() {
        let physionet = archive(PHYSIONET).unwrap();

        let matches = find_archive_ids("records from the PhysioNet database mitdb", physionet);
        assert_eq!(ids(&matches), vec!["mitdb"]);
        assert_eq!(matches[0].pattern_type, "text_database");

        for text in [
            "the PhysioNet database with ECG recordings",
            "the PhysioNet Database Archive",
            "the PhysioNet database (see Methods)",
        ] {
            assert!(find_archive_ids(text, physionet).is_empty(), "{}", text);
        }
    }

    #[test]
    fn test_physionet_forms() {
        let physionet = archive(PHYSIONET).unwrap();
        let matches = find_archive_ids(
            "MIMIC (https://physionet.org/content/mimic-iii/1.4/) doi:10.13026/C2XW26",
            physionet,
        );

        assert!(ids(&matches).contains(&"mimic-iii"));
        assert!(ids(&matches).contains(&"c2xw26"));
    }

    #[test]
    fn test_no_matches_in_unrelated_text() {
        for name in [DANDI_ARCHIVE, OPENNEURO, FIGSHARE, PHYSIONET] {
            let def = archive(name).unwrap();
            assert!(find_archive_ids("Neurons fire in 2023 with 123456 spikes.", def).is_empty());
        }
    }
}
