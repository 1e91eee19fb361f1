//! The built-in archive pattern table.
//!
//! Each archive lists the surface forms a dataset reference can take (DOI,
//! landing-page URL, bare text mention) as a regex whose first capture group
//! is the raw identifier. Patterns are matched case-insensitively unless a
//! group switches it off with `(?-i:...)`.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

/// How a captured identifier is turned into its canonical form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdNormalization {
    /// Keep the capture as-is
    Verbatim,
    /// Left-pad a numeric id with zeros to the given width
    ZeroPad(usize),
    /// Drop a leading prefix (any case), then zero-pad
    StripPrefix { prefix: &'static str, width: usize },
    /// Lower-case the capture
    Lowercase,
}

impl IdNormalization {
    /// Normalize a raw captured identifier
    pub fn apply(&self, raw: &str) -> String {
        let raw = raw.trim();
        match *self {
            IdNormalization::Verbatim => raw.to_string(),
            IdNormalization::ZeroPad(width) => zero_pad(raw, width),
            IdNormalization::StripPrefix { prefix, width } => {
                let rest = match raw.get(..prefix.len()) {
                    Some(head) if head.eq_ignore_ascii_case(prefix) => &raw[prefix.len()..],
                    _ => raw,
                };
                zero_pad(rest, width)
            }
            IdNormalization::Lowercase => raw.to_lowercase(),
        }
    }
}

fn zero_pad(digits: &str, width: usize) -> String {
    format!("{:0>width$}", digits, width = width)
}

/// One surface form of an archive's dataset references
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Label reported in matches (doi, url, text_colon, ...)
    pub pattern_type: String,
    pub regex: Regex,
    pub normalization: IdNormalization,
    /// Normalized ids this rule never reports (words a text pattern picks up)
    pub rejected_ids: &'static [&'static str],
}

impl PatternRule {
    /// Compile a case-insensitive rule
    pub fn new(
        pattern: &str,
        pattern_type: impl Into<String>,
        normalization: IdNormalization,
    ) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern_type: pattern_type.into(),
            regex,
            normalization,
            rejected_ids: &[],
        })
    }
}

/// A dataset archive and its ordered pattern rules
#[derive(Debug, Clone)]
pub struct ArchiveDefinition {
    pub name: String,
    pub rules: Vec<PatternRule>,
}

impl ArchiveDefinition {
    /// Build an archive whose rules share one normalization
    pub fn new(
        name: impl Into<String>,
        normalization: IdNormalization,
        patterns: &[(&str, &str)],
    ) -> Result<Self, regex::Error> {
        let rules = patterns
            .iter()
            .map(|(pattern, pattern_type)| PatternRule::new(pattern, *pattern_type, normalization))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            rules,
        })
    }

    /// Drop the given ids from every rule of one pattern type
    pub fn rejecting(mut self, pattern_type: &str, ids: &'static [&'static str]) -> Self {
        for rule in self.rules.iter_mut().filter(|r| r.pattern_type == pattern_type) {
            rule.rejected_ids = ids;
        }
        self
    }
}

pub const DANDI_ARCHIVE: &str = "DANDI Archive";
pub const OPENNEURO: &str = "OpenNeuro";
pub const FIGSHARE: &str = "Figshare";
pub const PHYSIONET: &str = "PhysioNet";

const DANDI_PATTERNS: &[(&str, &str)] = &[
    // 10.48324/dandi.000130 or 10.48324/dandi.000130/0.210914.1539
    (r"10\.48324/dandi\.(\d{6})", "doi"),
    (r"dandiarchive\.org/dandiset/(\d{6})", "url"),
    (r"gui\.dandiarchive\.org/#/dandiset/(\d{6})", "gui_url"),
    (r"DANDI:\s*(\d{6})", "text_colon"),
    (r"DANDI\s+(\d{6})", "text_space"),
    (r"dandiset\s+(\d{6})", "dandiset_text"),
    (r"dandiset/(\d{6})", "dandiset_path"),
    (r"DANDI(?:\s+archive)?(?:\s+identifier)?[:\s]+(\d{6})", "identifier"),
];

const OPENNEURO_PATTERNS: &[(&str, &str)] = &[
    (r"10\.18112/openneuro\.(ds\d{6})", "doi"),
    (r"openneuro\.org/datasets/(ds\d{6})", "url"),
    (r"OpenNeuro:\s*(ds\d{6})", "text_colon"),
    (r"OpenNeuro\s+(ds\d{6})", "text_space"),
    (r"\b(ds\d{6})\b", "dataset_id"),
];

const FIGSHARE_PATTERNS: &[(&str, &str)] = &[
    // 10.6084/m9.figshare.9598406 or 10.6084/m9.figshare.9598406.v2
    (r"10\.6084/m9\.figshare\.(\d+)", "doi"),
    // articles/<title>/<id>[/<version>] and articles/<type>/<title>/<id>[/<version>]
    (r"figshare\.com/articles/(?:[^/\s]+/){1,2}?(\d+)\b", "url"),
    (r"figshare\.com/ndownloader/files/(\d+)", "download_url"),
    (r"figshare:\s*(\d{6,})", "text_colon"),
    (r"figshare\s+(\d{6,})", "text_space"),
];

const PHYSIONET_PATTERNS: &[(&str, &str)] = &[
    // 10.13026/C2KX0P or 10.13026/xxxx-xxxx
    (r"10\.13026/([A-Za-z0-9-]+)", "doi"),
    (r"physionet\.org/content/([a-z][a-z0-9-]+[a-z0-9])", "url"),
    (r"physionet\.org/physiobank/database/([a-z][a-z0-9-]{2,})", "physiobank_url"),
    // slugs are lower-case, so the capture is case-sensitive
    (r"PhysioNet\s+database\s+((?-i:[a-z][a-z0-9-]{3,}))\b", "text_database"),
];

/// English words that follow "PhysioNet database" in running text
const PHYSIONET_TEXT_WORDS: &[&str] = &[
    "also", "called", "comprising", "consisting", "containing", "contains", "from", "have",
    "includes", "including", "provides", "that", "were", "which", "with",
];

fn builtin_archives() -> Result<Vec<ArchiveDefinition>, regex::Error> {
    Ok(vec![
        ArchiveDefinition::new(DANDI_ARCHIVE, IdNormalization::ZeroPad(6), DANDI_PATTERNS)?,
        ArchiveDefinition::new(
            OPENNEURO,
            IdNormalization::StripPrefix {
                prefix: "ds",
                width: 6,
            },
            OPENNEURO_PATTERNS,
        )?,
        ArchiveDefinition::new(FIGSHARE, IdNormalization::Verbatim, FIGSHARE_PATTERNS)?,
        ArchiveDefinition::new(PHYSIONET, IdNormalization::Lowercase, PHYSIONET_PATTERNS)?
            .rejecting("text_database", PHYSIONET_TEXT_WORDS),
    ])
}

static ARCHIVES: LazyLock<Vec<ArchiveDefinition>> =
    LazyLock::new(|| builtin_archives().expect("built-in archive patterns must compile"));

/// All built-in archives, in reporting order
pub fn archives() -> &'static [ArchiveDefinition] {
    &ARCHIVES
}

/// Look up a built-in archive by name
pub fn archive(name: &str) -> Option<&'static ArchiveDefinition> {
    archives().iter().find(|a| a.name == name)
}

/// Names of the built-in archives
pub fn archive_names() -> impl Iterator<Item = &'static str> {
    archives().iter().map(|a| a.name.as_str())
}
