use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use crate::pos::TAG_SET_VERSION;

/// Result of a native version query.
///
/// Nothing is logged by the query itself; callers decide what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Version string reported by `kiwi_version`.
    pub version: String,
    /// Wall-clock time spent in the query.
    pub elapsed: Duration,
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("version pattern is a valid regex")
    })
}

impl VersionInfo {
    /// `(major, minor, patch)` parsed from the first dotted triple in the
    /// version string.
    pub fn numeric(&self) -> Option<(u32, u32, u32)> {
        let captures = version_pattern().captures(&self.version)?;
        let part = |index: usize| captures.get(index)?.as_str().parse::<u32>().ok();
        Some((part(1)?, part(2)?, part(3)?))
    }

    /// Returns `true` when the library is newer than the release the tag
    /// table was checked against, so unseen tags may show up in results.
    pub fn is_newer_than_tag_set(&self) -> bool {
        self.numeric()
            .is_some_and(|version| version > TAG_SET_VERSION)
    }
}
