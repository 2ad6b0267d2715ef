//! FOCUS specification version parsing and ordering
//!
//! Versions are dotted numeric strings with an optional `-preview` suffix.
//! Components compare numerically, trailing zero components are ignored
//! (`1.0 == 1.0.0`), and a preview sorts before its release
//! (`1.2-preview < 1.2`).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

const PREVIEW_SUFFIX: &str = "-preview";

/// A parsed specification version
#[derive(Debug, Clone)]
pub struct SpecVersion {
    raw: String,
    components: Vec<u64>,
    preview: bool,
}

impl SpecVersion {
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = || VersionError::InvalidFormat(input.to_string());

        let (numeric, preview) = match input.strip_suffix(PREVIEW_SUFFIX) {
            Some(rest) => (rest, true),
            None => (input, false),
        };

        if numeric.is_empty() {
            return Err(invalid());
        }

        let components = numeric
            .split('.')
            .map(|part| {
                // u64::from_str accepts a leading '+', the grammar does not
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                part.parse::<u64>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            raw: input.to_string(),
            components,
            preview,
        })
    }

    /// The string this version was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Components with trailing zeros removed
    fn significant(&self) -> &[u64] {
        let len = self
            .components
            .iter()
            .rposition(|&c| c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..len]
    }
}

impl Ord for SpecVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant()
            .cmp(other.significant())
            .then_with(|| other.preview.cmp(&self.preview))
    }
}

impl PartialOrd for SpecVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SpecVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SpecVersion {}

impl FromStr for SpecVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two version strings
pub fn compare(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(SpecVersion::parse(a)?.cmp(&SpecVersion::parse(b)?))
}

/// `a <= b` under version ordering
pub fn less_or_equal(a: &str, b: &str) -> Result<bool, VersionError> {
    Ok(compare(a, b)? != Ordering::Greater)
}

/// Normalize a caller-supplied version: trim and drop one leading `v`/`V`
pub fn normalize_requested(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix(['v', 'V'])
        .unwrap_or(trimmed)
        .to_string()
}
