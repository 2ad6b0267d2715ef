//! Definition source reading shared by the registries
//!
//! A source that is missing or cannot be read degrades to "no data" with a
//! [`LoadWarning`]; callers never see an I/O error.

use std::path::Path;

use anyhow::{Context, Result};
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::error::LoadWarning;

/// Read a source file, `Ok(None)` when it does not exist
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!("Read {} bytes from {}", content.len(), path.display());
    Ok(Some(content))
}

/// Read a source file, turning absence or read failure into a warning
pub(crate) fn read_or_warn(path: &Path, warnings: &mut Vec<LoadWarning>) -> Option<String> {
    let label = path.display().to_string();
    match read_optional(path) {
        Ok(Some(content)) => Some(content),
        Ok(None) => {
            warn!("Definition source not found at {}", label);
            warnings.push(LoadWarning::source(label, "source not found"));
            None
        }
        Err(e) => {
            warn!("{:#}", e);
            warnings.push(LoadWarning::source(label, format!("{:#}", e)));
            None
        }
    }
}

/// Parse YAML text, turning a syntax error into a warning
pub(crate) fn parse_yaml(
    label: &str,
    content: &str,
    warnings: &mut Vec<LoadWarning>,
) -> Option<Value> {
    match serde_yaml::from_str::<Value>(content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse {}: {}", label, e);
            warnings.push(LoadWarning::source(label, format!("Failed to parse: {}", e)));
            None
        }
    }
}

/// Lenient deserializers for version fields
///
/// Sources often write versions unquoted (`introduced_version: 1.0`), which
/// YAML reads as a number. Floats keep their decimal point (`1.0`, not `1`).
/// An unquoted `1.10` has already become `1.1` by this point, so sources
/// should quote such versions.
pub(crate) mod version_text {
    use std::fmt;

    use serde::de::{self, Deserializer, Visitor};
    use serde::Deserialize;

    struct VersionText(String);

    struct VersionTextVisitor;

    impl<'de> Visitor<'de> for VersionTextVisitor {
        type Value = VersionText;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a version string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(VersionText(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(VersionText(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(VersionText(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(VersionText(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(VersionText(format!("{:?}", v)))
        }
    }

    impl<'de> Deserialize<'de> for VersionText {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(VersionTextVisitor)
        }
    }

    pub(crate) fn option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<VersionText>::deserialize(deserializer)?.map(|v| v.0))
    }

    pub(crate) fn option_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Vec<VersionText>>::deserialize(deserializer)?
            .map(|list| list.into_iter().map(|v| v.0).collect()))
    }
}
