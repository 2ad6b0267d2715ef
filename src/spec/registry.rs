//! Specification Registry
//!
//! In-memory registry of FOCUS column and attribute definitions loaded from
//! YAML. Entries are visible at version V when they were introduced at or
//! before V; nothing ever expires.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::{debug, info, warn};

use super::definition::{Attribute, Column, ColumnFilter, SpecEntry};
use crate::error::LoadWarning;
use crate::source;
use crate::version::SpecVersion;

pub const COLUMNS_FILE: &str = "columns.yaml";
pub const ATTRIBUTES_FILE: &str = "attributes.yaml";

/// An entry with its introduction version parsed once at load time
#[derive(Debug, Clone)]
struct Indexed<T> {
    /// `None` when the source omits the field; such entries are always visible
    introduced: Option<SpecVersion>,
    entry: T,
}

impl<T> Indexed<T> {
    fn visible_at(&self, version: Option<&SpecVersion>) -> bool {
        match (version, &self.introduced) {
            (Some(requested), Some(introduced)) => introduced <= requested,
            _ => true,
        }
    }
}

/// Registry of column and attribute definitions
#[derive(Debug, Clone, Default)]
pub struct SpecRegistry {
    /// Columns in source order
    columns: Vec<Indexed<Column>>,

    /// Attributes in source order
    attributes: Vec<Indexed<Attribute>>,

    /// Problems found while loading
    warnings: Vec<LoadWarning>,
}

impl SpecRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `columns.yaml` and `attributes.yaml` from a directory
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::load(dir.join(COLUMNS_FILE), dir.join(ATTRIBUTES_FILE))
    }

    /// Load the two definition sources independently
    ///
    /// A missing or malformed source leaves that collection empty and records
    /// a warning; the registry stays usable either way.
    pub fn load(columns_path: impl AsRef<Path>, attributes_path: impl AsRef<Path>) -> Self {
        let columns_path = columns_path.as_ref();
        let attributes_path = attributes_path.as_ref();
        let mut warnings = Vec::new();

        let columns = source::read_or_warn(columns_path, &mut warnings)
            .map(|content| {
                parse_entries(&columns_path.display().to_string(), &content, &mut warnings)
            })
            .unwrap_or_default();

        let attributes = source::read_or_warn(attributes_path, &mut warnings)
            .map(|content| {
                parse_entries(&attributes_path.display().to_string(), &content, &mut warnings)
            })
            .unwrap_or_default();

        if columns.is_empty() {
            warn!("FOCUS column metadata will not be available");
        }

        let registry = Self {
            columns,
            attributes,
            warnings,
        };

        info!(
            "SpecRegistry loaded: {} columns, {} attributes, {} warnings",
            registry.columns.len(),
            registry.attributes.len(),
            registry.warnings.len()
        );

        registry
    }

    /// Build from in-memory YAML sources; `None` behaves like a missing file
    pub fn from_sources(columns: Option<&str>, attributes: Option<&str>) -> Self {
        let mut warnings = Vec::new();

        let columns = match columns {
            Some(content) => parse_entries("columns", content, &mut warnings),
            None => {
                warnings.push(LoadWarning::source("columns", "source not found"));
                Vec::new()
            }
        };

        let attributes = match attributes {
            Some(content) => parse_entries("attributes", content, &mut warnings),
            None => {
                warnings.push(LoadWarning::source("attributes", "source not found"));
                Vec::new()
            }
        };

        Self {
            columns,
            attributes,
            warnings,
        }
    }

    /// Columns visible at `version`, narrowed by `filter`, in source order
    pub fn get_columns(&self, version: Option<&SpecVersion>, filter: &ColumnFilter) -> Vec<&Column> {
        let search = normalized_search(filter.search.as_deref());

        self.columns
            .iter()
            .filter(|c| c.visible_at(version))
            .map(|c| &c.entry)
            .filter(|c| filter.feature_level.is_none_or(|level| c.feature_level == level))
            .filter(|c| filter.column_type.is_none_or(|kind| c.column_type == kind))
            .filter(|c| search.as_deref().is_none_or(|needle| c.matches_search(needle)))
            .collect()
    }

    /// Attributes visible at `version`, optionally searched, in source order
    pub fn get_attributes(&self, version: Option<&SpecVersion>, search: Option<&str>) -> Vec<&Attribute> {
        let search = normalized_search(search);

        self.attributes
            .iter()
            .filter(|a| a.visible_at(version))
            .map(|a| &a.entry)
            .filter(|a| search.as_deref().is_none_or(|needle| a.matches_search(needle)))
            .collect()
    }

    /// Find a column by id, then by display name (case-insensitive)
    pub fn find_column(&self, identifier: &str, version: Option<&SpecVersion>) -> Option<&Column> {
        find_entry(&self.columns, identifier, version)
    }

    /// Find an attribute by id, then by name (case-insensitive)
    pub fn find_attribute(&self, identifier: &str, version: Option<&SpecVersion>) -> Option<&Attribute> {
        find_entry(&self.attributes, identifier, version)
    }

    /// Distinct introduction versions across columns and attributes, ascending
    pub fn list_versions(&self) -> Vec<&str> {
        let mut versions: Vec<&SpecVersion> = Vec::new();

        let introduced = self
            .columns
            .iter()
            .filter_map(|c| c.introduced.as_ref())
            .chain(self.attributes.iter().filter_map(|a| a.introduced.as_ref()));

        for version in introduced {
            if !versions.iter().any(|v| v.as_str() == version.as_str()) {
                versions.push(version);
            }
        }

        versions.sort_by(|a, b| a.cmp(b).then_with(|| a.as_str().cmp(b.as_str())));
        versions.into_iter().map(|v| v.as_str()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.attributes.is_empty()
    }

    /// Problems recorded while loading
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}

fn normalized_search(search: Option<&str>) -> Option<String> {
    search.filter(|s| !s.is_empty()).map(|s| s.to_lowercase())
}

fn find_entry<'a, T: SpecEntry>(
    entries: &'a [Indexed<T>],
    identifier: &str,
    version: Option<&SpecVersion>,
) -> Option<&'a T> {
    let identifier_lower = identifier.to_lowercase();
    let visible: Vec<&T> = entries
        .iter()
        .filter(|e| e.visible_at(version))
        .map(|e| &e.entry)
        .collect();

    visible
        .iter()
        .find(|e| e.id().to_lowercase() == identifier_lower)
        .or_else(|| {
            visible
                .iter()
                .find(|e| e.display_name().to_lowercase() == identifier_lower)
        })
        .copied()
}

/// Parse a YAML sequence of entries, skipping the ones that do not parse
fn parse_entries<T>(label: &str, content: &str, warnings: &mut Vec<LoadWarning>) -> Vec<Indexed<T>>
where
    T: DeserializeOwned + SpecEntry,
{
    let items = match source::parse_yaml(label, content, warnings) {
        Some(Value::Sequence(items)) => items,
        // An empty document is an empty collection
        Some(Value::Null) => return Vec::new(),
        Some(_) => {
            warn!("{}: expected a list of definitions", label);
            warnings.push(LoadWarning::source(label, "expected a list of definitions"));
            return Vec::new();
        }
        None => return Vec::new(),
    };

    let mut entries = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let entry: T = match serde_yaml::from_value(item) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("{}: skipping entry #{}: {}", label, index, e);
                warnings.push(LoadWarning::entry(label, format!("#{}", index), e.to_string()));
                continue;
            }
        };

        let introduced = match entry.introduced_version() {
            Some(raw) => match SpecVersion::parse(raw) {
                Ok(version) => Some(version),
                Err(e) => {
                    warn!("{}: skipping {}: {}", label, entry.id(), e);
                    warnings.push(LoadWarning::entry(label, entry.id(), e.to_string()));
                    continue;
                }
            },
            None => None,
        };

        debug!("Loaded spec entry: {}", entry.id());
        entries.push(Indexed { introduced, entry });
    }

    entries
}
