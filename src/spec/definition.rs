//! Column and attribute definition types
//!
//! YAML schema for `columns.yaml` and `attributes.yaml`. Unknown fields in
//! the source are ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::source::version_text;

/// Column requirement level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureLevel {
    Mandatory,
    Conditional,
    Optional,
    Recommended,
}

impl FeatureLevel {
    pub const ALL: [FeatureLevel; 4] = [
        Self::Mandatory,
        Self::Conditional,
        Self::Optional,
        Self::Recommended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mandatory => "Mandatory",
            Self::Conditional => "Conditional",
            Self::Optional => "Optional",
            Self::Recommended => "Recommended",
        }
    }
}

/// Column role in a cost and usage dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Dimension,
    Metric,
}

impl ColumnType {
    pub const ALL: [ColumnType; 2] = [Self::Dimension, Self::Metric];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dimension => "Dimension",
            Self::Metric => "Metric",
        }
    }
}

/// Unrecognised feature level or column type name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

// Caller-facing names are matched case-insensitively
impl FromStr for FeatureLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl FromStr for ColumnType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A FOCUS column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "column_id", alias = "id")]
    pub id: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Earliest specification version containing the column
    #[serde(
        default,
        deserialize_with = "version_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub introduced_version: Option<String>,

    #[serde(default)]
    pub data_type: String,

    pub feature_level: FeatureLevel,

    pub column_type: ColumnType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allows_nulls: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_specific: Option<bool>,
}

/// A FOCUS cross-cutting attribute definition (e.g. unit format)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "attribute_id", alias = "id")]
    pub id: String,

    #[serde(rename = "name", alias = "display_name", default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    #[serde(
        default,
        deserialize_with = "version_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub introduced_version: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<String>,
}

/// Fields shared by columns and attributes, used for search and lookup
pub trait SpecEntry {
    fn id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn description(&self) -> &str;
    fn introduced_version(&self) -> Option<&str>;

    /// Case-insensitive substring match on id, display name or description
    fn matches_search(&self, needle_lower: &str) -> bool {
        self.id().to_lowercase().contains(needle_lower)
            || self.display_name().to_lowercase().contains(needle_lower)
            || self.description().to_lowercase().contains(needle_lower)
    }
}

impl SpecEntry for Column {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn introduced_version(&self) -> Option<&str> {
        self.introduced_version.as_deref()
    }
}

impl SpecEntry for Attribute {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn introduced_version(&self) -> Option<&str> {
        self.introduced_version.as_deref()
    }
}

/// Optional narrowing applied after the version filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnFilter {
    pub feature_level: Option<FeatureLevel>,
    pub column_type: Option<ColumnType>,
    pub search: Option<String>,
}

impl ColumnFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feature_level(mut self, level: FeatureLevel) -> Self {
        self.feature_level = Some(level);
        self
    }

    pub fn column_type(mut self, kind: ColumnType) -> Self {
        self.column_type = Some(kind);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }
}
