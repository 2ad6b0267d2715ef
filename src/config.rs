//! Catalog configuration
//!
//! Environment-driven settings with defaults suited to local development.
//!
//! | Variable              | Default             |
//! |-----------------------|---------------------|
//! | `FOCUS_VERSION`       | `1.0`               |
//! | `FOCUS_RESOURCES_DIR` | `resources`         |
//! | `FOCUS_DATA_LOCATION` | `data/focus-export` |
//! | `AWS_REGION`          | `us-east-1`         |
//!
//! `AWS_DEFAULT_REGION` is consulted when `AWS_REGION` is unset.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::spec::{ATTRIBUTES_FILE, COLUMNS_FILE};
use crate::version;

pub const DEFAULT_FOCUS_VERSION: &str = "1.0";
pub const DEFAULT_RESOURCES_DIR: &str = "resources";
pub const DEFAULT_DATA_LOCATION: &str = "data/focus-export";
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

const S3_SCHEME: &str = "s3://";

/// Where the billing data lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "location", rename_all = "lowercase")]
pub enum DataLocation {
    Local(PathBuf),
    S3(String),
}

impl DataLocation {
    /// `s3://` URIs are S3, anything else is a local path
    pub fn parse(location: &str) -> Self {
        if location.starts_with(S3_SCHEME) {
            Self::S3(location.to_string())
        } else {
            Self::Local(PathBuf::from(location))
        }
    }

    pub fn is_s3(&self) -> bool {
        matches!(self, Self::S3(_))
    }

    pub fn source_type(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::S3(_) => "s3",
        }
    }
}

impl fmt::Display for DataLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::S3(uri) => f.write_str(uri),
        }
    }
}

/// Process-level catalog settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Default FOCUS version, already normalized
    pub focus_version: String,
    /// Root holding `queries/` and `specifications/`
    pub resources_dir: PathBuf,
    pub data_location: DataLocation,
    pub aws_region: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RESOURCES_DIR)
    }
}

impl CatalogConfig {
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            focus_version: DEFAULT_FOCUS_VERSION.to_string(),
            resources_dir: resources_dir.into(),
            data_location: DataLocation::parse(DEFAULT_DATA_LOCATION),
            aws_region: DEFAULT_AWS_REGION.to_string(),
        }
    }

    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, unset or empty values take defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let focus_version = get("FOCUS_VERSION")
            .map(|v| version::normalize_requested(&v))
            .unwrap_or_else(|| DEFAULT_FOCUS_VERSION.to_string());

        let resources_dir = get("FOCUS_RESOURCES_DIR")
            .unwrap_or_else(|| DEFAULT_RESOURCES_DIR.to_string());

        let data_location = get("FOCUS_DATA_LOCATION")
            .unwrap_or_else(|| DEFAULT_DATA_LOCATION.to_string());

        let aws_region = get("AWS_REGION")
            .or_else(|| get("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| DEFAULT_AWS_REGION.to_string());

        Self {
            focus_version,
            resources_dir: PathBuf::from(resources_dir),
            data_location: DataLocation::parse(&data_location),
            aws_region,
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.focus_version = version::normalize_requested(version);
        self
    }

    pub fn queries_dir(&self) -> PathBuf {
        self.resources_dir.join("queries")
    }

    pub fn specifications_dir(&self) -> PathBuf {
        self.resources_dir.join("specifications")
    }

    pub fn columns_file(&self) -> PathBuf {
        self.specifications_dir().join(COLUMNS_FILE)
    }

    pub fn attributes_file(&self) -> PathBuf {
        self.specifications_dir().join(ATTRIBUTES_FILE)
    }
}
