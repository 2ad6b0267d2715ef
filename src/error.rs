//! Error types for catalog loading, version handling and parameter binding
//!
//! Load-time problems never fail a load; they are recorded as [`LoadWarning`]s
//! on the registry that hit them. Everything a caller can get wrong at lookup
//! or bind time comes back as a [`CatalogError`].

use std::fmt;

use thiserror::Error;

/// Version strings that the comparator cannot parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version format '{0}': expected N(.N)* with an optional -preview suffix")]
    InvalidFormat(String),
}

/// Parameter validation failures, always caused by caller input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error("Query requires {required} parameters but none provided")]
    MissingParameters { required: usize },

    #[error("Query requires {required} parameters but {provided} provided")]
    ParameterCountMismatch { required: usize, provided: usize },

    #[error("Missing parameter {index} in parameters dict")]
    MissingParameterKey { index: usize },

    #[error("Parameters must be a list (preferred) or numbered dict")]
    UnsupportedParameterShape,
}

/// What kind of thing a failed lookup was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    UseCase,
    Column,
    Attribute,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UseCase => write!(f, "Use case"),
            Self::Column => write!(f, "Column"),
            Self::Attribute => write!(f, "Attribute"),
        }
    }
}

/// Failures returned by the resolution facade
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    #[error("{kind} not found: {identifier}")]
    NotFound {
        kind: LookupKind,
        identifier: String,
        /// Close identifiers, best first
        suggestions: Vec<String>,
    },

    #[error(transparent)]
    Binding(#[from] BindingError),
}

impl CatalogError {
    pub fn not_found(kind: LookupKind, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            identifier: identifier.into(),
            suggestions: Vec::new(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Non-fatal problem encountered while loading a definition source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// File path or logical source name
    pub source: String,
    /// Entry identifier when the problem is confined to one entry
    pub entry: Option<String>,
    pub message: String,
}

impl LoadWarning {
    pub fn source(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            entry: None,
            message: message.into(),
        }
    }

    pub fn entry(
        source: impl Into<String>,
        entry: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            entry: Some(entry.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "{} [{}]: {}", self.source, entry, self.message),
            None => write!(f, "{}: {}", self.source, self.message),
        }
    }
}
