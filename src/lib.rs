//! FOCUS Catalog - versioned billing query templates and specification metadata
//!
//! Loads predefined FOCUS analytics queries ("use cases") and the column and
//! attribute definitions of the FOCUS billing data specification, then
//! answers version-aware questions about them. Nothing here executes SQL:
//! a use case is resolved, its parameters validated, and the final body is
//! handed to whatever executor the caller runs.
//!
//! ## Layout
//! - [`version`]: ordering of FOCUS version strings (`1.2-preview < 1.2`)
//! - [`spec`]: column/attribute registry filtered by introduction version
//! - [`templates`]: query template registry, overrides and version selection
//! - [`binder`]: placeholder counting and parameter normalization
//! - [`catalog`]: the resolution facade and its hot-reload handle
//! - [`tools`]: JSON tool surface over the facade
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use focus_catalog::{CatalogConfig, ColumnFilter, FeatureLevel, FocusCatalog};
//!
//! let catalog = FocusCatalog::load(&CatalogConfig::new("resources"))?;
//! let mandatory = ColumnFilter::new().feature_level(FeatureLevel::Mandatory);
//! for column in catalog.resolve_columns(Some("1.2"), &mandatory)? {
//!     println!("{} ({})", column.id, column.data_type);
//! }
//! # Ok::<(), focus_catalog::CatalogError>(())
//! ```

// Core error handling
pub mod error;

// Version comparison
pub mod version;

// Definition sources
mod source;
pub mod spec;
pub mod templates;

// Parameter validation
pub mod binder;

pub mod config;

// Resolution facade and tool surface
pub mod catalog;
pub mod tools;

pub use binder::RawParameters;
pub use catalog::{CatalogHandle, FocusCatalog, PreparedExecution};
pub use config::{CatalogConfig, DataLocation};
pub use error::{BindingError, CatalogError, CatalogResult, LoadWarning, LookupKind, VersionError};
pub use spec::{Attribute, Column, ColumnFilter, ColumnType, FeatureLevel, SpecRegistry};
pub use templates::{Template, TemplateOverride, TemplateRegistry, TemplateSummary};
pub use tools::{dispatch_tool, ToolContext, ToolResponse};
pub use version::SpecVersion;
