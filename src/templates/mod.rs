//! Query Templates
//!
//! Predefined FOCUS analytics queries ("use cases"). Each template carries a
//! SQL body with positional `?` placeholders and the set of FOCUS versions it
//! was written for.
//!
//! Key concepts:
//! - Templates come from one YAML file mapping identifier → definition
//! - An overrides file patches individual fields without editing the source
//! - Version selection is exact membership in `focus_versions`

mod definition;
mod registry;
mod sql_dir;

pub use definition::{RawTemplate, Template, TemplateOverride, TemplateSummary, NO_DESCRIPTION};
pub use registry::{canonical_identifier, TemplateRegistry, OVERRIDES_FILE, TEMPLATES_FILE};
pub use sql_dir::{parse_sql_file, version_dir_name, SQL_FILE_DESCRIPTION};
