//! FOCUS specification metadata
//!
//! Column and attribute definitions extracted from the FOCUS specification,
//! filtered by the version in which each entry was introduced.

mod definition;
mod registry;

pub use definition::{
    Attribute, Column, ColumnFilter, ColumnType, FeatureLevel, SpecEntry, UnknownVariant,
};
pub use registry::{SpecRegistry, ATTRIBUTES_FILE, COLUMNS_FILE};
