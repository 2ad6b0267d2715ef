//! Template Definition Types
//!
//! YAML schema for the unified query template file and its overrides file.
//!
//! ```yaml
//! cost_by_service:
//!   name: Cost by Service
//!   description: Effective cost per service for a billing period
//!   slug: cost-by-service
//!   focus_versions: ["1.0", "1.1", "1.2"]
//!   citation: https://focus.finops.org/use-cases/...
//!   sql: |
//!     SELECT ServiceName, SUM(EffectiveCost) AS cost
//!     FROM focus_data
//!     WHERE BillingPeriodStart >= ? AND BillingPeriodEnd < ?
//!     GROUP BY ServiceName
//! ```

use std::collections::BTreeSet;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::binder;
use crate::source::version_text;
use crate::version;

/// Shown by summaries when a template has no description
pub const NO_DESCRIPTION: &str = "No description available";

/// A template entry as written in the source file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTemplate {
    #[serde(default, alias = "display_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// SQL body with `?` placeholders
    #[serde(default, alias = "query", skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    #[serde(
        default,
        deserialize_with = "version_text::option_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub focus_versions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Sparse patch over a [`RawTemplate`]
///
/// Every present field replaces the raw field verbatim. `reason` documents
/// why the override exists and is never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOverride {
    #[serde(default, alias = "display_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, alias = "query", skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    #[serde(
        default,
        deserialize_with = "version_text::option_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub focus_versions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Audit note, kept on the override only
    #[serde(default, alias = "comment", skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TemplateOverride {
    /// Apply this patch to a raw entry
    pub fn apply(&self, raw: &RawTemplate) -> RawTemplate {
        RawTemplate {
            name: self.name.clone().or_else(|| raw.name.clone()),
            description: self.description.clone().or_else(|| raw.description.clone()),
            sql: self.sql.clone().or_else(|| raw.sql.clone()),
            focus_versions: self
                .focus_versions
                .clone()
                .or_else(|| raw.focus_versions.clone()),
            citation: self.citation.clone().or_else(|| raw.citation.clone()),
            slug: self.slug.clone().or_else(|| raw.slug.clone()),
        }
    }
}

/// A resolved, immutable query template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub description: String,
    /// SQL body with `?` placeholders
    pub body: String,
    /// Versions this template declares itself usable under
    pub compatible_versions: BTreeSet<String>,
    pub citation: String,
}

impl Template {
    /// Build from a raw entry that has already had any override applied
    pub fn from_raw(id: &str, raw: RawTemplate) -> Result<Self> {
        let body = raw
            .sql
            .map(|sql| sql.trim().to_string())
            .filter(|sql| !sql.is_empty())
            .ok_or_else(|| anyhow!("template has no SQL body"))?;

        Ok(Self {
            id: id.to_string(),
            slug: raw.slug.unwrap_or_else(|| id.to_string()),
            name: raw.name.unwrap_or_else(|| id.to_string()),
            description: raw.description.unwrap_or_default(),
            body,
            compatible_versions: raw
                .focus_versions
                .unwrap_or_default()
                .iter()
                .map(|v| version::normalize_requested(v))
                .collect(),
            citation: raw.citation.unwrap_or_default(),
        })
    }

    /// Number of parameters a caller must bind
    pub fn parameter_count(&self) -> usize {
        binder::placeholder_count(&self.body)
    }

    /// Exact membership test against the declared version set
    pub fn is_compatible_with(&self, version: &str) -> bool {
        self.compatible_versions.contains(version)
    }

    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: if self.description.is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                self.description.clone()
            },
            parameter_count: self.parameter_count(),
        }
    }
}

/// Lightweight listing entry, no SQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parameter_count: usize,
}
