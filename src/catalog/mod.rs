//! Resolution Facade
//!
//! [`FocusCatalog`] owns one snapshot of the specification and template
//! registries and is the only surface the tool layer talks to. It normalizes
//! caller versions (`v1.2` → `1.2`), falls back to the configured version,
//! and returns typed [`CatalogError`]s for every lookup or binding failure.
//!
//! ```rust,no_run
//! use focus_catalog::{CatalogConfig, FocusCatalog, RawParameters};
//! use serde_json::json;
//!
//! let catalog = FocusCatalog::load(&CatalogConfig::from_env())?;
//! let template = catalog.resolve_template("cost-by-service", None)?;
//! let params = RawParameters::from_json(json!(["2025-01-01", "2025-02-01"]));
//! let prepared = catalog.prepare_execution(template, params, Some(100))?;
//! println!("{}", prepared.body);
//! # Ok::<(), focus_catalog::CatalogError>(())
//! ```

mod execution;
mod handle;

use std::collections::HashMap;

use tracing::info;

pub use execution::{apply_limit, has_limit_clause, PreparedExecution};
pub use handle::CatalogHandle;

use crate::binder::{self, RawParameters};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult, LoadWarning, LookupKind};
use crate::spec::{Attribute, Column, ColumnFilter, SpecRegistry};
use crate::templates::{Template, TemplateRegistry, TemplateSummary};
use crate::version::{self, SpecVersion};

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion
const SUGGESTION_THRESHOLD: f64 = 0.8;
const MAX_SUGGESTIONS: usize = 3;

/// One immutable snapshot of everything the catalog serves
#[derive(Debug, Clone)]
pub struct FocusCatalog {
    /// Configured default version, normalized
    version: String,

    specs: SpecRegistry,

    /// Every template that loaded, regardless of version
    templates: TemplateRegistry,

    /// Version → templates declaring that version
    selections: HashMap<String, TemplateRegistry>,
}

impl FocusCatalog {
    /// Assemble a catalog from already-loaded registries
    pub fn new(
        version: &str,
        specs: SpecRegistry,
        templates: TemplateRegistry,
    ) -> CatalogResult<Self> {
        let version = version::normalize_requested(version);
        SpecVersion::parse(&version)?;

        let mut selections: HashMap<String, TemplateRegistry> = templates
            .declared_versions()
            .into_iter()
            .map(|v| (v.to_string(), templates.select_for_version(v)))
            .collect();
        selections
            .entry(version.clone())
            .or_insert_with(|| templates.select_for_version(&version));

        Ok(Self {
            version,
            specs,
            templates,
            selections,
        })
    }

    /// Load both registries from the configured resources directory
    pub fn load(config: &CatalogConfig) -> CatalogResult<Self> {
        let specs = SpecRegistry::load(config.columns_file(), config.attributes_file());
        let templates = TemplateRegistry::load_from_dir(config.queries_dir(), &config.focus_version);
        let catalog = Self::new(&config.focus_version, specs, templates)?;

        info!(
            "FocusCatalog ready: version {}, {} use cases, {} columns, {} attributes",
            catalog.version,
            catalog.selected(&catalog.version).map_or(0, TemplateRegistry::len),
            catalog.specs.column_count(),
            catalog.specs.attribute_count()
        );

        Ok(catalog)
    }

    pub fn configured_version(&self) -> &str {
        &self.version
    }

    pub fn specs(&self) -> &SpecRegistry {
        &self.specs
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Everything recorded while loading either registry
    pub fn warnings(&self) -> impl Iterator<Item = &LoadWarning> {
        self.specs.warnings().iter().chain(self.templates.warnings())
    }

    /// Normalize a caller version, defaulting to the configured one
    pub fn resolve_version(&self, requested: Option<&str>) -> CatalogResult<SpecVersion> {
        let normalized = match requested.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => version::normalize_requested(raw),
            None => self.version.clone(),
        };
        Ok(SpecVersion::parse(&normalized)?)
    }

    fn selected(&self, version: &str) -> Option<&TemplateRegistry> {
        self.selections.get(version)
    }

    /// Resolve a use case by exact identifier, then by identifier or slug with
    /// `-` and `_` treated as equal
    pub fn resolve_template(&self, identifier: &str, version: Option<&str>) -> CatalogResult<&Template> {
        let version = self.resolve_version(version)?;
        let selected = self.selected(version.as_str());

        selected
            .and_then(|registry| {
                registry
                    .get(identifier)
                    .or_else(|| registry.get_canonical(identifier))
                    .or_else(|| registry.get_by_slug(identifier))
            })
            .ok_or_else(|| CatalogError::NotFound {
                kind: LookupKind::UseCase,
                identifier: identifier.to_string(),
                suggestions: selected
                    .map(|registry| suggest(identifier, registry.ids()))
                    .unwrap_or_default(),
            })
    }

    /// Use case summaries for a version, in registry order
    pub fn list_templates(&self, version: Option<&str>) -> CatalogResult<Vec<TemplateSummary>> {
        let version = self.resolve_version(version)?;
        Ok(self
            .selected(version.as_str())
            .map(TemplateRegistry::list)
            .unwrap_or_default())
    }

    pub fn resolve_columns(&self, version: Option<&str>, filter: &ColumnFilter) -> CatalogResult<Vec<&Column>> {
        let version = self.resolve_version(version)?;
        Ok(self.specs.get_columns(Some(&version), filter))
    }

    pub fn resolve_attributes(
        &self,
        version: Option<&str>,
        search: Option<&str>,
    ) -> CatalogResult<Vec<&Attribute>> {
        let version = self.resolve_version(version)?;
        Ok(self.specs.get_attributes(Some(&version), search))
    }

    /// Column by id or display name; without a version every column is searched
    pub fn find_column(&self, identifier: &str, version: Option<&str>) -> CatalogResult<&Column> {
        let version = self.scoped_version(version)?;
        self.specs
            .find_column(identifier, version.as_ref())
            .ok_or_else(|| CatalogError::not_found(LookupKind::Column, identifier))
    }

    /// Attribute by id or name; without a version every attribute is searched
    pub fn find_attribute(&self, identifier: &str, version: Option<&str>) -> CatalogResult<&Attribute> {
        let version = self.scoped_version(version)?;
        self.specs
            .find_attribute(identifier, version.as_ref())
            .ok_or_else(|| CatalogError::not_found(LookupKind::Attribute, identifier))
    }

    fn scoped_version(&self, version: Option<&str>) -> CatalogResult<Option<SpecVersion>> {
        match version.map(str::trim).filter(|v| !v.is_empty()) {
            Some(raw) => Ok(Some(SpecVersion::parse(&version::normalize_requested(raw))?)),
            None => Ok(None),
        }
    }

    /// Specification versions known to the loaded definitions, ascending
    pub fn list_versions(&self) -> Vec<&str> {
        self.specs.list_versions()
    }

    /// Bind parameters to a template and settle the limit clause
    ///
    /// Nothing is executed; the result is handed to an external executor.
    pub fn prepare_execution(
        &self,
        template: &Template,
        raw_parameters: Option<RawParameters>,
        result_limit: Option<u32>,
    ) -> CatalogResult<PreparedExecution> {
        let required = template.parameter_count();
        let bound_parameters = binder::normalize(raw_parameters, required)?;
        let (body, applied_limit_clause) = apply_limit(&template.body, result_limit);

        Ok(PreparedExecution {
            body,
            bound_parameters,
            applied_limit_clause,
        })
    }
}

/// Closest identifiers to `input`, best first
fn suggest<'a>(input: &str, candidates: impl Iterator<Item = &'a str>) -> Vec<String> {
    let input_lower = input.to_lowercase();
    let mut scored: Vec<(f64, &str)> = candidates
        .map(|c| (strsim::jaro_winkler(&input_lower, &c.to_lowercase()), c))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, c)| c.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BindingError;
    use serde_json::json;

    const TEMPLATES: &str = r#"
cost_by_service:
  name: Cost by Service
  slug: services-cost
  focus_versions: ["1.0", "1.2"]
  sql: SELECT ServiceName FROM focus_data WHERE BillingPeriodStart >= ? AND BillingPeriodEnd < ? AND x = ?
top_skus:
  name: Top SKUs
  focus_versions: ["1.2"]
  sql: SELECT SkuId FROM focus_data ORDER BY EffectiveCost DESC LIMIT 10
"#;

    const COLUMNS: &str = r#"
- column_id: BilledCost
  display_name: Billed Cost
  introduced_version: "1.0"
  feature_level: Mandatory
  column_type: Metric
- column_id: InvoiceId
  display_name: Invoice ID
  introduced_version: "1.2"
  feature_level: Recommended
  column_type: Dimension
"#;

    fn catalog(version: &str) -> FocusCatalog {
        FocusCatalog::new(
            version,
            SpecRegistry::from_sources(Some(COLUMNS), None),
            TemplateRegistry::from_sources(Some(TEMPLATES), None),
        )
        .unwrap()
    }

    #[test]
    fn test_invalid_configured_version() {
        let err = FocusCatalog::new("latest", SpecRegistry::new(), TemplateRegistry::new())
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidVersion(_)));
    }

    #[test]
    fn test_resolve_template_by_id_separator_and_slug() {
        let catalog = catalog("1.2");
        assert_eq!(catalog.resolve_template("cost_by_service", None).unwrap().id, "cost_by_service");
        assert_eq!(catalog.resolve_template("cost-by-service", None).unwrap().id, "cost_by_service");
        assert_eq!(catalog.resolve_template("services-cost", None).unwrap().id, "cost_by_service");
        assert_eq!(catalog.resolve_template("services_cost", None).unwrap().id, "cost_by_service");
        assert_eq!(catalog.resolve_template("top-skus", None).unwrap().id, "top_skus");
    }

    #[test]
    fn test_resolve_template_mixed_separators() {
        let templates = r#"
foo-bar-baz:
  slug: weekly_spend-trend
  focus_versions: ["1.2"]
  sql: SELECT 1
"#;
        let catalog = FocusCatalog::new(
            "1.2",
            SpecRegistry::new(),
            TemplateRegistry::from_sources(Some(templates), None),
        )
        .unwrap();

        for identifier in ["foo-bar-baz", "foo-bar_baz", "foo_bar-baz", "foo_bar_baz", "weekly-spend_trend"] {
            assert_eq!(catalog.resolve_template(identifier, None).unwrap().id, "foo-bar-baz");
        }
        assert!(catalog.resolve_template("foo-barbaz", None).is_err());
    }

    #[test]
    fn test_resolve_template_respects_version_membership() {
        let catalog = catalog("1.0");
        assert!(catalog.resolve_template("cost_by_service", None).is_ok());
        assert!(catalog.resolve_template("top_skus", None).is_err());
        assert!(catalog.resolve_template("top_skus", Some("v1.2")).is_ok());
        // 1.1 is between the declared versions but not declared itself
        assert!(catalog.resolve_template("cost_by_service", Some("1.1")).is_err());
    }

    #[test]
    fn test_not_found_carries_suggestions() {
        let catalog = catalog("1.2");
        match catalog.resolve_template("cost_by_servce", None).unwrap_err() {
            CatalogError::NotFound {
                kind,
                identifier,
                suggestions,
            } => {
                assert_eq!(kind, LookupKind::UseCase);
                assert_eq!(identifier, "cost_by_servce");
                assert_eq!(suggestions, vec!["cost_by_service".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_requested_version() {
        let catalog = catalog("1.2");
        let err = catalog.resolve_columns(Some("one.two"), &ColumnFilter::new()).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidVersion(_)));
    }

    #[test]
    fn test_resolve_columns_defaults_to_configured_version() {
        let catalog = catalog("1.0");
        let columns = catalog.resolve_columns(None, &ColumnFilter::new()).unwrap();
        assert_eq!(columns.len(), 1);
        let columns = catalog.resolve_columns(Some("V1.2"), &ColumnFilter::new()).unwrap();
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_find_column_scoping() {
        let catalog = catalog("1.0");
        assert_eq!(catalog.find_column("invoice id", None).unwrap().id, "InvoiceId");
        let err = catalog.find_column("InvoiceId", Some("1.0")).unwrap_err();
        assert_eq!(err, CatalogError::not_found(LookupKind::Column, "InvoiceId"));
        assert!(catalog.find_attribute("unit_format", None).is_err());
    }

    #[test]
    fn test_prepare_execution_binds_and_limits() {
        let catalog = catalog("1.2");
        let template = catalog.resolve_template("cost_by_service", None).unwrap();

        let params = RawParameters::from_json(json!({"1": "2025-01-01", "2": "2025-02-01", "3": 1}));
        let prepared = catalog.prepare_execution(template, params, Some(50)).unwrap();
        assert!(prepared.applied_limit_clause);
        assert!(prepared.body.ends_with(" LIMIT 50"));
        assert_eq!(prepared.bound_parameters, vec![json!("2025-01-01"), json!("2025-02-01"), json!(1)]);
    }

    #[test]
    fn test_prepare_execution_count_mismatch() {
        let catalog = catalog("1.2");
        let template = catalog.resolve_template("cost_by_service", None).unwrap();
        let params = RawParameters::from_json(json!(["2025-01-01", "2025-02-01"]));
        let err = catalog.prepare_execution(template, params, None).unwrap_err();
        assert_eq!(
            err,
            CatalogError::Binding(BindingError::ParameterCountMismatch {
                required: 3,
                provided: 2
            })
        );
    }

    #[test]
    fn test_prepare_execution_keeps_existing_limit() {
        let catalog = catalog("1.2");
        let template = catalog.resolve_template("top_skus", None).unwrap();
        let prepared = catalog.prepare_execution(template, None, Some(100)).unwrap();
        assert!(!prepared.applied_limit_clause);
        assert_eq!(prepared.body, template.body);
        assert!(prepared.bound_parameters.is_empty());
    }

    #[test]
    fn test_list_templates_per_version() {
        let catalog = catalog("1.0");
        assert_eq!(catalog.list_templates(None).unwrap().len(), 1);
        assert_eq!(catalog.list_templates(Some("1.2")).unwrap().len(), 2);
        assert!(catalog.list_templates(Some("2.0")).unwrap().is_empty());
    }
}
