//! Catalog loading and resolution against on-disk resource directories
//!
//! Run with: cargo test --test catalog_integration

mod common;

use common::Resources;
use focus_catalog::templates::SQL_FILE_DESCRIPTION;
use focus_catalog::{
    BindingError, CatalogError, CatalogHandle, ColumnFilter, ColumnType, FeatureLevel,
    FocusCatalog, LookupKind, RawParameters, SpecRegistry, TemplateRegistry,
};
use serde_json::json;

fn column_ids(catalog: &FocusCatalog, version: Option<&str>) -> Vec<String> {
    catalog
        .resolve_columns(version, &ColumnFilter::new())
        .unwrap()
        .into_iter()
        .map(|c| c.id.clone())
        .collect()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_standard_resources_load() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();

    assert_eq!(catalog.configured_version(), "1.2");
    assert_eq!(catalog.specs().column_count(), 5);
    assert_eq!(catalog.specs().attribute_count(), 2);

    // broken_entry has no body; retired_query patches nothing
    let warnings: Vec<String> = catalog.warnings().map(|w| w.to_string()).collect();
    assert_eq!(warnings.len(), 2, "{:?}", warnings);
    assert!(warnings.iter().any(|w| w.contains("broken_entry")));
    assert!(warnings.iter().any(|w| w.contains("retired_query")));
}

#[test]
fn test_overrides_applied() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();

    let template = catalog.resolve_template("invoice_totals", None).unwrap();
    assert_eq!(template.name, "Invoice Totals (corrected)");
    assert!(template.body.contains("AS billed"));

    let patch = catalog.templates().override_for("invoice_totals").unwrap();
    assert_eq!(
        patch.reason.as_deref(),
        Some("Upstream query grouped by the wrong column")
    );
    assert!(catalog.templates().override_for("cost_by_service").is_none());
}

#[test]
fn test_missing_spec_sources() {
    let resources = Resources::empty();
    resources.write("queries/focus_queries.yaml", common::TEMPLATES);
    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();

    assert!(column_ids(&catalog, None).is_empty());
    assert!(catalog.resolve_attributes(None, None).unwrap().is_empty());
    assert_eq!(
        catalog.find_column("BilledCost", None).unwrap_err(),
        CatalogError::not_found(LookupKind::Column, "BilledCost")
    );
    assert!(catalog.list_versions().is_empty());

    let missing: Vec<_> = catalog
        .specs()
        .warnings()
        .iter()
        .filter(|w| w.message == "source not found")
        .collect();
    assert_eq!(missing.len(), 2);
    assert!(missing[0].source.ends_with("columns.yaml"));

    // Templates are unaffected
    assert_eq!(catalog.list_templates(None).unwrap().len(), 3);
}

#[test]
fn test_malformed_columns_file() {
    let resources = Resources::standard();
    resources.write("specifications/columns.yaml", "- column_id: [unclosed");
    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();

    assert!(column_ids(&catalog, None).is_empty());
    assert_eq!(catalog.resolve_attributes(None, None).unwrap().len(), 2);
}

// ============================================================================
// Version filtering
// ============================================================================

#[test]
fn test_columns_by_version() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.0")).unwrap();

    assert_eq!(column_ids(&catalog, None), vec!["BilledCost", "ServiceName"]);
    assert_eq!(column_ids(&catalog, Some("0.9")), Vec::<String>::new());
    assert_eq!(column_ids(&catalog, Some("v1.1")).len(), 3);
    assert_eq!(column_ids(&catalog, Some("1.2")).len(), 4);
    // A preview precedes its release
    assert_eq!(column_ids(&catalog, Some("1.3-preview")).len(), 5);
    assert_eq!(column_ids(&catalog, Some("1.3")).len(), 5);
}

#[test]
fn test_column_filters_combine() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();

    let filter = ColumnFilter::new()
        .feature_level(FeatureLevel::Mandatory)
        .column_type(ColumnType::Metric);
    let columns = catalog.resolve_columns(None, &filter).unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].id, "BilledCost");

    let columns = catalog
        .resolve_columns(None, &ColumnFilter::new().search("INVOICE"))
        .unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].display_name, "Invoice ID");
}

#[test]
fn test_list_versions_sorted() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();
    assert_eq!(catalog.list_versions(), vec!["1.0", "1.1", "1.2", "1.3-preview"]);
}

#[test]
fn test_attributes_by_version() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.0")).unwrap();

    assert_eq!(catalog.resolve_attributes(None, None).unwrap().len(), 1);
    assert_eq!(catalog.resolve_attributes(Some("1.2"), Some("iso")).unwrap().len(), 1);

    let attribute = catalog.find_attribute("Currency Code Format", None).unwrap();
    assert_eq!(attribute.id, "currency_code_format");
    assert!(catalog.find_attribute("currency_code_format", Some("1.0")).is_err());
}

#[test]
fn test_templates_selected_by_membership() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.0")).unwrap();

    let ids = |version: Option<&str>| -> Vec<String> {
        catalog
            .list_templates(version)
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect()
    };

    assert_eq!(ids(None), vec!["cost_by_service"]);
    assert_eq!(ids(Some("1.1")), vec!["cost_by_service", "commitment_usage"]);
    assert_eq!(
        ids(Some("1.2")),
        vec!["cost_by_service", "commitment_usage", "invoice_totals"]
    );
    // Declared nowhere, so nothing is selected even though 1.3 > 1.2
    assert!(ids(Some("1.3")).is_empty());
}

// ============================================================================
// Template resolution
// ============================================================================

#[test]
fn test_hyphen_underscore_resolution() {
    let sources = [
        "foo_bar:\n  focus_versions: ['1.0']\n  sql: SELECT 1\n",
        "foo-bar:\n  focus_versions: ['1.0']\n  sql: SELECT 1\n",
        "other:\n  slug: foo_bar\n  focus_versions: ['1.0']\n  sql: SELECT 1\n",
        "other:\n  slug: foo-bar\n  focus_versions: ['1.0']\n  sql: SELECT 1\n",
    ];

    for source in sources {
        let catalog = FocusCatalog::new(
            "1.0",
            SpecRegistry::new(),
            TemplateRegistry::from_sources(Some(source), None),
        )
        .unwrap();
        assert!(
            catalog.resolve_template("foo-bar", None).is_ok(),
            "foo-bar not resolved from {:?}",
            source
        );
        assert!(catalog.resolve_template("foo_bar", None).is_ok());
    }
}

#[test]
fn test_mixed_separator_resolution() {
    let sources = [
        "foo-bar-baz:\n  focus_versions: ['1.0']\n  sql: SELECT 1\n",
        "foo_bar_baz:\n  focus_versions: ['1.0']\n  sql: SELECT 1\n",
        "other:\n  slug: foo_bar-baz\n  focus_versions: ['1.0']\n  sql: SELECT 1\n",
    ];

    for source in sources {
        let catalog = FocusCatalog::new(
            "1.0",
            SpecRegistry::new(),
            TemplateRegistry::from_sources(Some(source), None),
        )
        .unwrap();
        for identifier in ["foo-bar_baz", "foo_bar-baz", "foo-bar-baz", "foo_bar_baz"] {
            assert!(
                catalog.resolve_template(identifier, None).is_ok(),
                "{} not resolved from {:?}",
                identifier,
                source
            );
        }
    }
}

#[test]
fn test_resolve_by_slug() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();

    assert_eq!(catalog.resolve_template("services-cost", None).unwrap().id, "cost_by_service");
    assert_eq!(catalog.resolve_template("services_cost", None).unwrap().id, "cost_by_service");
    assert_eq!(catalog.resolve_template("commitment-usage", None).unwrap().id, "commitment_usage");
}

#[test]
fn test_unknown_template_suggestions() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();

    match catalog.resolve_template("invoice_total", None).unwrap_err() {
        CatalogError::NotFound { suggestions, .. } => {
            assert_eq!(suggestions.first().map(String::as_str), Some("invoice_totals"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    match catalog.resolve_template("zzz", None).unwrap_err() {
        CatalogError::NotFound { suggestions, .. } => assert!(suggestions.is_empty()),
        other => panic!("unexpected error: {:?}", other),
    }
}

// ============================================================================
// Preparation
// ============================================================================

#[test]
fn test_prepare_execution() {
    let resources = Resources::standard();
    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();
    let template = catalog.resolve_template("cost_by_service", None).unwrap();
    assert_eq!(template.parameter_count(), 2);

    let params = RawParameters::from(vec![json!("2025-01-01"), json!("2025-02-01")]);
    let prepared = catalog.prepare_execution(template, Some(params), Some(25)).unwrap();
    assert!(prepared.body.ends_with("GROUP BY ServiceName LIMIT 25"));
    assert_eq!(prepared.bound_parameters, vec![json!("2025-01-01"), json!("2025-02-01")]);

    let err = catalog
        .prepare_execution(template, RawParameters::from_json(json!({"1": "2025-01-01"})), None)
        .unwrap_err();
    assert_eq!(err, CatalogError::Binding(BindingError::MissingParameterKey { index: 2 }));

    let err = catalog.prepare_execution(template, None, None).unwrap_err();
    assert_eq!(err, CatalogError::Binding(BindingError::MissingParameters { required: 2 }));
}

// ============================================================================
// Legacy SQL directory
// ============================================================================

#[test]
fn test_legacy_sql_directory_fallback() {
    let resources = Resources::empty();
    resources
        .write(
            "queries/queries_v1_0/cost_by_region.sql",
            "-- Cost by Region\n-- Source: https://focus.finops.org/use-case/cost-by-region\nSELECT RegionId, SUM(BilledCost)\nFROM focus_data\nWHERE ChargePeriodStart >= ?\nGROUP BY RegionId\n",
        )
        .write("queries/queries_v1_0/comments_only.sql", "-- Placeholder\n-- nothing yet\n");

    let catalog = FocusCatalog::load(&resources.config("1.0")).unwrap();
    let summaries = catalog.list_templates(None).unwrap();
    assert_eq!(summaries.len(), 1);

    let template = catalog.resolve_template("cost-by-region", None).unwrap();
    assert_eq!(template.name, "Cost by Region");
    assert_eq!(template.description, SQL_FILE_DESCRIPTION);
    assert_eq!(template.citation, "https://focus.finops.org/use-case/cost-by-region");
    assert_eq!(template.parameter_count(), 1);
    assert!(template.is_compatible_with("1.0"));
}

#[test]
fn test_yaml_preferred_over_sql_directory() {
    let resources = Resources::standard();
    resources.write("queries/queries_v1_2/only_in_sql.sql", "-- Only SQL\nSELECT 1\n");

    let catalog = FocusCatalog::load(&resources.config("1.2")).unwrap();
    assert!(catalog.resolve_template("only_in_sql", None).is_err());
    assert!(catalog.resolve_template("cost_by_service", None).is_ok());
}

// ============================================================================
// Hot reload
// ============================================================================

#[test]
fn test_reload_publishes_new_snapshot() {
    let resources = Resources::standard();
    let handle = CatalogHandle::new(FocusCatalog::load(&resources.config("1.2")).unwrap());
    let before = handle.snapshot();

    resources
        .write(
            "queries/focus_queries.yaml",
            "tag_coverage:\n  name: Tag Coverage\n  focus_versions: ['1.2']\n  sql: SELECT Tags FROM focus_data\n",
        )
        .remove("queries/overrides.yaml");
    handle.reload(&resources.config("1.2")).unwrap();

    let after = handle.snapshot();
    assert!(after.resolve_template("tag_coverage", None).is_ok());
    assert!(after.resolve_template("cost_by_service", None).is_err());
    assert!(after.templates().warnings().is_empty());

    // Readers holding the old snapshot are unaffected
    assert!(before.resolve_template("cost_by_service", None).is_ok());
}

#[test]
fn test_reload_with_invalid_version_keeps_snapshot() {
    let resources = Resources::standard();
    let handle = CatalogHandle::new(FocusCatalog::load(&resources.config("1.2")).unwrap());

    let err = handle.reload(&resources.config("one.two")).unwrap_err();
    assert!(matches!(err, CatalogError::InvalidVersion(_)));
    assert_eq!(handle.snapshot().configured_version(), "1.2");
}
