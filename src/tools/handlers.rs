//! Tool handler implementations

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{ToolContext, ToolResponse};
use crate::binder::RawParameters;
use crate::catalog::apply_limit;
use crate::error::{BindingError, CatalogError};
use crate::spec::{ColumnFilter, ColumnType, FeatureLevel};

/// Row limit applied by `prepare_query` when the caller does not pass one
pub const DEFAULT_RESULT_LIMIT: u32 = 100;

const CUSTOM_QUERY_NAME: &str = "Custom Query";

fn default_limit() -> Option<u32> {
    Some(DEFAULT_RESULT_LIMIT)
}

// ── Arguments ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct VersionArgs {
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UseCaseArgs {
    #[serde(alias = "id")]
    use_case_id: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PrepareQueryArgs {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    use_case: Option<String>,
    /// `null` when absent
    #[serde(default)]
    parameters: Value,
    /// Absent means the default; explicit `null` means no limit
    #[serde(default = "default_limit")]
    limit: Option<u32>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ColumnsArgs {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    feature_level: Option<String>,
    #[serde(default)]
    column_type: Option<String>,
    #[serde(default)]
    search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AttributesArgs {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    search: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FindColumnArgs {
    #[serde(alias = "id")]
    column_id: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FindAttributeArgs {
    #[serde(alias = "id")]
    attribute_id: String,
    #[serde(default)]
    version: Option<String>,
}

fn parse_args<T: DeserializeOwned>(args: &Value) -> Result<T, ToolResponse> {
    let args = if args.is_null() { json!({}) } else { args.clone() };
    serde_json::from_value(args).map_err(|e| ToolResponse::err(format!("Invalid arguments: {}", e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// "Did you mean" hint for lookups that carry suggestions
fn suggestion_hint(err: &CatalogError) -> Option<String> {
    match err {
        CatalogError::NotFound { suggestions, .. } if !suggestions.is_empty() => {
            Some(format!("Did you mean: {}?", suggestions.join(", ")))
        }
        _ => None,
    }
}

fn binding_guidance(err: &BindingError, use_case: &str) -> String {
    match err {
        BindingError::UnsupportedParameterShape => {
            format!("{}. Use 'get_use_case' to see parameter requirements.", err)
        }
        _ => format!(
            "{}. Use 'get_use_case' with id '{}' to see parameter requirements.",
            err, use_case
        ),
    }
}

// ── Use Cases ─────────────────────────────────────────────────

pub(super) fn list_use_cases(ctx: &ToolContext<'_>, args: &Value) -> ToolResponse {
    let args: VersionArgs = match parse_args(args) {
        Ok(a) => a,
        Err(response) => return response,
    };

    match ctx.catalog.list_templates(args.version.as_deref()) {
        Ok(summaries) => {
            let use_cases: Vec<Value> = summaries
                .iter()
                .map(|s| json!({ "id": s.id, "name": s.name, "description": s.description }))
                .collect();
            ToolResponse::ok(json!({ "total": use_cases.len(), "use_cases": use_cases }))
        }
        Err(e) => ToolResponse::err(e.to_string()),
    }
}

pub(super) fn get_use_case(ctx: &ToolContext<'_>, args: &Value) -> ToolResponse {
    let args: UseCaseArgs = match parse_args(args) {
        Ok(a) => a,
        Err(response) => return response,
    };

    match ctx.catalog.resolve_template(&args.use_case_id, args.version.as_deref()) {
        Ok(template) => {
            let citation = (!template.citation.is_empty()).then_some(&template.citation);
            ToolResponse::ok(json!({
                "id": template.id,
                "name": template.name,
                "description": template.description,
                "sql": template.body,
                "parameter_count": template.parameter_count(),
                "citation": citation,
            }))
        }
        Err(e) => match suggestion_hint(&e) {
            Some(hint) => ToolResponse::err(format!("{}. {}", e, hint)),
            None => ToolResponse::err(e.to_string()),
        },
    }
}

pub(super) fn prepare_query(ctx: &ToolContext<'_>, args: &Value) -> ToolResponse {
    let args: PrepareQueryArgs = match parse_args(args) {
        Ok(a) => a,
        Err(response) => return response,
    };

    match (non_empty(args.query), non_empty(args.use_case)) {
        (None, None) => ToolResponse::err(
            "Must provide either 'query' (SQL) or 'use_case' (predefined query ID)",
        ),
        (Some(_), Some(_)) => ToolResponse::err("Provide either 'query' or 'use_case', not both"),
        (Some(sql), None) => {
            let (sql, limit_applied) = apply_limit(&sql, args.limit);
            ToolResponse::ok(json!({
                "query_name": CUSTOM_QUERY_NAME,
                "sql": sql,
                "parameters": [],
                "limit_applied": limit_applied,
            }))
        }
        (None, Some(use_case)) => {
            let template = match ctx.catalog.resolve_template(&use_case, args.version.as_deref()) {
                Ok(t) => t,
                Err(e) => {
                    let mut message = format!("{}. Use 'list_use_cases' to see available queries.", e);
                    if let Some(hint) = suggestion_hint(&e) {
                        message.push(' ');
                        message.push_str(&hint);
                    }
                    return ToolResponse::err(message);
                }
            };

            let raw = RawParameters::from_json(args.parameters);
            match ctx.catalog.prepare_execution(template, raw, args.limit) {
                Ok(prepared) => {
                    let mut response = json!({
                        "query_name": template.name,
                        "sql": prepared.body,
                        "parameters": prepared.bound_parameters,
                        "limit_applied": prepared.applied_limit_clause,
                    });
                    if !template.description.is_empty() {
                        response["description"] = json!(template.description);
                    }
                    ToolResponse::ok(response)
                }
                Err(CatalogError::Binding(e)) => ToolResponse::err(binding_guidance(&e, &use_case)),
                Err(e) => ToolResponse::err(e.to_string()),
            }
        }
    }
}

// ── Specification Metadata ────────────────────────────────────

/// `None` when a filter names a level or type that does not exist
fn column_filter(args: &ColumnsArgs) -> Option<ColumnFilter> {
    let mut filter = ColumnFilter::new();

    if let Some(level) = non_empty(args.feature_level.clone()) {
        filter = filter.feature_level(level.parse::<FeatureLevel>().ok()?);
    }
    if let Some(kind) = non_empty(args.column_type.clone()) {
        filter = filter.column_type(kind.parse::<ColumnType>().ok()?);
    }
    if let Some(search) = non_empty(args.search.clone()) {
        filter = filter.search(search);
    }

    Some(filter)
}

pub(super) fn get_focus_columns(ctx: &ToolContext<'_>, args: &Value) -> ToolResponse {
    let args: ColumnsArgs = match parse_args(args) {
        Ok(a) => a,
        Err(response) => return response,
    };

    let version = match ctx.catalog.resolve_version(args.version.as_deref()) {
        Ok(v) => v,
        Err(e) => return ToolResponse::err(e.to_string()),
    };

    let columns = match column_filter(&args) {
        Some(filter) => ctx.catalog.specs().get_columns(Some(&version), &filter),
        None => {
            debug!("Unknown column filter value, nothing matches: {:?}", args);
            Vec::new()
        }
    };

    ToolResponse::ok(json!({
        "version": version.as_str(),
        "total": columns.len(),
        "columns": columns,
    }))
}

pub(super) fn get_focus_attributes(ctx: &ToolContext<'_>, args: &Value) -> ToolResponse {
    let args: AttributesArgs = match parse_args(args) {
        Ok(a) => a,
        Err(response) => return response,
    };

    let version = match ctx.catalog.resolve_version(args.version.as_deref()) {
        Ok(v) => v,
        Err(e) => return ToolResponse::err(e.to_string()),
    };

    match ctx.catalog.resolve_attributes(Some(version.as_str()), args.search.as_deref()) {
        Ok(attributes) => ToolResponse::ok(json!({
            "version": version.as_str(),
            "total": attributes.len(),
            "attributes": attributes,
        })),
        Err(e) => ToolResponse::err(e.to_string()),
    }
}

pub(super) fn find_focus_column(ctx: &ToolContext<'_>, args: &Value) -> ToolResponse {
    let args: FindColumnArgs = match parse_args(args) {
        Ok(a) => a,
        Err(response) => return response,
    };

    match ctx.catalog.find_column(&args.column_id, args.version.as_deref()) {
        Ok(column) => ToolResponse::ok(json!(column)),
        Err(e) => ToolResponse::err(e.to_string()),
    }
}

pub(super) fn find_focus_attribute(ctx: &ToolContext<'_>, args: &Value) -> ToolResponse {
    let args: FindAttributeArgs = match parse_args(args) {
        Ok(a) => a,
        Err(response) => return response,
    };

    match ctx.catalog.find_attribute(&args.attribute_id, args.version.as_deref()) {
        Ok(attribute) => ToolResponse::ok(json!(attribute)),
        Err(e) => ToolResponse::err(e.to_string()),
    }
}

pub(super) fn get_focus_versions(ctx: &ToolContext<'_>) -> ToolResponse {
    ToolResponse::ok(json!({
        "configured_version": ctx.catalog.configured_version(),
        "versions": ctx.catalog.list_versions(),
        "template_versions": ctx.catalog.templates().declared_versions(),
    }))
}

pub(super) fn get_server_info(ctx: &ToolContext<'_>) -> ToolResponse {
    let catalog = ctx.catalog;
    let use_case_count = catalog.list_templates(None).map_or(0, |t| t.len());
    let warnings: Vec<String> = catalog.warnings().map(ToString::to_string).collect();

    ToolResponse::ok(json!({
        "focus_version": catalog.configured_version(),
        "resources_dir": ctx.config.resources_dir.display().to_string(),
        "data_source": ctx.config.data_location,
        "aws_region": ctx.config.aws_region,
        "use_case_count": use_case_count,
        "column_count": catalog.specs().column_count(),
        "attribute_count": catalog.specs().attribute_count(),
        "warnings": warnings,
    }))
}
