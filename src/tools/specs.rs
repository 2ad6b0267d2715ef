//! Tool descriptions advertised to callers

use serde::Serialize;

/// Name, description and parameters of one tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ToolParameter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolParameter {
    pub name: &'static str,
    pub description: &'static str,
    pub param_type: &'static str,
    pub required: bool,
}

fn param(
    name: &'static str,
    description: &'static str,
    param_type: &'static str,
    required: bool,
) -> ToolParameter {
    ToolParameter {
        name,
        description,
        param_type,
        required,
    }
}

fn version_param() -> ToolParameter {
    param(
        "version",
        "FOCUS version, e.g. '1.2' (defaults to the configured version)",
        "string",
        false,
    )
}

/// Every tool [`super::dispatch_tool`] understands
pub fn all_tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "list_use_cases",
            description: "List available predefined FOCUS queries. Use get_use_case(id) to see details before preparing one.",
            parameters: vec![version_param()],
        },
        ToolSpec {
            name: "get_use_case",
            description: "Get detailed information about a specific FOCUS query including SQL and parameter requirements.",
            parameters: vec![
                param("use_case_id", "Use case ID to get details for", "string", true),
                version_param(),
            ],
        },
        ToolSpec {
            name: "prepare_query",
            description: "Prepare custom SQL or a predefined use case for execution against FOCUS data. For use cases, call get_use_case first to see parameter requirements.",
            parameters: vec![
                param("query", "SQL query to prepare", "string", false),
                param(
                    "use_case",
                    "Predefined use case ID (call get_use_case first to see parameters)",
                    "string",
                    false,
                ),
                param(
                    "parameters",
                    "Parameters for the query (prefer list format: ['2025-01-01', '2025-02-01'])",
                    "array",
                    false,
                ),
                param("limit", "Max rows to return (default 100)", "integer", false),
                version_param(),
            ],
        },
        ToolSpec {
            name: "get_focus_columns",
            description: "List FOCUS column definitions available in a specification version.",
            parameters: vec![
                version_param(),
                param(
                    "feature_level",
                    "Mandatory, Conditional, Optional or Recommended",
                    "string",
                    false,
                ),
                param("column_type", "Dimension or Metric", "string", false),
                param("search", "Substring matched against id, name and description", "string", false),
            ],
        },
        ToolSpec {
            name: "get_focus_attributes",
            description: "List FOCUS attribute definitions available in a specification version.",
            parameters: vec![
                version_param(),
                param("search", "Substring matched against id, name and description", "string", false),
            ],
        },
        ToolSpec {
            name: "find_focus_column",
            description: "Look up one FOCUS column by id or display name.",
            parameters: vec![
                param("column_id", "Column id or display name", "string", true),
                version_param(),
            ],
        },
        ToolSpec {
            name: "find_focus_attribute",
            description: "Look up one FOCUS attribute by id or name.",
            parameters: vec![
                param("attribute_id", "Attribute id or name", "string", true),
                version_param(),
            ],
        },
        ToolSpec {
            name: "get_focus_versions",
            description: "List the FOCUS specification versions known to the catalog.",
            parameters: vec![],
        },
        ToolSpec {
            name: "get_server_info",
            description: "Describe the configured version, data location and loaded catalog.",
            parameters: vec![],
        },
    ]
}
