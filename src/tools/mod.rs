//! Tool surface over the resolution facade
//!
//! Each tool takes a JSON argument object and answers with a [`ToolResponse`],
//! serialized as `{"result": ...}` on success or `{"error": "..."}` on
//! failure. Tools never execute SQL: `prepare_query` returns the final body
//! and bound values for whatever executor sits behind the caller.
//!
//! | Tool                   | Arguments                                         |
//! |------------------------|---------------------------------------------------|
//! | `list_use_cases`       | `version?`                                        |
//! | `get_use_case`         | `use_case_id`, `version?`                         |
//! | `prepare_query`        | `query?`, `use_case?`, `parameters?`, `limit?`    |
//! | `get_focus_columns`    | `version?`, `feature_level?`, `column_type?`, `search?` |
//! | `get_focus_attributes` | `version?`, `search?`                             |
//! | `find_focus_column`    | `column_id`, `version?`                           |
//! | `find_focus_attribute` | `attribute_id`, `version?`                        |
//! | `get_focus_versions`   |                                                   |
//! | `get_server_info`      |                                                   |

mod handlers;
mod specs;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub use handlers::DEFAULT_RESULT_LIMIT;
pub use specs::{all_tool_specs, ToolParameter, ToolSpec};

use crate::catalog::FocusCatalog;
use crate::config::CatalogConfig;

/// Everything a tool handler may read
pub struct ToolContext<'a> {
    pub catalog: &'a FocusCatalog,
    pub config: &'a CatalogConfig,
}

/// Response envelope returned by every tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResponse {
    Result(Value),
    Error(String),
}

impl ToolResponse {
    pub fn ok(result: Value) -> Self {
        Self::Result(result)
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Result(result) => serde_json::json!({ "result": result }),
            Self::Error(message) => serde_json::json!({ "error": message }),
        }
    }
}

/// Route a tool call to its handler
pub fn dispatch_tool(ctx: &ToolContext<'_>, tool_name: &str, args: &Value) -> ToolResponse {
    debug!("Tool call: {} {}", tool_name, args);

    match tool_name {
        // Use cases
        "list_use_cases" => handlers::list_use_cases(ctx, args),
        "get_use_case" => handlers::get_use_case(ctx, args),
        "prepare_query" => handlers::prepare_query(ctx, args),

        // Specification metadata
        "get_focus_columns" => handlers::get_focus_columns(ctx, args),
        "get_focus_attributes" => handlers::get_focus_attributes(ctx, args),
        "find_focus_column" => handlers::find_focus_column(ctx, args),
        "find_focus_attribute" => handlers::find_focus_attribute(ctx, args),
        "get_focus_versions" => handlers::get_focus_versions(ctx),

        "get_server_info" => handlers::get_server_info(ctx),

        _ => ToolResponse::err(format!("Unknown tool: {}", tool_name)),
    }
}
