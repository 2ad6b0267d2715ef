//! Legacy per-version SQL directories
//!
//! Before the unified YAML file, each FOCUS version had its own directory of
//! `.sql` files (`queries_v1_0/`, `queries_v1_2/`, ...). Metadata lives in the
//! leading comment lines:
//!
//! ```sql
//! -- Cost by Service
//! -- Effective cost per service for a billing period
//! -- Source: https://focus.finops.org/use-cases/...
//! SELECT ...
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::definition::RawTemplate;
use crate::error::LoadWarning;

const COMMENT_PREFIX: &str = "--";
const SOURCE_MARKER: &str = "Source:";

/// Description given to every template loaded from a SQL file
pub const SQL_FILE_DESCRIPTION: &str = "Query from focus.finops.org";

/// Directory name for a version, `1.0` → `queries_v1_0`
pub fn version_dir_name(version: &str) -> String {
    format!("queries_v{}", version.replace('.', "_"))
}

/// Parse one SQL file; `None` when it holds nothing but comments
pub fn parse_sql_file(stem: &str, content: &str, version: &str) -> Option<RawTemplate> {
    let lines: Vec<&str> = content.lines().collect();

    let name = lines
        .first()
        .and_then(|line| line.strip_prefix(COMMENT_PREFIX))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .unwrap_or_else(|| stem.to_string());

    let citation = lines
        .iter()
        .find(|line| line.contains(SOURCE_MARKER))
        .map(|line| line.replace("-- Source: ", "").trim().to_string())
        .unwrap_or_default();

    let sql = lines
        .iter()
        .filter(|line| !line.starts_with(COMMENT_PREFIX))
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    if sql.is_empty() {
        return None;
    }

    Some(RawTemplate {
        name: Some(name),
        description: Some(SQL_FILE_DESCRIPTION.to_string()),
        sql: Some(sql),
        focus_versions: Some(vec![version.to_string()]),
        citation: Some(citation),
        slug: None,
    })
}

/// Load every `.sql` file in `dir`, in sorted path order
pub(crate) fn load_sql_dir(
    dir: &Path,
    version: &str,
    warnings: &mut Vec<LoadWarning>,
) -> Vec<(String, RawTemplate)> {
    let files = match find_sql_files(dir) {
        Ok(files) => files,
        Err(e) => {
            warn!("{:#}", e);
            warnings.push(LoadWarning::source(dir.display().to_string(), format!("{:#}", e)));
            return Vec::new();
        }
    };

    let mut entries = Vec::with_capacity(files.len());

    for path in files {
        let label = path.display().to_string();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Error parsing {}: {}", label, e);
                warnings.push(LoadWarning::source(label, e.to_string()));
                continue;
            }
        };

        match parse_sql_file(stem, &content, version) {
            Some(raw) => {
                debug!("Loaded SQL template {} from {}", stem, label);
                entries.push((stem.to_string(), raw));
            }
            None => debug!("Skipping {}: no SQL after comments", label),
        }
    }

    entries
}

fn find_sql_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read queries directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }

    // Sort for deterministic loading order
    files.sort();
    Ok(files)
}
