//! Template Registry
//!
//! Loads query templates from the unified YAML file (or a legacy SQL
//! directory), merges overrides, and serves lookups by identifier or slug.
//! A registry is immutable once built; [`TemplateRegistry::select_for_version`]
//! produces a new, filtered registry rather than narrowing in place.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::{debug, info, warn};

use super::definition::{RawTemplate, Template, TemplateOverride, TemplateSummary};
use super::sql_dir;
use crate::error::LoadWarning;
use crate::source;

pub const TEMPLATES_FILE: &str = "focus_queries.yaml";
pub const OVERRIDES_FILE: &str = "overrides.yaml";

/// Registry of query templates keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    /// Templates in source order
    templates: Vec<Arc<Template>>,

    /// Identifier → index into `templates`
    by_id: HashMap<String, usize>,

    /// Slug → index into `templates`
    by_slug: HashMap<String, usize>,

    /// Canonical identifier → index, first claimant wins
    by_canonical_id: HashMap<String, usize>,

    /// Canonical slug → index, first claimant wins
    by_canonical_slug: HashMap<String, usize>,

    /// Overrides that were applied, kept for their audit reason
    applied_overrides: HashMap<String, TemplateOverride>,

    /// Problems found while loading
    warnings: Vec<LoadWarning>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load templates for a queries directory
    ///
    /// Prefers `focus_queries.yaml` (+ `overrides.yaml`). Falls back to the
    /// legacy `queries_v<version>/*.sql` directory when the YAML file is
    /// absent.
    pub fn load_from_dir(queries_dir: impl AsRef<Path>, version: &str) -> Self {
        let queries_dir = queries_dir.as_ref();
        let templates_path = queries_dir.join(TEMPLATES_FILE);
        let legacy_dir = queries_dir.join(sql_dir::version_dir_name(version));

        if !templates_path.exists() && legacy_dir.is_dir() {
            info!("Loading legacy SQL templates from {}", legacy_dir.display());
            return Self::from_sql_dir(&legacy_dir, version);
        }

        let overrides_path = queries_dir.join(OVERRIDES_FILE);
        Self::load(templates_path, Some(overrides_path.as_path()))
    }

    /// Load the template source and an optional overrides source
    ///
    /// A missing template source gives an empty registry with a warning. A
    /// missing overrides source means no overrides.
    pub fn load(templates_path: impl AsRef<Path>, overrides_path: Option<&Path>) -> Self {
        let templates_path = templates_path.as_ref();
        let mut warnings = Vec::new();

        let entries = source::read_or_warn(templates_path, &mut warnings)
            .map(|content| {
                parse_mapping::<RawTemplate>(
                    &templates_path.display().to_string(),
                    &content,
                    &mut warnings,
                )
            })
            .unwrap_or_default();

        let overrides = match overrides_path {
            Some(path) => load_overrides(path, &mut warnings),
            None => HashMap::new(),
        };

        let registry = Self::build(entries, overrides, warnings);

        info!(
            "TemplateRegistry loaded: {} templates from {}, {} overrides applied",
            registry.templates.len(),
            templates_path.display(),
            registry.applied_overrides.len()
        );

        registry
    }

    /// Build from in-memory YAML; `None` templates behaves like a missing file
    pub fn from_sources(templates: Option<&str>, overrides: Option<&str>) -> Self {
        let mut warnings = Vec::new();

        let entries = match templates {
            Some(content) => parse_mapping::<RawTemplate>("templates", content, &mut warnings),
            None => {
                warnings.push(LoadWarning::source("templates", "source not found"));
                Vec::new()
            }
        };

        let overrides = overrides
            .map(|content| parse_mapping::<TemplateOverride>("overrides", content, &mut warnings))
            .unwrap_or_default()
            .into_iter()
            .collect();

        Self::build(entries, overrides, warnings)
    }

    /// Load a legacy directory of `.sql` files for one version
    pub fn from_sql_dir(dir: impl AsRef<Path>, version: &str) -> Self {
        let mut warnings = Vec::new();
        let entries = sql_dir::load_sql_dir(dir.as_ref(), version, &mut warnings);
        Self::build(entries, HashMap::new(), warnings)
    }

    fn build(
        entries: Vec<(String, RawTemplate)>,
        mut overrides: HashMap<String, TemplateOverride>,
        warnings: Vec<LoadWarning>,
    ) -> Self {
        let mut registry = Self {
            warnings,
            ..Self::default()
        };

        for (id, raw) in entries {
            let patch = overrides.remove(&id);
            let merged = match &patch {
                Some(patch) => {
                    debug!("Applying override to {}", id);
                    patch.apply(&raw)
                }
                None => raw,
            };

            match Template::from_raw(&id, merged) {
                Ok(template) => {
                    if registry.register(template) {
                        if let Some(patch) = patch {
                            registry.applied_overrides.insert(id, patch);
                        }
                    }
                }
                Err(e) => {
                    warn!("Skipping template {}: {}", id, e);
                    registry
                        .warnings
                        .push(LoadWarning::entry("templates", id, e.to_string()));
                }
            }
        }

        let mut orphans: Vec<String> = overrides.into_keys().collect();
        orphans.sort();
        for id in orphans {
            warn!("Override for unknown template {} ignored", id);
            registry.warnings.push(LoadWarning::entry(
                "overrides",
                id,
                "no template with this identifier",
            ));
        }

        registry
    }

    /// Add a template; returns false when the identifier is already taken
    fn register(&mut self, template: Template) -> bool {
        self.insert(Arc::new(template))
    }

    fn insert(&mut self, template: Arc<Template>) -> bool {
        if self.by_id.contains_key(&template.id) {
            warn!("Duplicate template identifier {} ignored", template.id);
            self.warnings.push(LoadWarning::entry(
                "templates",
                template.id.clone(),
                "duplicate identifier",
            ));
            return false;
        }

        // First template to claim a slug keeps it
        if let Some(&existing) = self.by_slug.get(&template.slug) {
            warn!(
                "Slug {} of {} already used by {}",
                template.slug, template.id, self.templates[existing].id
            );
            self.warnings.push(LoadWarning::entry(
                "templates",
                template.id.clone(),
                format!("slug '{}' already in use", template.slug),
            ));
        }

        self.index(template);
        true
    }

    /// Append and index a template without reporting conflicts
    ///
    /// Every map keeps its first claimant.
    fn index(&mut self, template: Arc<Template>) {
        let index = self.templates.len();

        self.by_id.entry(template.id.clone()).or_insert(index);
        self.by_slug.entry(template.slug.clone()).or_insert(index);
        self.by_canonical_id
            .entry(canonical_identifier(&template.id))
            .or_insert(index);
        self.by_canonical_slug
            .entry(canonical_identifier(&template.slug))
            .or_insert(index);

        self.templates.push(template);
    }

    /// Templates whose declared versions contain `version` exactly
    ///
    /// This is set membership, not ordering: a template declared for `1.0`
    /// only is invisible at `1.1`.
    pub fn select_for_version(&self, version: &str) -> Self {
        let mut selected = Self::default();

        for template in self.templates.iter().filter(|t| t.is_compatible_with(version)) {
            selected.index(Arc::clone(template));
            if let Some(patch) = self.applied_overrides.get(&template.id) {
                selected
                    .applied_overrides
                    .insert(template.id.clone(), patch.clone());
            }
        }

        debug!(
            "Selected {} of {} templates for version {}",
            selected.len(),
            self.len(),
            version
        );

        // Conflicts were already reported when the source was loaded
        selected.warnings = self.warnings.clone();
        selected
    }

    /// Exact identifier lookup
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.by_id.get(id).map(|&i| self.templates[i].as_ref())
    }

    /// Identifier lookup treating `-` and `_` as the same character
    pub fn get_canonical(&self, id: &str) -> Option<&Template> {
        self.by_canonical_id
            .get(&canonical_identifier(id))
            .map(|&i| self.templates[i].as_ref())
    }

    /// Slug lookup, exact first, then with `-` and `_` treated as equal
    pub fn get_by_slug(&self, slug: &str) -> Option<&Template> {
        self.by_slug
            .get(slug)
            .or_else(|| self.by_canonical_slug.get(&canonical_identifier(slug)))
            .map(|&i| self.templates[i].as_ref())
    }

    /// Summaries in registry order
    pub fn list(&self) -> Vec<TemplateSummary> {
        self.templates.iter().map(|t| t.summary()).collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.id.as_str())
    }

    /// Every version any template declares
    pub fn declared_versions(&self) -> BTreeSet<&str> {
        self.templates
            .iter()
            .flat_map(|t| t.compatible_versions.iter().map(String::as_str))
            .collect()
    }

    /// The override applied to a template, if any
    pub fn override_for(&self, id: &str) -> Option<&TemplateOverride> {
        self.applied_overrides.get(id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Problems recorded while loading
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}

/// Separator-insensitive form of an identifier: every `-` becomes `_`
pub fn canonical_identifier(identifier: &str) -> String {
    identifier.replace('-', "_")
}

fn load_overrides(path: &Path, warnings: &mut Vec<LoadWarning>) -> HashMap<String, TemplateOverride> {
    match source::read_optional(path) {
        Ok(Some(content)) => {
            parse_mapping::<TemplateOverride>(&path.display().to_string(), &content, warnings)
                .into_iter()
                .collect()
        }
        Ok(None) => {
            debug!("No overrides at {}", path.display());
            HashMap::new()
        }
        Err(e) => {
            warn!("{:#}", e);
            warnings.push(LoadWarning::source(path.display().to_string(), format!("{:#}", e)));
            HashMap::new()
        }
    }
}

/// Parse a YAML mapping of identifier → entry, skipping entries that do not
/// parse
fn parse_mapping<T: DeserializeOwned>(
    label: &str,
    content: &str,
    warnings: &mut Vec<LoadWarning>,
) -> Vec<(String, T)> {
    let mapping = match source::parse_yaml(label, content, warnings) {
        Some(Value::Mapping(mapping)) => mapping,
        Some(Value::Null) => return Vec::new(),
        Some(_) => {
            warn!("{}: expected a mapping of identifier to definition", label);
            warnings.push(LoadWarning::source(
                label,
                "expected a mapping of identifier to definition",
            ));
            return Vec::new();
        }
        None => return Vec::new(),
    };

    let mut entries = Vec::with_capacity(mapping.len());

    for (key, value) in mapping {
        let Some(id) = key.as_str().map(str::to_string) else {
            warn!("{}: skipping entry with non-string key {:?}", label, key);
            warnings.push(LoadWarning::source(label, format!("non-string key {:?}", key)));
            continue;
        };

        match serde_yaml::from_value::<T>(value) {
            Ok(entry) => entries.push((id, entry)),
            Err(e) => {
                warn!("{}: skipping {}: {}", label, id, e);
                warnings.push(LoadWarning::entry(label, id, e.to_string()));
            }
        }
    }

    entries
}
