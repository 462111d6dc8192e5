//! Schema-wide configuration and per-call resolution flags.

use crate::error::SchemaResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Naming conventions of the backing service, shared by every resolution
/// performed against one [`Schema`](crate::Schema).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Prefix the service puts on custom fields (e.g. `sg_version`).
    /// Tried as a fallback for bare field specs.
    #[serde(default = "default_field_prefix")]
    pub field_prefix: String,
    /// Alias granted to the identifier column of each entity during raw
    /// schema reduction.
    #[serde(default = "default_identifier_alias")]
    pub identifier_alias: String,
    /// Field specs present on every entity that always resolve verbatim.
    #[serde(default = "default_structural_fields")]
    pub structural_fields: Vec<String>,
    /// Accept override documents that list entity types at the top level
    /// instead of under `entities`.
    #[serde(default)]
    pub detect_direct_entities: bool,
}

fn default_field_prefix() -> String {
    "sg_".to_string()
}

fn default_identifier_alias() -> String {
    "shotgun:name".to_string()
}

fn default_structural_fields() -> Vec<String> {
    vec!["id".to_string(), "type".to_string()]
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            field_prefix: default_field_prefix(),
            identifier_alias: default_identifier_alias(),
            structural_fields: default_structural_fields(),
            detect_direct_entities: false,
        }
    }
}

impl SchemaConfig {
    pub fn with_field_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.field_prefix = prefix.into();
        self
    }

    pub fn with_identifier_alias(mut self, alias: impl Into<String>) -> Self {
        self.identifier_alias = alias.into();
        self
    }

    pub fn with_direct_entities(mut self, detect: bool) -> Self {
        self.detect_direct_entities = detect;
        self
    }

    /// Loads a config from a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        if crate::document::is_yaml_path(path) {
            Ok(serde_yaml::from_str(&text)?)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }

    pub(crate) fn is_structural(&self, spec: &str) -> bool {
        self.structural_fields.iter().any(|f| f == spec)
    }
}

/// Per-call resolution flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Try `<field_prefix><name>` for bare field specs.
    pub auto_prefix: bool,
    /// Let bare specs match aliases.
    pub implicit_aliases: bool,
    /// Fail on unresolvable bare specs instead of passing them through.
    pub strict: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            auto_prefix: true,
            implicit_aliases: true,
            strict: false,
        }
    }
}

impl ResolveOptions {
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn no_auto_prefix(mut self) -> Self {
        self.auto_prefix = false;
        self
    }

    pub fn no_implicit_aliases(mut self) -> Self {
        self.implicit_aliases = false;
        self
    }
}
