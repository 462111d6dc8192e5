use serde_json::Value;
use std::collections::BTreeSet;

/// One attribute of an entity type.
///
/// Aliases and tags declared directly on the field are kept here; the
/// owning [`Entity`](crate::Entity) combines them with its own
/// `field_aliases` / `field_tags` declarations into the effective index.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    name: String,
    /// Opaque data type reported by the service (`text`, `entity`, ...).
    pub data_type: Option<String>,
    /// Entity types allowed for `entity` and `multi_entity` fields.
    pub allowed_entity_types: BTreeSet<String>,
    /// Set for `checkbox`, `list` and `status_list` fields.
    pub default_value: Option<Value>,
    /// Allowed values for `list` and `status_list` fields.
    pub valid_values: Vec<Value>,
    pub(crate) aliases: BTreeSet<String>,
    pub(crate) tags: BTreeSet<String>,
}

impl Field {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
            allowed_entity_types: BTreeSet::new(),
            default_value: None,
            valid_values: Vec::new(),
            aliases: BTreeSet::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases declared on the field itself.
    pub fn local_aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// Tags declared on the field itself.
    pub fn local_tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Whether this field links to other entities.
    pub fn is_relationship(&self) -> bool {
        matches!(self.data_type.as_deref(), Some("entity" | "multi_entity"))
    }

    /// Appends valid values that are not already present.
    pub fn extend_valid_values(&mut self, values: impl IntoIterator<Item = Value>) {
        for value in values {
            if !self.valid_values.contains(&value) {
                self.valid_values.push(value);
            }
        }
    }
}
