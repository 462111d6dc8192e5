//! Override documents: the JSON/YAML shape a schema is loaded from and
//! dumped to.
//!
//! ```yaml
//! entities:
//!   Task:
//!     fields:
//!       sg_status_list: {aliases: [status], tags: [core]}
//!     field_aliases: {parent: entity}
//!     field_tags: {core: [content, step]}
//!     aliases: [Todo]
//!     tags: [production]
//! entity_aliases: {Job: Task}
//! entity_tags: {production: [Shot]}
//! ```
//!
//! Loading only ever adds to a schema. Unknown keys at any level are
//! rejected.

use crate::entity::Entity;
use crate::error::{SchemaError, SchemaResult};
use crate::field::Field;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Top level of an override document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entities: BTreeMap<String, EntityDocument>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entity_aliases: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub entity_tags: BTreeMap<String, Vec<String>>,
}

/// One entity type in an override document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDocument {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldDocument>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_aliases: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub field_tags: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// One field in an override document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDocument {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_entity_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_values: Vec<Value>,
}

/// Merges `src` into `dst`: objects merge key by key, arrays concatenate,
/// anything else overwrites.
pub fn merge_update(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst), Value::Object(src)) => {
            for (key, value) in src {
                match dst.get_mut(&key) {
                    Some(existing) => merge_update(existing, value),
                    None => {
                        dst.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(dst), Value::Array(src)) => dst.extend(src),
        (dst, src) => *dst = src,
    }
}

pub(crate) fn is_yaml_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn is_document_path(path: &Path) -> bool {
    let hidden = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'));
    !hidden
        && (is_yaml_path(path)
            || path.extension().and_then(|e| e.to_str()) == Some("json"))
}

/// Reads a `.json`, `.yaml` or `.yml` file into a JSON value.
pub fn read_value(path: &Path) -> SchemaResult<Value> {
    let text = std::fs::read_to_string(path)?;
    if is_yaml_path(path) {
        Ok(serde_yaml::from_str(&text)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

fn first_is_upper(key: &str) -> bool {
    key.chars().next().is_some_and(char::is_uppercase)
}

impl Schema {
    /// Brings a raw document into the `entities`-wrapped shape.
    fn normalize_document(&self, value: &Value) -> SchemaResult<Value> {
        let Value::Object(map) = value else {
            return Err(SchemaError::OverrideDocument(
                "document must be a mapping".to_string(),
            ));
        };

        let direct: Vec<&String> = map.keys().filter(|k| first_is_upper(k)).collect();
        if direct.is_empty() {
            return Ok(value.clone());
        }
        if !self.config.detect_direct_entities {
            return Err(SchemaError::OverrideDocument(format!(
                "top-level key {:?} looks like an entity type; list entity types under \"entities\"",
                direct[0]
            )));
        }
        if direct.len() != map.len() {
            return Err(SchemaError::OverrideDocument(
                "mix of direct and indirect entity specifications".to_string(),
            ));
        }
        let mut wrapped = serde_json::Map::new();
        wrapped.insert("entities".to_string(), value.clone());
        Ok(Value::Object(wrapped))
    }

    /// Merges one override document into the schema.
    pub fn load(&mut self, value: &Value) -> SchemaResult<()> {
        let normalized = self.normalize_document(value)?;
        let document: SchemaDocument = serde_json::from_value(normalized)
            .map_err(|e| SchemaError::OverrideDocument(e.to_string()))?;
        self.load_document(document);
        Ok(())
    }

    /// Layers several documents, in order, and merges the result.
    pub fn load_layers<'a>(&mut self, layers: impl IntoIterator<Item = &'a Value>) -> SchemaResult<()> {
        let mut merged = Value::Object(serde_json::Map::new());
        for layer in layers {
            merge_update(&mut merged, self.normalize_document(layer)?);
        }
        self.load(&merged)
    }

    /// Merges an already-typed document into the schema.
    pub fn load_document(&mut self, document: SchemaDocument) {
        let entity_count = document.entities.len();
        for (name, entity_doc) in document.entities {
            self.ensure_entity(&name).merge_document(entity_doc);
        }
        self.declare_entity_aliases(document.entity_aliases);
        self.declare_entity_tags(document.entity_tags);
        self.reindex();
        debug!(entities = entity_count, "Merged schema document");
    }

    /// Loads a `.json`, `.yaml` or `.yml` override document.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> SchemaResult<()> {
        let path = path.as_ref();
        debug!("Loading schema document {:?}", path);
        let value = read_value(path)?;
        self.load(&value)
    }

    /// Loads every visible `.json`/`.yaml`/`.yml` file in `dir`, in file
    /// name order, as layers of one document.
    pub fn load_directory(&mut self, dir: impl AsRef<Path>) -> SchemaResult<()> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_document_path(&path) {
                paths.push(path);
            } else {
                warn!("Skipping {:?}: not a schema document", path);
            }
        }
        paths.sort();

        let mut layers = Vec::with_capacity(paths.len());
        for path in &paths {
            layers.push(read_value(path)?);
        }
        self.load_layers(&layers)?;
        info!("Loaded {} schema documents from {:?}", paths.len(), dir);
        Ok(())
    }

    /// Dumps the schema into the document shape it loads from.
    ///
    /// Keys are sorted and empty attributes omitted. Every entity and field
    /// is listed, since their existence alone changes how names resolve.
    pub fn dump(&self) -> SchemaDocument {
        let entities = self
            .entities
            .values()
            .map(|entity| {
                let mut doc = entity.dump();
                doc.aliases = self.aliases_of(entity.name()).into_iter().collect();
                doc.tags = self.tags_of(entity.name()).into_iter().collect();
                (entity.name().to_string(), doc)
            })
            .collect();

        SchemaDocument {
            entities,
            entity_aliases: self.dangling_entity_aliases(),
            entity_tags: self.dangling_entity_tags(),
        }
    }

    /// Writes [`Schema::dump`] as pretty JSON, or YAML for `.yaml`/`.yml`.
    pub fn dump_path(&self, path: impl AsRef<Path>) -> SchemaResult<()> {
        let path = path.as_ref();
        let document = self.dump();
        let text = if is_yaml_path(path) {
            serde_yaml::to_string(&document)?
        } else {
            serde_json::to_string_pretty(&document)?
        };
        std::fs::write(path, text)?;
        debug!("Dumped schema to {:?}", path);
        Ok(())
    }
}

impl Entity {
    pub(crate) fn merge_document(&mut self, doc: EntityDocument) {
        for (name, field_doc) in doc.fields {
            self.ensure_field(&name).merge_document(field_doc);
        }
        self.declare_field_aliases(doc.field_aliases);
        self.declare_field_tags(doc.field_tags);
        self.aliases.extend(doc.aliases);
        self.tags.extend(doc.tags);
        self.reindex();
    }

    fn dump(&self) -> EntityDocument {
        EntityDocument {
            fields: self
                .fields()
                .map(|field| {
                    let mut doc = field.dump();
                    doc.aliases = self.aliases_of(field.name()).into_iter().collect();
                    doc.tags = self.tags_of(field.name()).into_iter().collect();
                    (field.name().to_string(), doc)
                })
                .collect(),
            field_aliases: self.dangling_field_aliases(),
            field_tags: self.dangling_field_tags(),
            aliases: Vec::new(),
            tags: Vec::new(),
        }
    }
}

impl Field {
    fn merge_document(&mut self, doc: FieldDocument) {
        if doc.data_type.is_some() {
            self.data_type = doc.data_type;
        }
        if doc.default_value.is_some() {
            self.default_value = doc.default_value;
        }
        self.allowed_entity_types.extend(doc.allowed_entity_types);
        self.extend_valid_values(doc.valid_values);
        self.aliases.extend(doc.aliases);
        self.tags.extend(doc.tags);
    }

    fn dump(&self) -> FieldDocument {
        FieldDocument {
            aliases: Vec::new(),
            tags: Vec::new(),
            data_type: self.data_type.clone(),
            allowed_entity_types: self.allowed_entity_types.iter().cloned().collect(),
            default_value: self.default_value.clone(),
            valid_values: self.valid_values.clone(),
        }
    }
}
