//! The schema payload as the service reports it.
//!
//! Only the parts the reducer reads are typed; everything else is kept in
//! `extra` so a raw dump can be written back unchanged.

use crate::error::{RawError, RawResult};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

const RAW_KEYS: [&str; 3] = ["raw_entities", "raw_fields", "raw_private"];

static PRIVATE_PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^SG\.schema = new SG\.Schema\((.+)\);\s*$").expect("private page pattern is valid")
});

/// Everything fetched from the service for one schema read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSchema {
    /// `entity_type -> field_name -> field description`.
    pub raw_fields: BTreeMap<String, BTreeMap<String, RawField>>,
    /// `entity_type -> display name and visibility`.
    pub raw_entities: BTreeMap<String, Value>,
    /// The private schema that drives the service's web pages.
    pub raw_private: RawPrivate,
}

/// A `{"value": ...}` wrapper, as used for every field property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProperty {
    #[serde(default)]
    pub value: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    pub data_type: RawProperty,
    #[serde(default)]
    pub properties: RawFieldProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFieldProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<RawProperty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_values: Option<RawProperty>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawField {
    pub fn data_type(&self) -> Option<&str> {
        self.data_type.value.as_str()
    }

    /// The default value, if the service reports a non-null one.
    pub fn default_value(&self) -> Option<&Value> {
        self.properties
            .default_value
            .as_ref()
            .map(|p| &p.value)
            .filter(|v| !v.is_null())
    }

    pub fn valid_values(&self) -> &[Value] {
        self.properties
            .valid_values
            .as_ref()
            .and_then(|p| p.value.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrivate {
    /// `entity_type -> field_name -> private field description`.
    #[serde(default)]
    pub entity_fields: BTreeMap<String, BTreeMap<String, RawPrivateField>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrivateField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_column: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_entity_types: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawPrivateField {
    pub fn is_identifier(&self) -> bool {
        self.identifier_column.unwrap_or(false)
    }
}

/// Extracts the private schema from the service's schema page, whose first
/// line is `SG.schema = new SG.Schema(<json>);`.
pub fn parse_private_page(page: &str) -> RawResult<RawPrivate> {
    let first_line = page.lines().next().unwrap_or_default();
    let captures = PRIVATE_PAGE_RE.captures(first_line).ok_or_else(|| {
        RawError::PrivatePage("first line is not an SG.Schema constructor".to_string())
    })?;
    let encoded = captures
        .get(1)
        .map(|m| m.as_str())
        .ok_or_else(|| RawError::PrivatePage("empty SG.Schema constructor".to_string()))?;
    Ok(serde_json::from_str(encoded)?)
}

impl RawSchema {
    /// Parses a raw dump, which must have exactly the `raw_entities`,
    /// `raw_fields` and `raw_private` keys.
    pub fn from_value(value: Value) -> RawResult<Self> {
        let Value::Object(map) = &value else {
            return Err(RawError::MissingKeys(
                RAW_KEYS.iter().map(|k| k.to_string()).collect(),
            ));
        };

        let missing: Vec<String> = RAW_KEYS
            .iter()
            .filter(|k| !map.contains_key(**k))
            .map(|k| k.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(RawError::MissingKeys(missing));
        }

        let mut extra: Vec<String> = map
            .keys()
            .filter(|k| !RAW_KEYS.contains(&k.as_str()))
            .cloned()
            .collect();
        if !extra.is_empty() {
            extra.sort();
            return Err(RawError::ExtraKeys(extra));
        }

        Ok(serde_json::from_value(value)?)
    }

    pub fn load_path(path: impl AsRef<Path>) -> RawResult<Self> {
        let path = path.as_ref();
        debug!("Loading raw schema {:?}", path);
        let text = std::fs::read_to_string(path)?;
        Self::from_value(serde_json::from_str(&text)?)
    }

    pub fn dump_path(&self, path: impl AsRef<Path>) -> RawResult<()> {
        let path = path.as_ref();
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Dumped raw schema to {:?}", path);
        Ok(())
    }
}
