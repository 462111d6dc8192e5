//! Field-spec resolution over nested values.

use crate::config::ResolveOptions;
use crate::error::{SchemaError, SchemaResult};
use crate::schema::Schema;
use crate::value::StructValue;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::debug;

/// Converted containers keyed by the identity of their source container and
/// the entity type they were converted under.
type Memo = HashMap<(*const (), Option<String>), StructValue>;

impl Schema {
    /// Walks `value` and resolves the keys of every entity-like map as field
    /// specs.
    ///
    /// A map is entity-like when `entity_type` is given, or when its `type`
    /// value names a known entity type; `entity_type` applies to the
    /// top-level value and to list elements reached directly from it, and
    /// must name a known entity type. A key that resolves to several fields
    /// becomes several keys sharing the same value. When two keys resolve to
    /// the same field, the later key in sorted order wins. Other maps keep
    /// their keys. Shared and cyclic containers map to shared and cyclic
    /// output containers.
    pub fn resolve_structure(
        &self,
        value: &StructValue,
        entity_type: Option<&str>,
        options: ResolveOptions,
    ) -> SchemaResult<StructValue> {
        if let Some(entity_type) = entity_type {
            if !self.has_entity(entity_type) {
                return Err(SchemaError::UnknownEntity(entity_type.to_string()));
            }
        }
        let mut memo = Memo::new();
        self.convert(value, entity_type, options, &mut memo)
    }

    fn convert(
        &self,
        value: &StructValue,
        entity_type: Option<&str>,
        options: ResolveOptions,
        memo: &mut Memo,
    ) -> SchemaResult<StructValue> {
        let key = value
            .container_id()
            .map(|id| (id, entity_type.map(str::to_string)));
        if let Some(converted) = key.as_ref().and_then(|k| memo.get(k)) {
            return Ok(converted.clone());
        }

        match value {
            StructValue::List(items) => {
                let out = Rc::new(RefCell::new(Vec::new()));
                if let Some(key) = key {
                    memo.insert(key, StructValue::List(out.clone()));
                }
                for item in items.borrow().iter() {
                    let converted = self.convert(item, entity_type, options, memo)?;
                    out.borrow_mut().push(converted);
                }
                Ok(StructValue::List(out))
            }
            StructValue::Map(entries) => {
                let out = Rc::new(RefCell::new(BTreeMap::new()));
                if let Some(key) = key {
                    memo.insert(key, StructValue::Map(out.clone()));
                }

                let source = entries.borrow();
                let target = entity_type.map(str::to_string).or_else(|| {
                    source
                        .get("type")
                        .and_then(StructValue::as_str)
                        .filter(|t| self.has_entity(t))
                        .map(str::to_string)
                });

                for (key, child) in source.iter() {
                    let converted = self.convert(child, None, options, memo)?;
                    match &target {
                        Some(entity) => {
                            for field in self.resolve_field(entity, key, options)? {
                                if out.borrow().contains_key(&field) {
                                    debug!(
                                        "{:?} overwrites field {} of {}",
                                        key, field, entity
                                    );
                                }
                                out.borrow_mut().insert(field, converted.clone());
                            }
                        }
                        None => {
                            out.borrow_mut().insert(key.clone(), converted);
                        }
                    }
                }
                Ok(StructValue::Map(out))
            }
            scalar => Ok(scalar.clone()),
        }
    }
}
