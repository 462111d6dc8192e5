//! A JSON-like value graph whose containers are shared by reference, so
//! that structures fed to
//! [`Schema::resolve_structure`](crate::Schema::resolve_structure) may
//! contain shared or self-referential nodes.

use crate::error::{SchemaError, SchemaResult};
use serde_json::{Map, Number, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

pub type ListRef = Rc<RefCell<Vec<StructValue>>>;
pub type MapRef = Rc<RefCell<BTreeMap<String, StructValue>>>;

/// A node in a possibly cyclic value graph. Cloning a container clones the
/// handle, not the contents.
///
/// Cycles built from these handles are never freed, the same as any other
/// `Rc` cycle.
#[derive(Clone)]
pub enum StructValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(ListRef),
    Map(MapRef),
}

impl StructValue {
    pub fn list(items: Vec<StructValue>) -> Self {
        StructValue::List(Rc::new(RefCell::new(items)))
    }

    pub fn map(entries: BTreeMap<String, StructValue>) -> Self {
        StructValue::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn string(s: impl Into<String>) -> Self {
        StructValue::String(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StructValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            StructValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            StructValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// True when both values are the same container.
    pub fn ptr_eq(&self, other: &StructValue) -> bool {
        match (self, other) {
            (StructValue::List(a), StructValue::List(b)) => Rc::ptr_eq(a, b),
            (StructValue::Map(a), StructValue::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Identity of a container node, `None` for scalars.
    pub(crate) fn container_id(&self) -> Option<*const ()> {
        match self {
            StructValue::List(list) => Some(Rc::as_ptr(list) as *const ()),
            StructValue::Map(map) => Some(Rc::as_ptr(map) as *const ()),
            _ => None,
        }
    }

    /// Builds a fresh, unshared graph from a JSON tree.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => StructValue::Null,
            Value::Bool(b) => StructValue::Bool(b),
            Value::Number(n) => StructValue::Number(n),
            Value::String(s) => StructValue::String(s),
            Value::Array(items) => {
                StructValue::list(items.into_iter().map(StructValue::from_json).collect())
            }
            Value::Object(entries) => StructValue::map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, StructValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts to a JSON tree. Shared nodes are copied; a cycle fails with
    /// [`SchemaError::CyclicValue`].
    pub fn to_json(&self) -> SchemaResult<Value> {
        let mut ancestors = Vec::new();
        self.to_json_inner(&mut ancestors)
    }

    fn to_json_inner(&self, ancestors: &mut Vec<*const ()>) -> SchemaResult<Value> {
        if let Some(id) = self.container_id() {
            if ancestors.contains(&id) {
                return Err(SchemaError::CyclicValue);
            }
            ancestors.push(id);
        }

        let value = match self {
            StructValue::Null => Value::Null,
            StructValue::Bool(b) => Value::Bool(*b),
            StructValue::Number(n) => Value::Number(n.clone()),
            StructValue::String(s) => Value::String(s.clone()),
            StructValue::List(list) => {
                let mut items = Vec::new();
                for item in list.borrow().iter() {
                    items.push(item.to_json_inner(ancestors)?);
                }
                Value::Array(items)
            }
            StructValue::Map(map) => {
                let mut entries = Map::new();
                for (k, v) in map.borrow().iter() {
                    entries.insert(k.clone(), v.to_json_inner(ancestors)?);
                }
                Value::Object(entries)
            }
        };

        if self.container_id().is_some() {
            ancestors.pop();
        }
        Ok(value)
    }
}

impl From<Value> for StructValue {
    fn from(value: Value) -> Self {
        StructValue::from_json(value)
    }
}

/// Acyclic values compare by content; containers in a cycle only compare
/// equal to themselves.
impl PartialEq for StructValue {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self.to_json(), other.to_json()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => write!(f, "{json}"),
            Err(_) => write!(f, "<cyclic {:?}>", self.container_id()),
        }
    }
}
