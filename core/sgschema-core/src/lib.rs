//! Schema cache and name resolution for entity-relationship services whose
//! entity types and fields are defined server-side.
//!
//! - [`Schema`] / [`Entity`] / [`Field`] — the cached shape of the data model,
//!   with locally declared aliases and tags
//! - [`Schema::resolve_entity`], [`Schema::resolve_field`],
//!   [`Schema::resolve_structure`] — turn human-friendly specs into the
//!   literal names the service accepts
//! - [`SchemaDocument`] — the override document format loaded and dumped
//!   by [`Schema::load`] and [`Schema::dump`]
//! - [`SchemaRegistry`] — one schema per service endpoint
//!
//! Spec grammar: `!name` is literal, `#tag` expands a tag, `$alias` looks
//! up an alias, and a bare name tries real names, then the configured field
//! prefix, then aliases. Field specs may be dotted paths through
//! relationship fields, e.g. `$parent.Shot.$status`.

mod config;
mod document;
mod entity;
mod error;
mod field;
mod registry;
mod resolve;
mod schema;
mod spec;
mod structure;
mod value;

pub use config::{ResolveOptions, SchemaConfig};
pub use document::{EntityDocument, FieldDocument, SchemaDocument, merge_update, read_value};
pub use entity::Entity;
pub use error::{SchemaError, SchemaResult, SpecKind};
pub use field::Field;
pub use registry::SchemaRegistry;
pub use schema::Schema;
pub use spec::{Operator, ParsedSpec, parse_spec};
pub use value::{ListRef, MapRef, StructValue};
