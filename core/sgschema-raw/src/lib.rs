//! Raw schema ingestion for sgschema.
//!
//! The service reports its schema in three parts: per-entity field
//! descriptions, the entity list, and a private schema scraped from its
//! web pages that carries relationship targets and identifier columns.
//! This crate types those payloads ([`RawSchema`]) and folds them into a
//! [`sgschema_core::Schema`] ([`reduce_raw`]). Fetching them over the
//! network is left to a [`SchemaProvider`] implementation.

mod error;
mod payload;
mod provider;
mod reduce;

pub use error::{RawError, RawResult};
pub use payload::{
    RawField, RawFieldProperties, RawPrivate, RawPrivateField, RawProperty, RawSchema,
    parse_private_page,
};
pub use provider::{RawFileProvider, SchemaProvider, cached_schema, read_schema};
pub use reduce::reduce_raw;
