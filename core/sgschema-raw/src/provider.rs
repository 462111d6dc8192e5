use crate::error::RawResult;
use crate::payload::RawSchema;
use crate::reduce::reduce_raw;
use sgschema_core::{Schema, SchemaConfig, SchemaRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Source of raw schema payloads for one service endpoint.
///
/// Network implementations live outside this crate; they fetch the public
/// schema, the entity list and the private page (see
/// [`parse_private_page`](crate::parse_private_page)) and return them
/// complete, or fail.
pub trait SchemaProvider {
    /// Base address of the service, used as the cache key.
    fn base_url(&self) -> &str;

    fn fetch(&self) -> RawResult<RawSchema>;
}

/// Serves a raw dump previously written with [`RawSchema::dump_path`].
#[derive(Debug, Clone)]
pub struct RawFileProvider {
    base_url: String,
    path: PathBuf,
}

impl RawFileProvider {
    pub fn new(base_url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            path: path.into(),
        }
    }
}

impl SchemaProvider for RawFileProvider {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn fetch(&self) -> RawResult<RawSchema> {
        RawSchema::load_path(&self.path)
    }
}

/// Fetches and reduces a fresh schema.
pub fn read_schema(provider: &dyn SchemaProvider, config: SchemaConfig) -> RawResult<Schema> {
    let raw = provider.fetch()?;
    let mut schema = Schema::with_config(config);
    reduce_raw(&mut schema, &raw);
    info!(
        endpoint = provider.base_url(),
        entities = schema.entities().count(),
        "Read schema"
    );
    Ok(schema)
}

/// Returns the registry's schema for the provider's endpoint, reading it
/// on first use.
pub fn cached_schema(
    registry: &SchemaRegistry,
    provider: &dyn SchemaProvider,
    config: SchemaConfig,
) -> RawResult<Arc<Schema>> {
    registry.get_or_create(provider.base_url(), || read_schema(provider, config))
}
