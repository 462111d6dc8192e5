//! Schemas memoized per service endpoint.

use crate::schema::Schema;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// A set of fully populated schemas keyed by service base address.
///
/// Construction happens under the registry lock, so concurrent callers
/// asking for the same endpoint build it once. The returned schemas are
/// shared read-only.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Mutex<HashMap<String, Arc<Schema>>>,
}

/// Strips trailing slashes so `https://host/` and `https://host` share a
/// cache entry.
fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim_end_matches('/').to_string()
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Schema>>> {
        self.schemas.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the schema for `endpoint`, building it with `build` on first
    /// use. A failed build is not cached.
    pub fn get_or_create<F, E>(&self, endpoint: &str, build: F) -> Result<Arc<Schema>, E>
    where
        F: FnOnce() -> Result<Schema, E>,
    {
        let key = normalize_endpoint(endpoint);
        let mut schemas = self.lock();
        if let Some(schema) = schemas.get(&key) {
            debug!("Schema cache hit for {}", key);
            return Ok(Arc::clone(schema));
        }

        debug!("Schema cache miss for {}", key);
        let schema = Arc::new(build()?);
        info!(
            endpoint = %key,
            entities = schema.entities().count(),
            "Schema constructed"
        );
        schemas.insert(key, Arc::clone(&schema));
        Ok(schema)
    }

    pub fn get(&self, endpoint: &str) -> Option<Arc<Schema>> {
        self.lock().get(&normalize_endpoint(endpoint)).cloned()
    }

    /// Registers a schema, replacing any previous one for the endpoint.
    pub fn insert(&self, endpoint: &str, schema: Schema) -> Arc<Schema> {
        let schema = Arc::new(schema);
        self.lock()
            .insert(normalize_endpoint(endpoint), Arc::clone(&schema));
        schema
    }

    pub fn remove(&self, endpoint: &str) -> Option<Arc<Schema>> {
        self.lock().remove(&normalize_endpoint(endpoint))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
