use crate::payload::RawSchema;
use sgschema_core::Schema;
use tracing::{debug, warn};

/// Folds a raw payload into `schema`.
///
/// Every entity type in `raw_entities` or `raw_fields` is created. Fields
/// get their data type and default value; relationship fields get their
/// allowed entity types and enumerated fields their valid values. Each
/// identifier column receives the configured identifier alias.
pub fn reduce_raw(schema: &mut Schema, raw: &RawSchema) {
    for entity_type in raw.raw_entities.keys() {
        schema.ensure_entity(entity_type);
    }

    let identifier_alias = schema.config().identifier_alias.clone();
    let mut field_count = 0usize;

    for (entity_type, raw_fields) in &raw.raw_fields {
        let private_fields = raw.raw_private.entity_fields.get(entity_type);
        if private_fields.is_none() {
            warn!("No private schema for entity type {}", entity_type);
        }

        let entity = schema.ensure_entity(entity_type);
        let mut identifiers = Vec::new();

        for (field_name, raw_field) in raw_fields {
            let private = private_fields.and_then(|fields| fields.get(field_name));
            let field = entity.ensure_field(field_name);

            if let Some(data_type) = raw_field.data_type() {
                field.data_type = Some(data_type.to_string());
            }
            if let Some(default_value) = raw_field.default_value() {
                field.default_value = Some(default_value.clone());
            }

            match raw_field.data_type() {
                Some("entity" | "multi_entity") => {
                    let allowed = private.and_then(|p| p.allowed_entity_types.as_ref());
                    match allowed {
                        Some(types) => field.allowed_entity_types.extend(types.iter().cloned()),
                        None => warn!(
                            "Relationship field {}.{} has no allowed entity types",
                            entity_type, field_name
                        ),
                    }
                }
                Some("list" | "status_list") => {
                    field.extend_valid_values(raw_field.valid_values().iter().cloned());
                }
                _ => {}
            }

            if private.is_some_and(|p| p.is_identifier()) {
                identifiers.push(field_name.clone());
            }
            field_count += 1;
        }

        for field_name in identifiers {
            entity.alias_field(identifier_alias.clone(), field_name);
        }
    }

    schema.reindex();
    debug!(
        entities = schema.entities().count(),
        fields = field_count,
        "Reduced raw schema"
    );
}
