//! The resolution engine: turns entity and field specs into the literal
//! names the backing service understands.

use crate::config::ResolveOptions;
use crate::error::{SchemaError, SchemaResult, SpecKind};
use crate::schema::Schema;
use crate::spec::{Operator, parse_spec};
use tracing::debug;

impl Schema {
    /// Resolves an entity spec into entity types.
    ///
    /// `!name` is returned as-is, `#tag` expands to the tagged types (empty
    /// when unknown) and `$alias` to its target (empty when unknown). A bare
    /// name matches a real entity type first, then an alias when
    /// `implicit_aliases` is set; otherwise it fails in strict mode or is
    /// passed through unchanged.
    pub fn resolve_entity(&self, spec: &str, options: ResolveOptions) -> SchemaResult<Vec<String>> {
        let parsed = parse_spec(spec, SpecKind::Entity)?;
        let name = parsed.name;

        match parsed.operator {
            Operator::Literal => Ok(vec![name.to_string()]),
            Operator::Tag => Ok(self
                .entity_tags()
                .get(name)
                .map(|types| types.iter().cloned().collect())
                .unwrap_or_default()),
            Operator::Alias => Ok(self.entity_aliases().get(name).cloned().into_iter().collect()),
            Operator::Bare => {
                if self.has_entity(name) {
                    return Ok(vec![name.to_string()]);
                }
                if options.implicit_aliases {
                    if let Some(target) = self.entity_aliases().get(name) {
                        return Ok(vec![target.clone()]);
                    }
                }
                if options.strict {
                    debug!("Strict entity resolution failed for {:?}", spec);
                    return Err(SchemaError::Resolution {
                        spec: spec.to_string(),
                        what: "an entity type".to_string(),
                    });
                }
                Ok(vec![name.to_string()])
            }
        }
    }

    /// Resolves an entity spec that must name exactly one entity type.
    pub fn resolve_one_entity(&self, spec: &str, options: ResolveOptions) -> SchemaResult<String> {
        exactly_one(spec, self.resolve_entity(spec, options)?)
    }

    /// Resolves a field spec against `entity_type`.
    ///
    /// Dotted specs (`parent.Shot.status`) traverse relationships; every
    /// other spec resolves as a single hop. `entity_type` must exist.
    pub fn resolve_field(
        &self,
        entity_type: &str,
        spec: &str,
        options: ResolveOptions,
    ) -> SchemaResult<Vec<String>> {
        if spec.contains('.') {
            self.resolve_deep_field(entity_type, spec, options)
        } else {
            self.resolve_single_field(entity_type, spec, options)
        }
    }

    /// Resolves each spec in order and concatenates the results.
    /// Duplicates are kept.
    pub fn resolve_fields<I, S>(
        &self,
        entity_type: &str,
        specs: I,
        options: ResolveOptions,
    ) -> SchemaResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolved = Vec::new();
        for spec in specs {
            resolved.extend(self.resolve_field(entity_type, spec.as_ref(), options)?);
        }
        Ok(resolved)
    }

    /// Resolves a field spec that must name exactly one field.
    pub fn resolve_one_field(
        &self,
        entity_type: &str,
        spec: &str,
        options: ResolveOptions,
    ) -> SchemaResult<String> {
        exactly_one(spec, self.resolve_field(entity_type, spec, options)?)
    }

    fn resolve_single_field(
        &self,
        entity_type: &str,
        spec: &str,
        options: ResolveOptions,
    ) -> SchemaResult<Vec<String>> {
        let entity = self
            .entity(entity_type)
            .ok_or_else(|| SchemaError::UnknownEntity(entity_type.to_string()))?;

        if self.config.is_structural(spec) {
            return Ok(vec![spec.to_string()]);
        }

        let parsed = parse_spec(spec, SpecKind::Field)?;
        let name = parsed.name;

        match parsed.operator {
            Operator::Literal => Ok(vec![name.to_string()]),
            Operator::Tag => Ok(entity
                .field_tags()
                .get(name)
                .map(|fields| fields.iter().cloned().collect())
                .unwrap_or_default()),
            // An unknown explicit alias keeps its `$` so that whatever
            // consumes the result rejects it.
            Operator::Alias => Ok(vec![
                entity
                    .field_aliases()
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| spec.to_string()),
            ]),
            Operator::Bare => {
                if entity.has_field(name) {
                    return Ok(vec![name.to_string()]);
                }
                if options.auto_prefix {
                    let prefixed = format!("{}{}", self.config.field_prefix, name);
                    if entity.has_field(&prefixed) {
                        return Ok(vec![prefixed]);
                    }
                }
                if options.implicit_aliases {
                    if let Some(target) = entity.field_aliases().get(name) {
                        return Ok(vec![target.clone()]);
                    }
                }
                if options.strict {
                    debug!("Strict field resolution failed for {:?} on {}", spec, entity_type);
                    return Err(SchemaError::Resolution {
                        spec: spec.to_string(),
                        what: format!("a field of {entity_type}"),
                    });
                }
                Ok(vec![name.to_string()])
            }
        }
    }

    /// Resolves `field.Entity.field[.Entity.field...]`.
    ///
    /// Each `(entity, field)` hop expands into every candidate pair, and the
    /// result is the product of the hops taken left to right with the last
    /// hop varying fastest. The first hop renders as its field name alone,
    /// every later hop as `.entity.field`.
    fn resolve_deep_field(
        &self,
        entity_type: &str,
        spec: &str,
        options: ResolveOptions,
    ) -> SchemaResult<Vec<String>> {
        let segments: Vec<&str> = spec.split('.').collect();
        if segments.len() % 2 == 0 {
            return Err(SchemaError::Format {
                spec: spec.to_string(),
                kind: SpecKind::Field,
                reason: "path must alternate field and entity segments".to_string(),
            });
        }

        let mut hops = Vec::with_capacity(segments.len() / 2 + 1);
        hops.push(self.hop_candidates(&[entity_type.to_string()], segments[0], options)?);
        for pair in segments[1..].chunks_exact(2) {
            let entity_types = self.resolve_entity(pair[0], options)?;
            hops.push(self.hop_candidates(&entity_types, pair[1], options)?);
        }

        let mut paths = vec![String::new()];
        for (depth, hop) in hops.iter().enumerate() {
            let mut next = Vec::with_capacity(paths.len() * hop.len());
            for prefix in &paths {
                for (entity, field) in hop {
                    if depth == 0 {
                        next.push(field.clone());
                    } else {
                        next.push(format!("{prefix}.{entity}.{field}"));
                    }
                }
            }
            paths = next;
        }
        Ok(paths)
    }

    fn hop_candidates(
        &self,
        entity_types: &[String],
        field_spec: &str,
        options: ResolveOptions,
    ) -> SchemaResult<Vec<(String, String)>> {
        let mut candidates = Vec::new();
        for entity_type in entity_types {
            for field in self.resolve_single_field(entity_type, field_spec, options)? {
                candidates.push((entity_type.clone(), field));
            }
        }
        Ok(candidates)
    }
}

fn exactly_one(spec: &str, mut resolved: Vec<String>) -> SchemaResult<String> {
    if resolved.len() == 1 {
        if let Some(only) = resolved.pop() {
            return Ok(only);
        }
    }
    Err(SchemaError::Ambiguity {
        spec: spec.to_string(),
        count: resolved.len(),
        candidates: resolved,
    })
}
