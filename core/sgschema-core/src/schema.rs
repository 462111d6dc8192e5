use crate::config::SchemaConfig;
use crate::entity::Entity;
use std::collections::{BTreeMap, BTreeSet};

/// The aggregate root: every known entity type plus schema-wide entity
/// aliases and tags.
///
/// A schema only ever grows. Loading adds entities, fields, aliases and
/// tags; nothing is removed, and resolution always runs against the
/// current accumulated state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub(crate) config: SchemaConfig,
    pub(crate) entities: BTreeMap<String, Entity>,
    declared_entity_aliases: BTreeMap<String, String>,
    declared_entity_tags: BTreeMap<String, BTreeSet<String>>,
    entity_alias_index: BTreeMap<String, String>,
    entity_tag_index: BTreeMap<String, BTreeSet<String>>,
}

impl Schema {
    /// Creates an empty schema with the default naming conventions.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchemaConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity(&self, entity_type: &str) -> Option<&Entity> {
        self.entities.get(entity_type)
    }

    /// Mutable access to an entity's fields and field-level maps.
    pub fn entity_mut(&mut self, entity_type: &str) -> Option<&mut Entity> {
        self.entities.get_mut(entity_type)
    }

    pub fn has_entity(&self, entity_type: &str) -> bool {
        self.entities.contains_key(entity_type)
    }

    /// Returns the named entity, creating it on first reference.
    pub fn ensure_entity(&mut self, entity_type: &str) -> &mut Entity {
        self.entities
            .entry(entity_type.to_string())
            .or_insert_with(|| Entity::new(entity_type))
    }

    /// Effective alias -> entity type map.
    pub fn entity_aliases(&self) -> &BTreeMap<String, String> {
        &self.entity_alias_index
    }

    /// Effective tag -> entity types map.
    pub fn entity_tags(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.entity_tag_index
    }

    /// Aliases that currently resolve to `entity_type`.
    pub fn aliases_of(&self, entity_type: &str) -> BTreeSet<String> {
        self.entity_alias_index
            .iter()
            .filter(|(_, target)| target.as_str() == entity_type)
            .map(|(alias, _)| alias.clone())
            .collect()
    }

    /// Tags that currently include `entity_type`.
    pub fn tags_of(&self, entity_type: &str) -> BTreeSet<String> {
        self.entity_tag_index
            .iter()
            .filter(|(_, members)| members.contains(entity_type))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// Declares a schema-wide alias for an entity type.
    pub fn alias_entity(&mut self, alias: impl Into<String>, entity_type: impl Into<String>) {
        self.declared_entity_aliases
            .insert(alias.into(), entity_type.into());
        self.reindex();
    }

    /// Adds an entity type to a schema-wide tag.
    pub fn tag_entity(&mut self, tag: impl Into<String>, entity_type: impl Into<String>) {
        self.declared_entity_tags
            .entry(tag.into())
            .or_default()
            .insert(entity_type.into());
        self.reindex();
    }

    pub(crate) fn declare_entity_aliases(&mut self, aliases: BTreeMap<String, String>) {
        self.declared_entity_aliases.extend(aliases);
    }

    pub(crate) fn declare_entity_tags(&mut self, tags: BTreeMap<String, Vec<String>>) {
        for (tag, entity_types) in tags {
            self.declared_entity_tags
                .entry(tag)
                .or_default()
                .extend(entity_types);
        }
    }

    /// Aliases whose target is not a known entity type.
    pub(crate) fn dangling_entity_aliases(&self) -> BTreeMap<String, String> {
        self.entity_alias_index
            .iter()
            .filter(|(_, target)| !self.entities.contains_key(target.as_str()))
            .map(|(alias, target)| (alias.clone(), target.clone()))
            .collect()
    }

    pub(crate) fn dangling_entity_tags(&self) -> BTreeMap<String, Vec<String>> {
        self.entity_tag_index
            .iter()
            .filter_map(|(tag, members)| {
                let missing: Vec<String> = members
                    .iter()
                    .filter(|m| !self.entities.contains_key(m.as_str()))
                    .cloned()
                    .collect();
                (!missing.is_empty()).then(|| (tag.clone(), missing))
            })
            .collect()
    }

    /// Rebuilds the effective entity alias and tag index. Schema-level
    /// declarations win alias conflicts with entity-level ones.
    pub fn reindex(&mut self) {
        let mut aliases = BTreeMap::new();
        let mut tags: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for entity in self.entities.values() {
            for alias in &entity.aliases {
                aliases.insert(alias.clone(), entity.name().to_string());
            }
            for tag in &entity.tags {
                tags.entry(tag.clone())
                    .or_default()
                    .insert(entity.name().to_string());
            }
        }

        aliases.extend(
            self.declared_entity_aliases
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        for (tag, members) in &self.declared_entity_tags {
            tags.entry(tag.clone())
                .or_default()
                .extend(members.iter().cloned());
        }

        self.entity_alias_index = aliases;
        self.entity_tag_index = tags;
    }
}
