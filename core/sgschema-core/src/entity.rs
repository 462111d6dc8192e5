use crate::field::Field;
use std::collections::{BTreeMap, BTreeSet};

/// An entity type and its fields.
///
/// Field aliases and tags come from two places: the fields themselves and
/// the entity's `field_aliases` / `field_tags` maps. Both are folded into
/// an effective index after every mutation, with the entity maps winning
/// alias conflicts.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    name: String,
    fields: BTreeMap<String, Field>,
    pub(crate) aliases: BTreeSet<String>,
    pub(crate) tags: BTreeSet<String>,
    declared_field_aliases: BTreeMap<String, String>,
    declared_field_tags: BTreeMap<String, BTreeSet<String>>,
    field_alias_index: BTreeMap<String, String>,
    field_tag_index: BTreeMap<String, BTreeSet<String>>,
}

impl Entity {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            aliases: BTreeSet::new(),
            tags: BTreeSet::new(),
            declared_field_aliases: BTreeMap::new(),
            declared_field_tags: BTreeMap::new(),
            field_alias_index: BTreeMap::new(),
            field_tag_index: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Mutable access to a field's data attributes.
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the named field, creating it on first reference.
    pub fn ensure_field(&mut self, name: &str) -> &mut Field {
        self.fields
            .entry(name.to_string())
            .or_insert_with(|| Field::new(name))
    }

    /// Entity-level aliases declared on this entity itself.
    pub fn local_aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// Entity-level tags declared on this entity itself.
    pub fn local_tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Effective alias -> field name map.
    pub fn field_aliases(&self) -> &BTreeMap<String, String> {
        &self.field_alias_index
    }

    /// Effective tag -> field names map.
    pub fn field_tags(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.field_tag_index
    }

    /// Aliases that currently resolve to `field`.
    pub fn aliases_of(&self, field: &str) -> BTreeSet<String> {
        self.field_alias_index
            .iter()
            .filter(|(_, target)| target.as_str() == field)
            .map(|(alias, _)| alias.clone())
            .collect()
    }

    /// Tags that currently include `field`.
    pub fn tags_of(&self, field: &str) -> BTreeSet<String> {
        self.field_tag_index
            .iter()
            .filter(|(_, members)| members.contains(field))
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// Declares `alias` as a name for `field` in this entity's alias map.
    pub fn alias_field(&mut self, alias: impl Into<String>, field: impl Into<String>) {
        self.declared_field_aliases.insert(alias.into(), field.into());
        self.reindex();
    }

    /// Adds `field` to the group `tag` in this entity's tag map.
    pub fn tag_field(&mut self, tag: impl Into<String>, field: impl Into<String>) {
        self.declared_field_tags
            .entry(tag.into())
            .or_default()
            .insert(field.into());
        self.reindex();
    }

    /// Declared aliases whose target is not a known field. Needed to dump
    /// aliases that cannot be attached to a field entry.
    pub(crate) fn dangling_field_aliases(&self) -> BTreeMap<String, String> {
        self.field_alias_index
            .iter()
            .filter(|(_, target)| !self.fields.contains_key(target.as_str()))
            .map(|(alias, target)| (alias.clone(), target.clone()))
            .collect()
    }

    pub(crate) fn dangling_field_tags(&self) -> BTreeMap<String, Vec<String>> {
        self.field_tag_index
            .iter()
            .filter_map(|(tag, members)| {
                let missing: Vec<String> = members
                    .iter()
                    .filter(|m| !self.fields.contains_key(m.as_str()))
                    .cloned()
                    .collect();
                (!missing.is_empty()).then(|| (tag.clone(), missing))
            })
            .collect()
    }

    pub(crate) fn declare_field_aliases(&mut self, aliases: BTreeMap<String, String>) {
        self.declared_field_aliases.extend(aliases);
    }

    pub(crate) fn declare_field_tags(&mut self, tags: BTreeMap<String, Vec<String>>) {
        for (tag, fields) in tags {
            self.declared_field_tags
                .entry(tag)
                .or_default()
                .extend(fields);
        }
    }

    /// Rebuilds the effective field alias and tag index.
    pub(crate) fn reindex(&mut self) {
        let mut aliases = BTreeMap::new();
        let mut tags: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for field in self.fields.values() {
            for alias in &field.aliases {
                aliases.insert(alias.clone(), field.name().to_string());
            }
            for tag in &field.tags {
                tags.entry(tag.clone())
                    .or_default()
                    .insert(field.name().to_string());
            }
        }

        aliases.extend(
            self.declared_field_aliases
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        for (tag, members) in &self.declared_field_tags {
            tags.entry(tag.clone())
                .or_default()
                .extend(members.iter().cloned());
        }

        self.field_alias_index = aliases;
        self.field_tag_index = tags;
    }
}
