use pretty_assertions::assert_eq;
use serde_json::json;
use sgschema_core::{ResolveOptions, Schema, SchemaError};

fn make_schema() -> Schema {
    let mut s = Schema::new();
    s.load(&json!({
        "entities": {
            "Task": {
                "fields": {
                    "sg_status_list": {},
                    "entity": {"data_type": "entity", "allowed_entity_types": ["Shot", "Asset"]},
                },
                "field_aliases": {
                    "status": "sg_status_list",
                    "parent": "entity",
                },
                "field_tags": {
                    "core": ["content", "step", "sg_status_list"],
                },
            },
            "Shot": {
                "fields": {
                    "sg_status_list": {},
                },
                "field_aliases": {
                    "status": "sg_status_list",
                },
                "field_tags": {
                    "core": ["code", "description", "sg_sequence"],
                },
            },
            "Asset": {
                "fields": {
                    "sg_status_list": {},
                },
                "field_aliases": {
                    "status": "sg_status_list",
                },
                "field_tags": {
                    "core": ["code", "asset_type"],
                },
            },
        },
        "entity_tags": {
            "parents": ["Shot", "Asset"],
        },
    }))
    .unwrap();
    s
}

fn resolve(s: &Schema, spec: &str) -> Vec<String> {
    s.resolve_field("Task", spec, ResolveOptions::default())
        .unwrap()
}

#[test]
fn sanity() {
    let s = make_schema();
    assert_eq!(resolve(&s, "sg_status_list"), vec!["sg_status_list"]);
    assert_eq!(resolve(&s, "status_list"), vec!["sg_status_list"]);
    assert_eq!(resolve(&s, "$status"), vec!["sg_status_list"]);
}

#[test]
fn passthrough() {
    let s = make_schema();
    assert_eq!(
        resolve(&s, "entity.Shot.sg_status_list"),
        vec!["entity.Shot.sg_status_list"]
    );
}

#[test]
fn explicit_aliases() {
    let s = make_schema();
    assert_eq!(resolve(&s, "$parent.Shot.$status"), vec!["entity.Shot.sg_status_list"]);
    assert_eq!(resolve(&s, "$parent.Shot.status_list"), vec!["entity.Shot.sg_status_list"]);
    assert_eq!(resolve(&s, "entity.Shot.$status"), vec!["entity.Shot.sg_status_list"]);
}

#[test]
fn explicit_tags() {
    let s = make_schema();
    assert_eq!(
        resolve(&s, "$parent.Shot.#core"),
        vec![
            "entity.Shot.code",
            "entity.Shot.description",
            "entity.Shot.sg_sequence",
        ]
    );
}

#[test]
fn entity_tags_fan_out() {
    let s = make_schema();
    assert_eq!(
        resolve(&s, "$parent.#parents.$status"),
        vec!["entity.Asset.sg_status_list", "entity.Shot.sg_status_list"]
    );
}

#[test]
fn product_varies_last_hop_fastest() {
    let s = make_schema();
    // 2 entity types x per-type tags: Asset{asset_type, code} then Shot{code, description, sg_sequence}.
    assert_eq!(
        resolve(&s, "$parent.#parents.#core"),
        vec![
            "entity.Asset.asset_type",
            "entity.Asset.code",
            "entity.Shot.code",
            "entity.Shot.description",
            "entity.Shot.sg_sequence",
        ]
    );
    // Multiple first-hop fields multiply with every later hop.
    assert_eq!(
        resolve(&s, "#core.Shot.$status"),
        vec![
            "content.Shot.sg_status_list",
            "sg_status_list.Shot.sg_status_list",
            "step.Shot.sg_status_list",
        ]
    );
}

#[test]
fn multi_hop_paths() {
    let mut s = make_schema();
    s.ensure_entity("Shot").ensure_field("sg_sequence");
    s.ensure_entity("Sequence").ensure_field("code");
    s.entity_mut("Shot").unwrap().alias_field("seq", "sg_sequence");
    assert_eq!(
        resolve(&s, "$parent.Shot.seq.Sequence.code"),
        vec!["entity.Shot.sg_sequence.Sequence.code"]
    );
}

#[test]
fn list_of_deep_paths() {
    let s = make_schema();
    let resolved = s
        .resolve_fields("Task", ["$status", "$parent.Shot.$status"], ResolveOptions::default())
        .unwrap();
    assert_eq!(resolved, vec!["sg_status_list", "entity.Shot.sg_status_list"]);
}

#[test]
fn empty_hop_collapses_the_product() {
    let s = make_schema();
    assert!(resolve(&s, "$parent.Shot.#missing").is_empty());
    assert!(resolve(&s, "$parent.#missing.code").is_empty());
}

#[test]
fn unknown_hop_entity_is_an_error() {
    let s = make_schema();
    let err = s
        .resolve_field("Task", "entity.Missing.code", ResolveOptions::default())
        .unwrap_err();
    assert!(matches!(err, SchemaError::UnknownEntity(ref e) if e == "Missing"));
}

#[test]
fn even_segment_counts_are_malformed() {
    let s = make_schema();
    let opts = ResolveOptions::default();
    assert!(matches!(
        s.resolve_field("Task", "entity.Shot", opts),
        Err(SchemaError::Format { .. })
    ));
    assert!(matches!(
        s.resolve_field("Task", "entity..code", opts),
        Err(SchemaError::Format { .. })
    ));
}

#[test]
fn strict_applies_to_every_hop() {
    let s = make_schema();
    let strict = ResolveOptions::default().strict();
    assert!(s.resolve_field("Task", "$parent.Shot.status", strict).is_ok());
    assert!(matches!(
        s.resolve_field("Task", "$parent.Shot.bogus", strict),
        Err(SchemaError::Resolution { .. })
    ));
}
