use pretty_assertions::assert_eq;
use serde_json::json;
use sgschema_core::{ResolveOptions, Schema, SchemaError, StructValue};
use std::collections::BTreeMap;

fn make_schema() -> Schema {
    let mut s = Schema::new();
    s.load(&json!({
        "entities": {
            "Entity": {
                "fields": {
                    "attr": {
                        "aliases": ["a", "with:namespace"],
                        "tags": ["x"],
                    },
                    "sg_version": {},
                    "sg_type": {},
                    "name": {},
                    "sg_name": {},
                },
                "field_aliases": {
                    "b": "attr",
                },
                "field_tags": {
                    "y": ["attr"],
                    "multi": ["multi_a", "multi_b"],
                },
            },
        },
    }))
    .unwrap();
    s
}

fn resolve_json(s: &Schema, value: serde_json::Value) -> serde_json::Value {
    s.resolve_structure(&StructValue::from_json(value), None, ResolveOptions::default())
        .unwrap()
        .to_json()
        .unwrap()
}

// ── Trees ────────────────────────────────────────────────────────

#[test]
fn single_entity() {
    let s = make_schema();
    assert_eq!(
        resolve_json(&s, json!({"type": "Entity", "version": 1})),
        json!({"type": "Entity", "sg_version": 1})
    );
}

#[test]
fn entity_list() {
    let s = make_schema();
    assert_eq!(
        resolve_json(
            &s,
            json!([
                {"type": "Entity", "version": 1},
                {"type": "Entity", "$b": "attr_value", "#multi": "xxx"},
            ])
        ),
        json!([
            {"type": "Entity", "sg_version": 1},
            {"type": "Entity", "attr": "attr_value", "multi_a": "xxx", "multi_b": "xxx"},
        ])
    );
}

#[test]
fn non_entity_maps_keep_their_keys() {
    let s = make_schema();
    assert_eq!(
        resolve_json(
            &s,
            json!({
                "version": 1,
                "type": "NotAnEntity",
                "nested": {"type": "Entity", "a": true},
            })
        ),
        json!({
            "version": 1,
            "type": "NotAnEntity",
            "nested": {"type": "Entity", "attr": true},
        })
    );
}

#[test]
fn explicit_entity_type() {
    let s = make_schema();
    let value = StructValue::from_json(json!([{"version": 2}, {"b": 3}]));
    let out = s
        .resolve_structure(&value, Some("Entity"), ResolveOptions::default())
        .unwrap();
    assert_eq!(out.to_json().unwrap(), json!([{"sg_version": 2}, {"attr": 3}]));
}

#[test]
fn explicit_entity_type_does_not_leak_into_values() {
    let s = make_schema();
    let value = StructValue::from_json(json!({"version": {"version": 1}}));
    let out = s
        .resolve_structure(&value, Some("Entity"), ResolveOptions::default())
        .unwrap();
    assert_eq!(out.to_json().unwrap(), json!({"sg_version": {"version": 1}}));
}

#[test]
fn unknown_explicit_entity_type_is_an_error() {
    let s = make_schema();
    for value in [json!({"version": 1}), json!({"type": "Entity", "version": 1})] {
        let err = s
            .resolve_structure(&StructValue::from_json(value), Some("Missing"), ResolveOptions::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownEntity(name) if name == "Missing"));
    }
}

#[test]
fn colliding_keys_keep_the_later_key() {
    let s = make_schema();
    assert_eq!(
        resolve_json(&s, json!({"type": "Entity", "sg_version": 2, "version": 1})),
        json!({"type": "Entity", "sg_version": 1})
    );
}

#[test]
fn scalars_pass_through() {
    let s = make_schema();
    assert_eq!(resolve_json(&s, json!("version")), json!("version"));
    assert_eq!(resolve_json(&s, json!(null)), json!(null));
}

#[test]
fn strict_errors_propagate() {
    let s = make_schema();
    let value = StructValue::from_json(json!({"type": "Entity", "bogus": 1}));
    let err = s
        .resolve_structure(&value, None, ResolveOptions::default().strict())
        .unwrap_err();
    assert!(matches!(err, SchemaError::Resolution { .. }));
}

// ── Sharing and cycles ───────────────────────────────────────────

#[test]
fn shared_nodes_stay_shared() {
    let s = make_schema();
    let shared = StructValue::from_json(json!({"type": "Entity", "version": 1}));
    let outer = StructValue::list(vec![shared.clone(), shared.clone()]);

    let out = s
        .resolve_structure(&outer, None, ResolveOptions::default())
        .unwrap();
    let items = out.as_list().unwrap().borrow();
    assert!(items[0].ptr_eq(&items[1]));
    assert!(!items[0].ptr_eq(&shared));
}

#[test]
fn shared_nodes_convert_per_entity_context() {
    let s = make_schema();
    let shared = StructValue::from_json(json!({"version": 1}));
    let wrapper = StructValue::map(BTreeMap::from([("a".to_string(), shared.clone())]));
    let opts = ResolveOptions::default();

    let forward = StructValue::list(vec![shared.clone(), wrapper.clone()]);
    let out = s.resolve_structure(&forward, Some("Entity"), opts).unwrap();
    assert_eq!(
        out.to_json().unwrap(),
        json!([{"sg_version": 1}, {"attr": {"version": 1}}])
    );

    let backward = StructValue::list(vec![wrapper, shared]);
    let out = s.resolve_structure(&backward, Some("Entity"), opts).unwrap();
    assert_eq!(
        out.to_json().unwrap(),
        json!([{"attr": {"version": 1}}, {"sg_version": 1}])
    );
}

#[test]
fn self_referential_map() {
    let s = make_schema();
    let node = StructValue::map(BTreeMap::new());
    {
        let map = node.as_map().unwrap();
        map.borrow_mut().insert("type".into(), StructValue::string("Entity"));
        map.borrow_mut().insert("a".into(), node.clone());
    }

    let out = s
        .resolve_structure(&node, None, ResolveOptions::default())
        .unwrap();
    let out_map = out.as_map().unwrap().borrow();
    assert_eq!(out_map.get("type").and_then(StructValue::as_str), Some("Entity"));
    let child = out_map.get("attr").unwrap();
    assert!(child.ptr_eq(&out));
    assert!(!out.ptr_eq(&node));
}

#[test]
fn indirect_cycle_through_list() {
    let s = make_schema();
    let list = StructValue::list(Vec::new());
    let map = StructValue::map(BTreeMap::from([
        ("type".to_string(), StructValue::string("Entity")),
        ("b".to_string(), list.clone()),
    ]));
    list.as_list().unwrap().borrow_mut().push(map.clone());

    let out = s
        .resolve_structure(&list, None, ResolveOptions::default())
        .unwrap();
    let out_items = out.as_list().unwrap().borrow();
    let out_map = out_items[0].as_map().unwrap().borrow();
    assert!(out_map.get("attr").unwrap().ptr_eq(&out));
}

#[test]
fn cyclic_values_do_not_convert_to_json() {
    let node = StructValue::list(Vec::new());
    node.as_list().unwrap().borrow_mut().push(node.clone());
    assert!(matches!(node.to_json(), Err(SchemaError::CyclicValue)));
    assert_eq!(node, node.clone());
}
