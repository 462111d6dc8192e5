use serde_json::json;
use sgschema_core::{ResolveOptions, Schema, SchemaError, SchemaRegistry};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

fn build() -> Result<Schema, SchemaError> {
    let mut s = Schema::new();
    s.load(&json!({"entities": {"Shot": {"fields": {"sg_status_list": {"aliases": ["status"]}}}}}))?;
    Ok(s)
}

#[test]
fn builds_once_per_endpoint() {
    let registry = SchemaRegistry::new();
    let calls = AtomicUsize::new(0);
    let counted = || {
        calls.fetch_add(1, Ordering::SeqCst);
        build()
    };

    let first = registry.get_or_create("https://example.shotgunstudio.com", counted).unwrap();
    let second = registry
        .get_or_create("https://example.shotgunstudio.com/", || {
            calls.fetch_add(1, Ordering::SeqCst);
            build()
        })
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn endpoints_are_independent() {
    let registry = SchemaRegistry::new();
    let a = registry.get_or_create("https://a.example", build).unwrap();
    let b = registry.get_or_create("https://b.example", build).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(registry.len(), 2);
}

#[test]
fn failed_builds_are_not_cached() {
    let registry = SchemaRegistry::new();
    let err = registry
        .get_or_create("https://a.example", || {
            Err::<Schema, _>(SchemaError::OverrideDocument("boom".into()))
        })
        .unwrap_err();
    assert!(err.to_string().contains("boom"));
    assert!(registry.is_empty());
    assert!(registry.get_or_create("https://a.example", build).is_ok());
}

#[test]
fn insert_get_remove_clear() {
    let registry = SchemaRegistry::new();
    assert!(registry.get("https://a.example").is_none());

    registry.insert("https://a.example/", Schema::new());
    assert!(registry.get("https://a.example").is_some());

    assert!(registry.remove("https://a.example").is_some());
    assert!(registry.is_empty());

    registry.insert("https://a.example", Schema::new());
    registry.insert("https://b.example", Schema::new());
    registry.clear();
    assert!(registry.is_empty());
}

#[test]
fn concurrent_callers_share_one_schema() {
    let registry = Arc::new(SchemaRegistry::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let calls = Arc::clone(&calls);
            thread::spawn(move || {
                let schema = registry
                    .get_or_create("https://example.shotgunstudio.com", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        build()
                    })
                    .unwrap();
                schema
                    .resolve_one_field("Shot", "status", ResolveOptions::default())
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "sg_status_list");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
