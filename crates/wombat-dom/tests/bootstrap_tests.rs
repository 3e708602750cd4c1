//! Tests for environment bootstrap: globals, the document and its body.

mod common;

use common::{body, error_message, object, setup, string};
use wombat_dom::heap::HeapEngine;
use wombat_dom::{BindingError, Environment, Value};

// ========== globals ==========

#[test]
fn test_bootstrap_publishes_constructors_and_document() {
    let (engine, _env, document) = setup();
    for name in ["Node", "Document", "Element", "Text", "Comment"] {
        assert!(
            matches!(engine.global(name), Value::Object(_)),
            "{name} should be a global"
        );
    }
    assert_eq!(engine.global("document"), Value::Object(document));
}

#[test]
fn test_second_bootstrap_fails() {
    let (mut engine, env, _document) = setup();
    assert_eq!(
        env.bootstrap(&mut engine),
        Err(BindingError::AlreadyBootstrapped)
    );
}

#[test]
fn test_bootstrap_records_no_commands() {
    let (_engine, env, _document) = setup();
    assert!(env.take_commands().is_empty());
}

#[test]
fn test_environments_are_independent() {
    let (mut first_engine, first_env, first_document) = setup();
    let (mut second_engine, second_env, second_document) = setup();

    let _ = common::element(&mut first_engine, first_document, "div");
    let _ = common::element(&mut first_engine, first_document, "div");
    let _ = common::element(&mut second_engine, second_document, "p");

    assert_eq!(first_env.take_commands().len(), 2);
    let second = second_env.take_commands();
    assert_eq!(
        second,
        vec![wombat_dom::UiCommand::CreateElement {
            target_id: 1,
            tag_name: "p".to_string(),
        }]
    );
}

// ========== document ==========

#[test]
fn test_document_surface() {
    let (engine, _env, document) = setup();
    assert_eq!(string(&engine, document, "nodeName"), "#document");
    assert_eq!(engine.get(document, "nodeType").unwrap(), Value::Number(9.0));
    assert_eq!(engine.get(document, "parentNode").unwrap(), Value::Null);
    assert_eq!(engine.get(document, "textContent").unwrap(), Value::Null);
    assert_eq!(engine.get(document, "isConnected").unwrap(), Value::Bool(true));
}

#[test]
fn test_document_is_not_constructible() {
    let (mut engine, _env, _document) = setup();
    assert_eq!(
        error_message(engine.construct("Document", &[])),
        "Failed to construct 'Document': Illegal constructor."
    );
    assert_eq!(
        error_message(engine.construct("Node", &[])),
        "Failed to construct 'Node': Illegal constructor."
    );
}

#[test]
fn test_document_class_chain() {
    let (engine, _env, document) = setup();
    assert!(engine.instance_of(document, "Document"));
    assert!(engine.instance_of(document, "Node"));
    assert!(!engine.instance_of(document, "Element"));
}

#[test]
fn test_document_keys_are_unique() {
    let (engine, _env, document) = setup();
    let keys = engine.keys(document).unwrap();
    assert_eq!(
        &keys[..5],
        &["nodeName", "body", "createElement", "createTextNode", "createComment"]
    );
    for name in ["nodeType", "childNodes", "textContent", "appendChild", "remove"] {
        assert_eq!(keys.iter().filter(|key| *key == name).count(), 1, "{name}");
    }
    let mut sorted = keys.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), keys.len());
}

// ========== body ==========

#[test]
fn test_body_is_stable() {
    let (engine, _env, document) = setup();
    let first = body(&engine, document);
    let second = body(&engine, document);
    assert_eq!(first, second);
}

#[test]
fn test_body_surface() {
    let (engine, _env, document) = setup();
    let body = body(&engine, document);
    assert_eq!(string(&engine, body, "tagName"), "BODY");
    assert_eq!(string(&engine, body, "nodeName"), "BODY");
    assert_eq!(engine.get(body, "nodeType").unwrap(), Value::Number(1.0));
    assert_eq!(engine.get(body, "isConnected").unwrap(), Value::Bool(true));
    assert_eq!(engine.get(body, "firstChild").unwrap(), Value::Null);
    assert_eq!(engine.get(body, "childNodes").unwrap(), Value::List(Vec::new()));
    assert!(engine.instance_of(body, "Element"));
    assert!(engine.instance_of(body, "Node"));
}

#[test]
fn test_body_is_pinned_by_document() {
    let (mut engine, _env, document) = setup();
    let body = body(&engine, document);
    assert_eq!(engine.pin_count(body), 1);
    assert_eq!(engine.collect_all(), 0);
    assert!(engine.is_alive(body));
}

#[test]
fn test_document_survives_global_deletion() {
    let (mut engine, env, document) = setup();
    let _ = engine.remove_global("document");
    let _ = engine.collect_all();
    assert!(engine.is_alive(document));
    assert_eq!(env.document(), Some(&document));
}

#[test]
fn test_bootstrap_returns_document_object() {
    let mut engine = HeapEngine::new();
    let env = Environment::new();
    let document = env.bootstrap(&mut engine).unwrap();
    assert_eq!(object(engine.global("document")), document);
    assert!(env.is_bootstrapped());
}
