//! Tests for tree mutation: appendChild, insertBefore, removeChild, remove.

mod common;

use common::{append, body, element, error_message, setup, string, text};
use wombat_dom::heap::{HeapEngine, ObjectId};
use wombat_dom::{BODY_TARGET_ID, UiCommand, Value};

fn children(engine: &HeapEngine, parent: ObjectId) -> Vec<ObjectId> {
    match engine.get(parent, "childNodes").unwrap() {
        Value::List(items) => items.into_iter().map(common::object).collect(),
        other => panic!("childNodes should be a list, got {other:?}"),
    }
}

fn link(engine: &HeapEngine, node: ObjectId, name: &str) -> Option<ObjectId> {
    match engine.get(node, name).unwrap() {
        Value::Object(id) => Some(id),
        Value::Null => None,
        other => panic!("{name} should be a node or null, got {other:?}"),
    }
}

// ========== appendChild ==========

#[test]
fn test_child_nodes_is_a_snapshot() {
    let (mut engine, _env, document) = setup();
    let parent = element(&mut engine, document, "ul");
    let first = element(&mut engine, document, "li");
    let second = element(&mut engine, document, "li");
    append(&mut engine, parent, first);

    let before = children(&engine, parent);
    append(&mut engine, parent, second);
    assert_eq!(before, vec![first]);
    assert_eq!(children(&engine, parent), vec![first, second]);
}

#[test]
fn test_append_child_links_nodes() {
    let (mut engine, _env, document) = setup();
    let body = body(&engine, document);
    let a = element(&mut engine, document, "a");
    let b = element(&mut engine, document, "b");
    append(&mut engine, body, a);
    append(&mut engine, body, b);

    assert_eq!(children(&engine, body), vec![a, b]);
    assert_eq!(link(&engine, body, "firstChild"), Some(a));
    assert_eq!(link(&engine, body, "lastChild"), Some(b));
    assert_eq!(link(&engine, a, "parentNode"), Some(body));
    assert_eq!(link(&engine, a, "previousSibling"), None);
    assert_eq!(link(&engine, a, "nextSibling"), Some(b));
    assert_eq!(link(&engine, b, "previousSibling"), Some(a));
    assert_eq!(link(&engine, b, "nextSibling"), None);
}

#[test]
fn test_append_child_returns_child() {
    let (mut engine, _env, document) = setup();
    let body = body(&engine, document);
    let a = element(&mut engine, document, "a");
    let returned = engine
        .call_method(body, "appendChild", &[Value::Object(a)])
        .unwrap();
    assert_eq!(returned, Value::Object(a));
}

#[test]
fn test_is_connected_follows_ancestors() {
    let (mut engine, _env, document) = setup();
    let body = body(&engine, document);
    let outer = element(&mut engine, document, "div");
    let inner = element(&mut engine, document, "span");
    append(&mut engine, outer, inner);
    assert_eq!(engine.get(inner, "isConnected").unwrap(), Value::Bool(false));

    append(&mut engine, body, outer);
    assert_eq!(engine.get(inner, "isConnected").unwrap(), Value::Bool(true));
}

#[test]
fn test_append_child_moves_node() {
    let (mut engine, _env, document) = setup();
    let first = element(&mut engine, document, "div");
    let second = element(&mut engine, document, "div");
    let child = text(&mut engine, document, "moving");

    append(&mut engine, first, child);
    append(&mut engine, second, child);

    assert!(children(&engine, first).is_empty());
    assert_eq!(children(&engine, second), vec![child]);
    assert_eq!(link(&engine, child, "parentNode"), Some(second));
    assert_eq!(engine.pin_count(child), 1);
}

#[test]
fn test_append_same_child_twice() {
    let (mut engine, _env, document) = setup();
    let parent = element(&mut engine, document, "ul");
    let a = element(&mut engine, document, "li");
    let b = element(&mut engine, document, "li");
    append(&mut engine, parent, a);
    append(&mut engine, parent, b);
    append(&mut engine, parent, a);

    assert_eq!(children(&engine, parent), vec![b, a]);
    assert_eq!(engine.pin_count(a), 1);
}

#[test]
fn test_append_child_hierarchy_errors() {
    let (mut engine, _env, document) = setup();
    let body = body(&engine, document);
    let outer = element(&mut engine, document, "div");
    let inner = element(&mut engine, document, "div");
    let leaf = text(&mut engine, document, "leaf");
    append(&mut engine, outer, inner);

    let mut attempt = |parent: ObjectId, child: Value<ObjectId>| {
        error_message(engine.call_method(parent, "appendChild", &[child]))
    };

    assert_eq!(
        attempt(inner, Value::Object(outer)),
        "Failed to execute 'appendChild' on 'Node': The new child element contains the parent."
    );
    assert_eq!(
        attempt(outer, Value::Object(outer)),
        "Failed to execute 'appendChild' on 'Node': The new child element contains the parent."
    );
    assert_eq!(
        attempt(leaf, Value::Object(outer)),
        "Failed to execute 'appendChild' on 'Node': This node type does not support this method."
    );
    assert_eq!(
        attempt(document, Value::Object(outer)),
        "Failed to execute 'appendChild' on 'Node': This node type does not support this method."
    );
    assert_eq!(
        attempt(outer, Value::Object(document)),
        "Failed to execute 'appendChild' on 'Node': Nodes of type 'Document' may not be inserted inside nodes of type 'Element'."
    );
    assert_eq!(
        attempt(outer, Value::Object(body)),
        "Failed to execute 'appendChild' on 'Node': The body element cannot be re-parented."
    );
    assert_eq!(
        attempt(outer, Value::from("div")),
        "Failed to execute 'appendChild' on 'Node': parameter 1 is not of type 'Node'."
    );
}

#[test]
fn test_append_child_without_argument() {
    let (mut engine, _env, document) = setup();
    let body = body(&engine, document);
    assert_eq!(
        error_message(engine.call_method(body, "appendChild", &[])),
        "Failed to execute 'appendChild' on 'Node': 1 argument required, but only 0 present."
    );
}

// ========== insertBefore ==========

#[test]
fn test_insert_before_orders_children() {
    let (mut engine, _env, document) = setup();
    let parent = element(&mut engine, document, "div");
    let a = element(&mut engine, document, "a");
    let b = element(&mut engine, document, "b");
    let c = element(&mut engine, document, "c");
    append(&mut engine, parent, c);
    let _ = engine
        .call_method(parent, "insertBefore", &[Value::Object(a), Value::Object(c)])
        .unwrap();
    let _ = engine
        .call_method(parent, "insertBefore", &[Value::Object(b), Value::Object(c)])
        .unwrap();

    assert_eq!(children(&engine, parent), vec![a, b, c]);
}

#[test]
fn test_insert_before_null_appends() {
    let (mut engine, _env, document) = setup();
    let parent = element(&mut engine, document, "div");
    let a = element(&mut engine, document, "a");
    let b = element(&mut engine, document, "b");
    append(&mut engine, parent, a);
    let _ = engine
        .call_method(parent, "insertBefore", &[Value::Object(b), Value::Null])
        .unwrap();
    assert_eq!(children(&engine, parent), vec![a, b]);
}

#[test]
fn test_insert_before_itself_keeps_position() {
    let (mut engine, _env, document) = setup();
    let parent = element(&mut engine, document, "div");
    let a = element(&mut engine, document, "a");
    let b = element(&mut engine, document, "b");
    let c = element(&mut engine, document, "c");
    for child in [a, b, c] {
        append(&mut engine, parent, child);
    }
    let _ = engine
        .call_method(parent, "insertBefore", &[Value::Object(b), Value::Object(b)])
        .unwrap();
    assert_eq!(children(&engine, parent), vec![a, b, c]);
    assert_eq!(engine.pin_count(b), 1);
}

#[test]
fn test_insert_before_errors() {
    let (mut engine, _env, document) = setup();
    let parent = element(&mut engine, document, "div");
    let stranger = element(&mut engine, document, "p");
    let child = element(&mut engine, document, "a");

    assert_eq!(
        error_message(engine.call_method(
            parent,
            "insertBefore",
            &[Value::Object(child), Value::Object(stranger)]
        )),
        "Failed to execute 'insertBefore' on 'Node': The node before which the new node is to be inserted is not a child of this node."
    );
    assert_eq!(
        error_message(engine.call_method(parent, "insertBefore", &[Value::Object(child)])),
        "Failed to execute 'insertBefore' on 'Node': 2 arguments required, but only 1 present."
    );
    assert!(children(&engine, parent).is_empty());
}

// ========== removeChild / remove ==========

#[test]
fn test_remove_child() {
    let (mut engine, _env, document) = setup();
    let parent = element(&mut engine, document, "div");
    let child = element(&mut engine, document, "span");
    append(&mut engine, parent, child);

    let removed = engine
        .call_method(parent, "removeChild", &[Value::Object(child)])
        .unwrap();
    assert_eq!(removed, Value::Object(child));
    assert!(children(&engine, parent).is_empty());
    assert_eq!(link(&engine, child, "parentNode"), None);
    assert_eq!(engine.pin_count(child), 0);
}

#[test]
fn test_remove_child_requires_a_child() {
    let (mut engine, _env, document) = setup();
    let parent = element(&mut engine, document, "div");
    let other = element(&mut engine, document, "span");
    assert_eq!(
        error_message(engine.call_method(parent, "removeChild", &[Value::Object(other)])),
        "Failed to execute 'removeChild' on 'Node': The node to be removed is not a child of this node."
    );
}

#[test]
fn test_remove_detaches_and_is_idempotent() {
    let (mut engine, _env, document) = setup();
    let parent = element(&mut engine, document, "div");
    let child = text(&mut engine, document, "x");
    append(&mut engine, parent, child);

    assert_eq!(engine.call_method(child, "remove", &[]).unwrap(), Value::Undefined);
    assert!(children(&engine, parent).is_empty());
    assert_eq!(engine.call_method(child, "remove", &[]).unwrap(), Value::Undefined);
    assert_eq!(engine.pin_count(child), 0);
}

// ========== textContent ==========

#[test]
fn test_text_content_concatenates_descendant_text() {
    let (mut engine, _env, document) = setup();
    let div = element(&mut engine, document, "div");
    let span = element(&mut engine, document, "span");
    let first = text(&mut engine, document, "Hello, ");
    let second = text(&mut engine, document, "world");
    let comment = engine
        .call_method(document, "createComment", &[Value::from("hidden")])
        .map(common::object)
        .unwrap();

    append(&mut engine, div, first);
    append(&mut engine, div, span);
    append(&mut engine, span, second);
    append(&mut engine, div, comment);

    assert_eq!(string(&engine, div, "textContent"), "Hello, world");
    assert_eq!(string(&engine, comment, "textContent"), "hidden");
}

// ========== host commands ==========

#[test]
fn test_mutations_record_commands() {
    let (mut engine, env, document) = setup();
    let body = body(&engine, document);
    let div = element(&mut engine, document, "div");
    let words = text(&mut engine, document, "hi");
    append(&mut engine, body, div);
    append(&mut engine, div, words);
    let _ = engine
        .call_method(div, "removeChild", &[Value::Object(words)])
        .unwrap();

    assert_eq!(
        env.take_commands(),
        vec![
            UiCommand::CreateElement {
                target_id: 1,
                tag_name: "div".to_string(),
            },
            UiCommand::CreateTextNode {
                target_id: 2,
                data: "hi".to_string(),
            },
            UiCommand::InsertChild {
                parent: BODY_TARGET_ID,
                child: 1,
                before: None,
            },
            UiCommand::InsertChild {
                parent: 1,
                child: 2,
                before: None,
            },
            UiCommand::RemoveChild {
                parent: 1,
                child: 2,
            },
        ]
    );
}

#[test]
fn test_move_records_remove_then_insert() {
    let (mut engine, env, document) = setup();
    let first = element(&mut engine, document, "div");
    let second = element(&mut engine, document, "div");
    let child = element(&mut engine, document, "p");
    append(&mut engine, first, child);
    let _ = env.take_commands();

    let _ = engine
        .call_method(second, "insertBefore", &[Value::Object(child), Value::Undefined])
        .unwrap();
    assert_eq!(
        env.take_commands(),
        vec![
            UiCommand::RemoveChild {
                parent: 1,
                child: 3,
            },
            UiCommand::InsertChild {
                parent: 2,
                child: 3,
                before: None,
            },
        ]
    );
}
