//! Shared helpers for driving the heap engine like a script would.

#![allow(dead_code)]

use std::rc::Rc;

use wombat_dom::heap::{HeapEngine, HeapValue, ObjectId};
use wombat_dom::{Environment, Value};

pub type Env = Rc<Environment<HeapEngine>>;

/// A bootstrapped engine, its environment and the document object.
pub fn setup() -> (HeapEngine, Env, ObjectId) {
    let mut engine = HeapEngine::new();
    let env = Environment::new();
    let document = env.bootstrap(&mut engine).expect("bootstrap");
    (engine, env, document)
}

pub fn object(value: HeapValue) -> ObjectId {
    match value {
        Value::Object(id) => id,
        other => panic!("expected an object, got {other:?}"),
    }
}

pub fn body(engine: &HeapEngine, document: ObjectId) -> ObjectId {
    object(engine.get(document, "body").expect("document.body"))
}

/// `document.createElement(tag)`
pub fn element(engine: &mut HeapEngine, document: ObjectId, tag: &str) -> ObjectId {
    object(
        engine
            .call_method(document, "createElement", &[Value::from(tag)])
            .expect("createElement"),
    )
}

/// `document.createTextNode(data)`
pub fn text(engine: &mut HeapEngine, document: ObjectId, data: &str) -> ObjectId {
    object(
        engine
            .call_method(document, "createTextNode", &[Value::from(data)])
            .expect("createTextNode"),
    )
}

/// `parent.appendChild(child)`
pub fn append(engine: &mut HeapEngine, parent: ObjectId, child: ObjectId) {
    let _ = engine
        .call_method(parent, "appendChild", &[Value::Object(child)])
        .expect("appendChild");
}

pub fn string(engine: &HeapEngine, object: ObjectId, name: &str) -> String {
    match engine.get(object, name).expect("get") {
        Value::String(text) => text.to_string(),
        other => panic!("expected {name} to be a string, got {other:?}"),
    }
}

pub fn error_message(result: Result<impl std::fmt::Debug, wombat_dom::BindingError>) -> String {
    result.expect_err("expected an error").to_string()
}
