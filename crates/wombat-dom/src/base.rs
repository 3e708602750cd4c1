//! Shared `Node` behaviour.
//!
//! [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
//!
//! Concrete kinds answer their own names first and fall back to these.

use crate::command::BODY_TARGET_ID;
use crate::dispatch::DispatchContext;
use crate::engine::EngineTypes;
use crate::interner::Atom;
use crate::kind::ClassKind;
use crate::node::{NodeData, NodeInstance};
use crate::string::DomString;
use crate::value::Value;

/// Read one of the base `Node` names.
pub(crate) fn get_property<T: EngineTypes>(
    node: &NodeInstance<T>,
    cx: &DispatchContext<'_, T>,
    name: Atom,
) -> Option<Value<T::Object>> {
    let names = cx.names();
    if name == names.node_type {
        Some(Value::Number(f64::from(node.data().node_type())))
    } else if name == names.parent_node {
        let parent = node.parent();
        Some(Value::from_object(
            parent.and_then(|parent| parent.borrow().object().cloned()),
        ))
    } else if name == names.first_child {
        Some(Value::from_object(
            node.children().first().map(|child| child.object().clone()),
        ))
    } else if name == names.last_child {
        Some(Value::from_object(
            node.children().last().map(|child| child.object().clone()),
        ))
    } else if name == names.previous_sibling {
        Some(Value::from_object(sibling(node, false)))
    } else if name == names.next_sibling {
        Some(Value::from_object(sibling(node, true)))
    } else if name == names.child_nodes {
        // A snapshot array, not a live `NodeList`: each read builds a new
        // list that later mutations do not update.
        Some(Value::List(
            node.children()
                .iter()
                .map(|child| Value::Object(child.object().clone()))
                .collect(),
        ))
    } else if name == names.is_connected {
        Some(Value::Bool(is_connected(node)))
    } else if name == names.text_content {
        Some(text_content(node))
    } else {
        names
            .find_method(ClassKind::Node.own_methods(), name)
            .map(Value::Method)
    }
}

/// [§ 4.4 previousSibling / nextSibling](https://dom.spec.whatwg.org/#dom-node-nextsibling)
fn sibling<T: EngineTypes>(node: &NodeInstance<T>, forward: bool) -> Option<T::Object> {
    let parent = node.parent()?;
    let parent = parent.borrow();
    let children = parent.children();
    let index = children.position_of(node.target_id())?;
    let sibling = if forward {
        children.get(index + 1)
    } else {
        index.checked_sub(1).and_then(|index| children.get(index))
    }?;
    Some(sibling.object().clone())
}

/// [§ 4.4 isConnected](https://dom.spec.whatwg.org/#dom-node-isconnected)
///
/// The body is the document's only child in this tree, so a node is
/// connected when the document or the body is among its inclusive ancestors.
fn is_connected<T: EngineTypes>(node: &NodeInstance<T>) -> bool {
    if node.kind() == ClassKind::Document || node.target_id() == BODY_TARGET_ID {
        return true;
    }
    let mut current = node.parent();
    while let Some(ancestor) = current {
        let ancestor = ancestor.borrow();
        if ancestor.target_id() == BODY_TARGET_ID {
            return true;
        }
        current = ancestor.parent();
    }
    false
}

/// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
fn text_content<T: EngineTypes>(node: &NodeInstance<T>) -> Value<T::Object> {
    match node.data() {
        NodeData::Document(_) => Value::Null,
        NodeData::Text(_) | NodeData::Comment(_) => node
            .data()
            .character_data()
            .map_or(Value::Null, |data| Value::String(data.clone())),
        NodeData::Element(_) => {
            let mut units = Vec::new();
            collect_text(node, &mut units);
            Value::String(DomString::from(units))
        }
    }
}

/// Concatenate descendant text nodes in tree order.
fn collect_text<T: EngineTypes>(node: &NodeInstance<T>, out: &mut Vec<u16>) {
    for child in node.children() {
        let child = child.node().borrow();
        match child.data() {
            NodeData::Text(text) => out.extend_from_slice(text.data().as_utf16()),
            NodeData::Element(_) => collect_text(&child, out),
            NodeData::Document(_) | NodeData::Comment(_) => {}
        }
    }
}
