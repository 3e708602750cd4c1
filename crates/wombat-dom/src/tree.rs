//! Tree mutation.
//!
//! [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
//!
//! A parent pins each of its children and a child refers to its parent
//! weakly, so native ownership always points down the tree. The child also
//! records its parent's script object as a collector edge. Moving a node
//! releases the old parent's pin before the new parent takes its own.

use std::rc::Rc;

use crate::command::{BODY_TARGET_ID, UiCommand};
use crate::engine::{EngineTypes, NodeRef, ScriptEngine};
use crate::environment::Environment;
use crate::error::BindingError;
use crate::kind::{ClassKind, Method};
use crate::node::Pinned;

/// [§ 4.2.3 pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
///
/// Insert `child` into `parent` before `reference`, or at the end when
/// `reference` is `None`.
pub(crate) fn insert_before<E, T>(
    env: &Environment<T>,
    engine: &mut E,
    method: Method,
    parent: &NodeRef<T>,
    child: &NodeRef<T>,
    reference: Option<&NodeRef<T>>,
) -> Result<(), BindingError>
where
    E: ScriptEngine<Types = T>,
    T: EngineTypes,
{
    ensure_pre_insert_validity(method, parent, child, reference)?;

    // "If referenceChild is node, then set referenceChild to node's next sibling."
    let reference = match reference {
        Some(reference) if Rc::ptr_eq(reference, child) => next_sibling(child),
        Some(reference) => Some(Rc::clone(reference)),
        None => None,
    };

    // Moving within the same parent keeps the existing pin.
    let entry = match take_from_parent(env, child) {
        Some((old_parent, pinned)) if Rc::ptr_eq(&old_parent, parent) => pinned,
        previous => {
            drop(previous);
            Pinned::new(engine, child)?
        }
    };

    let before = reference.as_ref().map(|reference| reference.borrow().target_id());
    {
        let mut parent_node = parent.borrow_mut();
        let index = match &reference {
            Some(reference) => parent_node.children().position(reference).ok_or_else(|| {
                BindingError::LifetimeViolation(
                    "reference child vanished during insertion".to_string(),
                )
            })?,
            None => parent_node.children().len(),
        };
        parent_node.children_mut().insert(index, entry);
    }
    child.borrow_mut().set_parent(Some(parent));

    let parent_id = parent.borrow().target_id();
    let child_id = child.borrow().target_id();
    tracing::debug!(parent = parent_id, child = child_id, ?before, "inserted child");
    env.record(UiCommand::InsertChild {
        parent: parent_id,
        child: child_id,
        before,
    });
    Ok(())
}

/// [§ 4.2.3 pre-remove](https://dom.spec.whatwg.org/#concept-node-pre-remove)
pub(crate) fn remove_child<T: EngineTypes>(
    env: &Environment<T>,
    parent: &NodeRef<T>,
    child: &NodeRef<T>,
) -> Result<(), BindingError> {
    if !is_parent_of(parent, child) {
        return Err(BindingError::Hierarchy(
            "Failed to execute 'removeChild' on 'Node': The node to be removed is not a child of this node."
                .to_string(),
        ));
    }
    let _ = detach(env, child);
    Ok(())
}

/// Detach `child` from its parent, releasing the parent's pin on it.
///
/// Returns `false` if `child` had no parent.
pub(crate) fn detach<T: EngineTypes>(env: &Environment<T>, child: &NodeRef<T>) -> bool {
    // Dropping the returned pin unpins, after every borrow is released.
    take_from_parent(env, child).is_some()
}

/// Unlink `child` from its parent, handing back the old parent and its pin.
fn take_from_parent<T: EngineTypes>(
    env: &Environment<T>,
    child: &NodeRef<T>,
) -> Option<(NodeRef<T>, Pinned<T>)> {
    let parent = child.borrow().parent()?;
    let released = parent.borrow_mut().children_mut().remove(child);
    child.borrow_mut().set_parent(None);

    let parent_id = parent.borrow().target_id();
    let child_id = child.borrow().target_id();
    tracing::debug!(parent = parent_id, child = child_id, "removed child");
    env.record(UiCommand::RemoveChild {
        parent: parent_id,
        child: child_id,
    });
    released.map(|pinned| (parent, pinned))
}

fn ensure_pre_insert_validity<T: EngineTypes>(
    method: Method,
    parent: &NodeRef<T>,
    child: &NodeRef<T>,
    reference: Option<&NodeRef<T>>,
) -> Result<(), BindingError> {
    let op = method.name();
    let hierarchy =
        |reason: &str| BindingError::Hierarchy(format!("Failed to execute '{op}' on 'Node': {reason}"));

    if parent.borrow().kind() != ClassKind::Element {
        return Err(hierarchy("This node type does not support this method."));
    }
    {
        let child = child.borrow();
        if child.kind() == ClassKind::Document {
            return Err(hierarchy(
                "Nodes of type 'Document' may not be inserted inside nodes of type 'Element'.",
            ));
        }
        if child.target_id() == BODY_TARGET_ID {
            return Err(hierarchy("The body element cannot be re-parented."));
        }
    }
    if is_inclusive_ancestor(child, parent) {
        return Err(hierarchy("The new child element contains the parent."));
    }
    if let Some(reference) = reference
        && !is_parent_of(parent, reference)
    {
        return Err(hierarchy(
            "The node before which the new node is to be inserted is not a child of this node.",
        ));
    }
    Ok(())
}

/// Whether `ancestor` is `node` or one of its ancestors.
fn is_inclusive_ancestor<T: EngineTypes>(ancestor: &NodeRef<T>, node: &NodeRef<T>) -> bool {
    let mut current = Some(Rc::clone(node));
    while let Some(candidate) = current {
        if Rc::ptr_eq(&candidate, ancestor) {
            return true;
        }
        current = candidate.borrow().parent();
    }
    false
}

fn is_parent_of<T: EngineTypes>(parent: &NodeRef<T>, node: &NodeRef<T>) -> bool {
    node.borrow()
        .parent()
        .is_some_and(|actual| Rc::ptr_eq(&actual, parent))
}

fn next_sibling<T: EngineTypes>(node: &NodeRef<T>) -> Option<NodeRef<T>> {
    let parent = node.borrow().parent()?;
    let parent = parent.borrow();
    let index = parent.children().position(node)?;
    parent.children().get(index + 1).map(|entry| Rc::clone(entry.node()))
}
