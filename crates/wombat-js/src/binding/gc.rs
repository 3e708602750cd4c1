//! Data carried by Boa objects and native function captures.
//!
//! A script object owns its native node through a [`NodeSlot`]. The node in
//! turn holds a handle back to that object, a handle to its parent's object
//! while attached, and two handles per pin (the pinned object and the pin
//! itself). The slot traces all of them, so cycles through native data are
//! internal to the heap: a script reference to a child keeps its parent
//! alive, and an unreferenced subtree is reclaimed in one collection.
//!
//! The slot gives the node up in its finalizer, while every handle is still
//! valid.
#![allow(unsafe_code)]

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use boa_engine::{JsData, JsNativeError, JsObject, JsResult};
use boa_gc::{Finalize, Trace};
use wombat_common::warning::warn_once;
use wombat_dom::{Atom, BindingError, ClassKind, Environment, Method, NodeRef};

use super::Boa;

/// Private data of every DOM object.
#[derive(JsData)]
pub(crate) struct NodeSlot {
    node: RefCell<Option<NodeRef<Boa>>>,
}

impl NodeSlot {
    pub(crate) fn new(node: NodeRef<Boa>) -> Self {
        Self {
            node: RefCell::new(Some(node)),
        }
    }

    /// The native node behind `object`, if it is a DOM object.
    pub(crate) fn node_of(object: &JsObject) -> Option<NodeRef<Boa>> {
        let slot = object.downcast_ref::<Self>()?;
        slot.node.borrow().clone()
    }
}

// SAFETY: every handle marked here is stored by value in this slot's own
// instance, and each is marked exactly once. Handles inside other instances
// (reached through `Rc`) belong to those instances' slots and are not
// followed. A node borrowed mutably during collection is skipped whole,
// which keeps all of its handles counted as roots for the round.
unsafe impl Trace for NodeSlot {
    boa_gc::custom_trace!(this, mark, {
        if let Ok(slot) = this.node.try_borrow()
            && let Some(node) = slot.as_ref()
            && let Ok(instance) = node.try_borrow()
        {
            if let Some(object) = instance.object() {
                mark(object);
            }
            if let Some(parent) = instance.parent_object() {
                mark(parent);
            }
            for pinned in instance.pins() {
                mark(pinned.object());
                mark(pinned.pin().object());
            }
        }
    });
}

impl Finalize for NodeSlot {
    fn finalize(&self) {
        let Ok(mut slot) = self.node.try_borrow_mut() else {
            let _ = warn_once("GC", "node slot finalized while borrowed; node kept alive");
            return;
        };
        let released = slot.take();
        drop(slot);
        if let Some(node) = released {
            tracing::trace!(target_id = node.borrow().target_id(), "releasing node from script object");
        }
    }
}

/// Shared by every native function bound to a DOM class.
#[derive(Trace, Finalize)]
pub(crate) struct ClassCapture {
    #[unsafe_ignore_trace]
    env: Weak<Environment<Boa>>,
    #[unsafe_ignore_trace]
    kind: ClassKind,
}

impl ClassCapture {
    pub(crate) fn new(env: &Weak<Environment<Boa>>, kind: ClassKind) -> Self {
        Self {
            env: env.clone(),
            kind,
        }
    }

    pub(crate) const fn kind(&self) -> ClassKind {
        self.kind
    }

    pub(crate) fn environment(&self) -> JsResult<Rc<Environment<Boa>>> {
        upgrade(&self.env)
    }
}

/// Capture of a native accessor.
#[derive(Trace, Finalize)]
pub(crate) struct PropertyCapture {
    #[unsafe_ignore_trace]
    env: Weak<Environment<Boa>>,
    #[unsafe_ignore_trace]
    name: Atom,
}

impl PropertyCapture {
    pub(crate) fn new(env: &Weak<Environment<Boa>>, name: Atom) -> Self {
        Self {
            env: env.clone(),
            name,
        }
    }

    pub(crate) const fn name(&self) -> Atom {
        self.name
    }

    pub(crate) fn environment(&self) -> JsResult<Rc<Environment<Boa>>> {
        upgrade(&self.env)
    }
}

/// Capture of a native method.
#[derive(Trace, Finalize)]
pub(crate) struct MethodCapture {
    #[unsafe_ignore_trace]
    env: Weak<Environment<Boa>>,
    #[unsafe_ignore_trace]
    method: Method,
}

impl MethodCapture {
    pub(crate) fn new(env: &Weak<Environment<Boa>>, method: Method) -> Self {
        Self {
            env: env.clone(),
            method,
        }
    }

    pub(crate) const fn method(&self) -> Method {
        self.method
    }

    pub(crate) fn environment(&self) -> JsResult<Rc<Environment<Boa>>> {
        upgrade(&self.env)
    }
}

fn upgrade(env: &Weak<Environment<Boa>>) -> JsResult<Rc<Environment<Boa>>> {
    env.upgrade().ok_or_else(|| {
        JsNativeError::typ()
            .with_message(BindingError::EnvironmentGone.to_string())
            .into()
    })
}
