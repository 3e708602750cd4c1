//! A small deterministic reference engine.
//!
//! [`HeapEngine`] implements [`ScriptEngine`] over an object table with an
//! explicit mark-and-sweep collector. It has no parser: tests and hosts drive
//! it through [`HeapEngine::get`], [`HeapEngine::set`],
//! [`HeapEngine::call_method`] and [`HeapEngine::construct`], exactly the way
//! a script engine's property hooks would.
//!
//! Unlike a production engine it makes the object lifecycle observable: every
//! pin and unpin is logged, and [`HeapEngine::lifecycle`] reports whether an
//! object is retained, collectible or already destroyed.
//!
//! # Roots
//!
//! - globals
//! - the local stack ([`HeapEngine::hold`])
//! - pins held outside the heap (the environment's pin on the document)
//! - class constructors
//!
//! A node's own handle is stored on the native side only, so it is never a
//! root. The pins a node holds and its parent link are traced as edges of
//! the node's object ([`NodeInstance::edges`](crate::NodeInstance::edges)):
//! a pinned child survives while its parent is reachable, and a script
//! reference to the child keeps the parent reachable in turn.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::dispatch::SetOutcome;
use crate::engine::{EngineTypes, NodeRef, ScriptEngine};
use crate::environment::Environment;
use crate::error::BindingError;
use crate::kind::ClassKind;
use crate::node::Lifecycle;
use crate::value::Value;

/// Handle to an object in a [`HeapEngine`]. Ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a class registered in a [`HeapEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(usize);

/// A value in the heap engine.
pub type HeapValue = Value<ObjectId>;

/// One entry of the pin log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvent {
    /// A pin was taken.
    Pinned(ObjectId),
    /// A pin was released.
    Unpinned(ObjectId),
}

/// Pin counts shared between the engine and outstanding [`HeapPin`]s.
#[derive(Debug, Default)]
struct PinLedger {
    counts: RefCell<HashMap<ObjectId, usize>>,
    events: RefCell<Vec<PinEvent>>,
}

impl PinLedger {
    fn acquire(&self, object: ObjectId) {
        *self.counts.borrow_mut().entry(object).or_insert(0) += 1;
        self.events.borrow_mut().push(PinEvent::Pinned(object));
    }

    fn release(&self, object: ObjectId) {
        let mut counts = self.counts.borrow_mut();
        match counts.get_mut(&object) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                let _ = counts.remove(&object);
            }
            None => {
                let error = BindingError::LifetimeViolation(format!("{object} unpinned while not pinned"));
                tracing::error!(%error);
                debug_assert!(false, "{error}");
                return;
            }
        }
        self.events.borrow_mut().push(PinEvent::Unpinned(object));
    }

    fn count(&self, object: ObjectId) -> usize {
        self.counts.borrow().get(&object).copied().unwrap_or(0)
    }

    fn snapshot(&self) -> Vec<(ObjectId, usize)> {
        self.counts
            .borrow()
            .iter()
            .map(|(&object, &count)| (object, count))
            .collect()
    }
}

/// A pin in a [`HeapEngine`]. Released on drop.
pub struct HeapPin {
    ledger: Rc<PinLedger>,
    object: ObjectId,
}

impl fmt::Debug for HeapPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HeapPin").field(&self.object).finish()
    }
}

impl Drop for HeapPin {
    fn drop(&mut self) {
        self.ledger.release(self.object);
    }
}

enum Payload {
    Node(NodeRef<HeapEngine>),
    Constructor(ClassId),
    Plain,
}

struct HeapObject {
    payload: Payload,
    fields: BTreeMap<String, HeapValue>,
}

struct ClassRecord {
    kind: ClassKind,
    parent: Option<ClassId>,
    env: Weak<Environment<HeapEngine>>,
    constructor: ObjectId,
}

/// Deterministic reference engine.
#[derive(Default)]
pub struct HeapEngine {
    objects: HashMap<ObjectId, HeapObject>,
    next_object: u64,
    classes: Vec<ClassRecord>,
    globals: BTreeMap<String, HeapValue>,
    locals: Vec<HeapValue>,
    ledger: Rc<PinLedger>,
}

impl EngineTypes for HeapEngine {
    type Object = ObjectId;
    type Class = ClassId;
    type Pin = HeapPin;
}

impl HeapEngine {
    /// An empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, payload: Payload) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        let _ = self.objects.insert(
            id,
            HeapObject {
                payload,
                fields: BTreeMap::new(),
            },
        );
        id
    }

    /// Allocate a plain script object with no native data.
    pub fn create_object(&mut self) -> ObjectId {
        self.allocate(Payload::Plain)
    }

    fn object(&self, id: ObjectId) -> Result<&HeapObject, BindingError> {
        self.objects.get(&id).ok_or_else(|| {
            BindingError::LifetimeViolation(format!("{id} used after it was collected"))
        })
    }

    fn environment_of(&self, node: &NodeRef<Self>) -> Result<Rc<Environment<Self>>, BindingError> {
        let class = *node.borrow().class().handle();
        self.classes
            .get(class.0)
            .and_then(|record| record.env.upgrade())
            .ok_or(BindingError::EnvironmentGone)
    }

    /// A global binding, `undefined` if absent.
    #[must_use]
    pub fn global(&self, name: &str) -> HeapValue {
        self.globals.get(name).cloned().unwrap_or(Value::Undefined)
    }

    /// Delete a global binding, as `delete globalThis.name` would.
    pub fn remove_global(&mut self, name: &str) -> Option<HeapValue> {
        self.globals.remove(name)
    }

    /// Push a value onto the local root stack, as a script variable would.
    pub fn hold(&mut self, value: HeapValue) {
        self.locals.push(value);
    }

    /// Drop every local root, as returning from a script scope would.
    pub fn release_locals(&mut self) {
        self.locals.clear();
    }

    /// `object[name]`.
    ///
    /// Native properties shadow plain fields; unknown names read as
    /// `undefined`.
    ///
    /// # Errors
    ///
    /// [`BindingError::LifetimeViolation`] if `object` was collected.
    pub fn get(&self, object: ObjectId, name: &str) -> Result<HeapValue, BindingError> {
        let entry = self.object(object)?;
        if let Payload::Node(node) = &entry.payload
            && let Some(value) = self.environment_of(node)?.get_property(node, name)
        {
            return Ok(value);
        }
        Ok(entry.fields.get(name).cloned().unwrap_or(Value::Undefined))
    }

    /// `object[name] = value`.
    ///
    /// # Errors
    ///
    /// Whatever a native setter reports, or
    /// [`BindingError::LifetimeViolation`] if `object` was collected.
    pub fn set(&mut self, object: ObjectId, name: &str, value: HeapValue) -> Result<(), BindingError> {
        if let Some(node) = self.private_data(&object) {
            let env = self.environment_of(&node)?;
            if env.set_property(&node, name, &value)? == SetOutcome::Handled {
                return Ok(());
            }
        }
        let entry = self.objects.get_mut(&object).ok_or_else(|| {
            BindingError::LifetimeViolation(format!("{object} used after it was collected"))
        })?;
        let _ = entry.fields.insert(name.to_string(), value);
        Ok(())
    }

    /// Enumerable keys: native names first, then plain fields.
    ///
    /// # Errors
    ///
    /// [`BindingError::LifetimeViolation`] if `object` was collected.
    pub fn keys(&self, object: ObjectId) -> Result<Vec<String>, BindingError> {
        let entry = self.object(object)?;
        let mut keys: Vec<String> = match &entry.payload {
            Payload::Node(node) => self
                .environment_of(node)?
                .property_names(node)
                .into_iter()
                .map(str::to_string)
                .collect(),
            Payload::Constructor(_) | Payload::Plain => Vec::new(),
        };
        for key in entry.fields.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        Ok(keys)
    }

    /// `object[name](...args)`.
    ///
    /// # Errors
    ///
    /// [`BindingError::Argument`] if `object[name]` is not a native method,
    /// otherwise whatever the method reports.
    pub fn call_method(
        &mut self,
        object: ObjectId,
        name: &str,
        args: &[HeapValue],
    ) -> Result<HeapValue, BindingError> {
        let Value::Method(method) = self.get(object, name)? else {
            return Err(BindingError::Argument(format!("{name} is not a function")));
        };
        let node = self
            .private_data(&object)
            .ok_or_else(|| BindingError::Argument("Illegal invocation".to_string()))?;
        let env = self.environment_of(&node)?;
        env.call_method(self, &node, method, args)
    }

    /// `new globalThis[constructor](...args)`.
    ///
    /// # Errors
    ///
    /// [`BindingError::Argument`] if the global is not one of our
    /// constructors, otherwise whatever the constructor reports.
    pub fn construct(&mut self, constructor: &str, args: &[HeapValue]) -> Result<ObjectId, BindingError> {
        let not_a_constructor = || BindingError::Argument(format!("{constructor} is not a constructor"));
        let Value::Object(id) = self.global(constructor) else {
            return Err(not_a_constructor());
        };
        let &Payload::Constructor(class) = &self.object(id)?.payload else {
            return Err(not_a_constructor());
        };
        let record = self.classes.get(class.0).ok_or_else(not_a_constructor)?;
        let kind = record.kind;
        let env = record.env.upgrade().ok_or(BindingError::EnvironmentGone)?;
        env.construct(self, kind, args)
    }

    /// `object instanceof globalThis[constructor]`.
    #[must_use]
    pub fn instance_of(&self, object: ObjectId, constructor: &str) -> bool {
        let Value::Object(constructor) = self.global(constructor) else {
            return false;
        };
        let Some(node) = self.private_data(&object) else {
            return false;
        };
        let mut class = Some(*node.borrow().class().handle());
        while let Some(current) = class {
            let Some(record) = self.classes.get(current.0) else {
                return false;
            };
            if record.constructor == constructor {
                return true;
            }
            class = record.parent;
        }
        false
    }

    /// Run one mark-and-sweep cycle. Returns the number of objects freed.
    ///
    /// Finalizing a node drops its native instance, which releases every pin
    /// it held. An unreferenced subtree is freed as a whole, since the pins
    /// inside it are edges rather than roots.
    pub fn collect(&mut self) -> usize {
        let mut marked = HashSet::new();
        let mut pending: Vec<ObjectId> = Vec::new();
        for value in self.globals.values().chain(&self.locals) {
            push_objects(value, &mut pending);
        }
        pending.extend(self.external_pins());
        pending.extend(self.classes.iter().map(|class| class.constructor));

        while let Some(id) = pending.pop() {
            if !marked.insert(id) {
                continue;
            }
            let Some(object) = self.objects.get(&id) else {
                continue;
            };
            for value in object.fields.values() {
                push_objects(value, &mut pending);
            }
            if let Payload::Node(node) = &object.payload {
                pending.extend(node.borrow().edges().copied());
            }
        }

        let garbage: Vec<ObjectId> = self
            .objects
            .keys()
            .filter(|id| !marked.contains(*id))
            .copied()
            .collect();
        let freed: Vec<HeapObject> = garbage
            .iter()
            .filter_map(|id| self.objects.remove(id))
            .collect();
        let count = freed.len();
        tracing::debug!(freed = count, live = self.objects.len(), "heap collection");
        // Finalizers run here, after the table is consistent again.
        drop(freed);
        count
    }

    /// Pinned objects with at least one pin not held by a node in the heap.
    fn external_pins(&self) -> Vec<ObjectId> {
        let mut held: HashMap<ObjectId, usize> = HashMap::new();
        for object in self.objects.values() {
            if let Payload::Node(node) = &object.payload {
                for pinned in node.borrow().pins() {
                    *held.entry(*pinned.object()).or_insert(0) += 1;
                }
            }
        }
        self.ledger
            .snapshot()
            .into_iter()
            .filter(|(object, count)| *count > held.get(object).copied().unwrap_or(0))
            .map(|(object, _)| object)
            .collect()
    }

    /// Collect until a cycle frees nothing. Returns the total freed.
    pub fn collect_all(&mut self) -> usize {
        let mut total = 0;
        loop {
            let freed = self.collect();
            if freed == 0 {
                return total;
            }
            total += freed;
        }
    }

    /// Lifecycle state of `object`.
    #[must_use]
    pub fn lifecycle(&self, object: ObjectId) -> Lifecycle {
        let Some(entry) = self.objects.get(&object) else {
            return Lifecycle::Destroyed;
        };
        if let Payload::Node(node) = &entry.payload
            && !node.borrow().is_bound()
        {
            return Lifecycle::Constructed;
        }
        if self.ledger.count(object) > 0 {
            Lifecycle::Retained
        } else {
            Lifecycle::Collectible
        }
    }

    /// Outstanding pins on `object`.
    #[must_use]
    pub fn pin_count(&self, object: ObjectId) -> usize {
        self.ledger.count(object)
    }

    /// Every pin and unpin so far, in order.
    #[must_use]
    pub fn pin_events(&self) -> Vec<PinEvent> {
        self.ledger.events.borrow().clone()
    }

    /// Number of live objects, constructors included.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Whether `object` has not been collected.
    #[must_use]
    pub fn is_alive(&self, object: ObjectId) -> bool {
        self.objects.contains_key(&object)
    }
}

fn push_objects(value: &HeapValue, out: &mut Vec<ObjectId>) {
    match value {
        Value::Object(id) => out.push(*id),
        Value::List(items) => {
            for item in items {
                push_objects(item, out);
            }
        }
        Value::Undefined
        | Value::Null
        | Value::Bool(_)
        | Value::Number(_)
        | Value::String(_)
        | Value::Method(_) => {}
    }
}

impl ScriptEngine for HeapEngine {
    type Types = Self;

    fn create_class(
        &mut self,
        kind: ClassKind,
        parent: Option<&ClassId>,
        env: &Weak<Environment<Self>>,
    ) -> Result<ClassId, BindingError> {
        let class = ClassId(self.classes.len());
        let constructor = self.allocate(Payload::Constructor(class));
        self.classes.push(ClassRecord {
            kind,
            parent: parent.copied(),
            env: env.clone(),
            constructor,
        });
        Ok(class)
    }

    fn class_object(&self, class: &ClassId) -> ObjectId {
        self.classes[class.0].constructor
    }

    fn create_instance(&mut self, _class: &ClassId, node: NodeRef<Self>) -> Result<ObjectId, BindingError> {
        Ok(self.allocate(Payload::Node(node)))
    }

    fn private_data(&self, object: &ObjectId) -> Option<NodeRef<Self>> {
        match &self.objects.get(object)?.payload {
            Payload::Node(node) => Some(Rc::clone(node)),
            Payload::Constructor(_) | Payload::Plain => None,
        }
    }

    fn pin(&mut self, object: &ObjectId) -> HeapPin {
        self.ledger.acquire(*object);
        HeapPin {
            ledger: Rc::clone(&self.ledger),
            object: *object,
        }
    }

    fn set_global(&mut self, name: &str, value: HeapValue) -> Result<(), BindingError> {
        let _ = self.globals.insert(name.to_string(), value);
        Ok(())
    }
}

impl fmt::Debug for HeapEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapEngine")
            .field("objects", &self.objects.len())
            .field("classes", &self.classes.len())
            .field("globals", &self.globals.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_objects_are_collected_when_unrooted() {
        let mut engine = HeapEngine::new();
        let kept = engine.create_object();
        let dropped = engine.create_object();
        engine.hold(Value::Object(kept));
        assert_eq!(engine.collect(), 1);
        assert!(engine.is_alive(kept));
        assert!(!engine.is_alive(dropped));
        assert_eq!(engine.lifecycle(dropped), Lifecycle::Destroyed);
    }

    #[test]
    fn test_fields_are_traced() {
        let mut engine = HeapEngine::new();
        let outer = engine.create_object();
        let inner = engine.create_object();
        engine.set(outer, "inner", Value::Object(inner)).unwrap();
        engine.set_global("outer", Value::Object(outer)).unwrap();
        assert_eq!(engine.collect(), 0);
        assert!(engine.is_alive(inner));
    }

    #[test]
    fn test_pins_are_roots_until_dropped() {
        let mut engine = HeapEngine::new();
        let object = engine.create_object();
        let pin = engine.pin(&object);
        assert_eq!(engine.collect(), 0);
        assert_eq!(engine.lifecycle(object), Lifecycle::Retained);
        drop(pin);
        assert_eq!(engine.lifecycle(object), Lifecycle::Collectible);
        assert_eq!(engine.collect(), 1);
        assert_eq!(
            engine.pin_events(),
            vec![PinEvent::Pinned(object), PinEvent::Unpinned(object)]
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unpinned while not pinned")]
    fn test_double_release_is_asserted() {
        let ledger = PinLedger::default();
        let object = ObjectId(7);
        ledger.acquire(object);
        ledger.release(object);
        ledger.release(object);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut engine = HeapEngine::new();
        let first = engine.create_object();
        let _ = engine.collect();
        let second = engine.create_object();
        assert_ne!(first, second);
    }
}
