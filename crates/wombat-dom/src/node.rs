//! Node instances and their lifetime across the native/script boundary.
//!
//! A [`NodeInstance`] is the native half of one logical node. It is bound to
//! exactly one script object for its whole life, records that handle, and
//! owns a [`Pinned`] reference for every other node it must keep alive from
//! the native side (a document's body, an element's children).
//!
//! # Lifecycle
//!
//! ```text
//! Constructed ──bind──▶ Live ──┬─ pinned by an owner ──▶ Retained
//!                              └─ not pinned ─────────▶ Collectible ──▶ Destroyed
//! ```
//!
//! `Destroyed` happens when the engine finalizes the script object and drops
//! its private data. Dropping the instance drops every pin it holds, which in
//! turn may make pinned nodes collectible.
//!
//! # Edges
//!
//! Besides its own handle, an attached instance stores a handle to its
//! parent's script object, and every pin it holds stores a handle to the
//! pinned object. Engines that trace private data report all of these as
//! edges of the instance's own object (see [`NodeInstance::edges`]), so a
//! script reference to any node keeps its ancestors reachable and an
//! unreferenced subtree is reclaimed as a whole. Only pins held from outside
//! the script heap, such as the environment's pin on the document, act as
//! roots.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::slice;

use crate::base;
use crate::character_data::{CommentData, TextData};
use crate::class::NodeClass;
use crate::command::TargetId;
use crate::dispatch::{DispatchContext, PropertyDispatch, PropertyNameAccumulator, SetOutcome};
use crate::document::DocumentData;
use crate::element::ElementData;
use crate::engine::{EngineTypes, NodeRef, ScriptEngine};
use crate::environment::Environment;
use crate::error::BindingError;
use crate::interner::Atom;
use crate::kind::ClassKind;
use crate::string::DomString;
use crate::value::Value;

/// Observable lifecycle state of a bound script object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Native instance allocated, script object not yet bound to it.
    Constructed,
    /// Live and pinned by at least one native owner.
    Retained,
    /// Live, unpinned; collectible once script drops its references.
    Collectible,
    /// Finalized. Terminal.
    Destroyed,
}

/// Kind-specific node data.
pub enum NodeData<T: EngineTypes> {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document(DocumentData<T>),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(TextData),
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(CommentData),
}

impl<T: EngineTypes> NodeData<T> {
    /// The class this data belongs to.
    #[must_use]
    pub const fn kind(&self) -> ClassKind {
        match self {
            Self::Document(_) => ClassKind::Document,
            Self::Element(_) => ClassKind::Element,
            Self::Text(_) => ClassKind::Text,
            Self::Comment(_) => ClassKind::Comment,
        }
    }

    /// [§ 4.4 nodeType](https://dom.spec.whatwg.org/#dom-node-nodetype)
    #[must_use]
    pub const fn node_type(&self) -> u16 {
        match self {
            Self::Element(_) => 1,
            Self::Text(_) => 3,
            Self::Comment(_) => 8,
            Self::Document(_) => 9,
        }
    }

    /// Element data, if this is an element.
    #[must_use]
    pub const fn as_element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Document data, if this is the document.
    #[must_use]
    pub const fn as_document(&self) -> Option<&DocumentData<T>> {
        match self {
            Self::Document(document) => Some(document),
            _ => None,
        }
    }

    /// Character data payload, if this is a text or comment node.
    #[must_use]
    pub const fn character_data(&self) -> Option<&DomString> {
        match self {
            Self::Text(text) => Some(text.data()),
            Self::Comment(comment) => Some(comment.data()),
            Self::Document(_) | Self::Element(_) => None,
        }
    }

    fn dispatch(&self) -> &dyn PropertyDispatch<T> {
        match self {
            Self::Document(document) => document,
            Self::Element(element) => element,
            Self::Text(text) => text,
            Self::Comment(comment) => comment,
        }
    }

    fn dispatch_mut(&mut self) -> &mut dyn PropertyDispatch<T> {
        match self {
            Self::Document(document) => document,
            Self::Element(element) => element,
            Self::Text(text) => text,
            Self::Comment(comment) => comment,
        }
    }
}

/// The native half of one logical node.
pub struct NodeInstance<T: EngineTypes> {
    class: Rc<NodeClass<T>>,
    target_id: TargetId,
    /// Our own script handle. Not a pin.
    object: Option<T::Object>,
    parent: Weak<RefCell<Self>>,
    /// The parent's script object while attached. An edge, not a pin.
    parent_object: Option<T::Object>,
    children: PinSet<T>,
    data: NodeData<T>,
    _census: CensusToken,
}

impl<T: EngineTypes> NodeInstance<T> {
    fn new(
        class: Rc<NodeClass<T>>,
        target_id: TargetId,
        data: NodeData<T>,
        census: CensusToken,
    ) -> Self {
        Self {
            class,
            target_id,
            object: None,
            parent: Weak::new(),
            parent_object: None,
            children: PinSet::new(),
            data,
            _census: census,
        }
    }

    /// The node's kind.
    #[must_use]
    pub const fn kind(&self) -> ClassKind {
        self.data.kind()
    }

    /// The class this instance was created from.
    #[must_use]
    pub const fn class(&self) -> &Rc<NodeClass<T>> {
        &self.class
    }

    /// Identity shared with the host framework.
    #[must_use]
    pub const fn target_id(&self) -> TargetId {
        self.target_id
    }

    /// The script object bound to this node.
    #[must_use]
    pub const fn object(&self) -> Option<&T::Object> {
        self.object.as_ref()
    }

    /// Whether the script object has been bound yet.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.object.is_some()
    }

    /// The parent node, if attached and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<T>> {
        self.parent.upgrade()
    }

    /// Children in tree order. Each is pinned by this node.
    #[must_use]
    pub const fn children(&self) -> &PinSet<T> {
        &self.children
    }

    /// Kind-specific data.
    #[must_use]
    pub const fn data(&self) -> &NodeData<T> {
        &self.data
    }

    pub(crate) const fn children_mut(&mut self) -> &mut PinSet<T> {
        &mut self.children
    }

    /// Link to `parent`, or unlink with `None`.
    pub(crate) fn set_parent(&mut self, parent: Option<&NodeRef<T>>) {
        if let Some(parent) = parent {
            self.parent = Rc::downgrade(parent);
            self.parent_object = parent.borrow().object().cloned();
        } else {
            self.parent = Weak::new();
            self.parent_object = None;
        }
    }

    /// The parent's script object, held while attached.
    #[must_use]
    pub const fn parent_object(&self) -> Option<&T::Object> {
        self.parent_object.as_ref()
    }

    /// Every pin this instance holds: its children, then a document's body.
    pub fn pins(&self) -> impl Iterator<Item = &Pinned<T>> {
        self.children
            .iter()
            .chain(self.data.as_document().map(DocumentData::body))
    }

    /// Every script handle stored in this instance, other than its own.
    ///
    /// These are the outgoing edges of the instance's script object: the
    /// parent link and the pinned objects. A tracing engine marks them from
    /// the object's private data; a pin reported this way stops being a root
    /// and keeps its target alive only while this instance is reachable.
    pub fn edges(&self) -> impl Iterator<Item = &T::Object> {
        self.parent_object
            .iter()
            .chain(self.pins().map(Pinned::object))
    }
}

/// Kind data first, then the shared Node behaviour.
impl<T: EngineTypes> PropertyDispatch<T> for NodeInstance<T> {
    fn get_property(&self, cx: &DispatchContext<'_, T>, name: Atom) -> Option<Value<T::Object>> {
        self.data
            .dispatch()
            .get_property(cx, name)
            .or_else(|| base::get_property(self, cx, name))
    }

    fn set_property(
        &mut self,
        cx: &DispatchContext<'_, T>,
        name: Atom,
        value: &Value<T::Object>,
    ) -> Result<SetOutcome, BindingError> {
        // The base surface is read-only, so there is nothing to fall back to.
        self.data.dispatch_mut().set_property(cx, name, value)
    }

    fn property_names(&self, names: &mut PropertyNameAccumulator) {
        self.data.dispatch().property_names(names);
        names.add_class(ClassKind::Node);
    }
}

impl<T: EngineTypes> fmt::Debug for NodeInstance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeInstance")
            .field("kind", &self.kind())
            .field("target_id", &self.target_id)
            .field("object", &self.object)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl<T: EngineTypes> Drop for NodeInstance<T> {
    fn drop(&mut self) {
        let pins = self.children.len() + usize::from(matches!(self.data, NodeData::Document(_)));
        tracing::debug!(
            target_id = self.target_id,
            kind = %self.kind(),
            pins,
            "destroying node instance"
        );
    }
}

/// Allocate a node instance and bind it to a new script object of `class`.
///
/// # Errors
///
/// Propagates engine failures from `create_instance`; the native instance is
/// dropped again in that case.
pub(crate) fn bind<E, T>(
    engine: &mut E,
    env: &Environment<T>,
    class: &Rc<NodeClass<T>>,
    target_id: TargetId,
    data: NodeData<T>,
) -> Result<(NodeRef<T>, T::Object), BindingError>
where
    E: ScriptEngine<Types = T>,
    T: EngineTypes,
{
    let node = Rc::new(RefCell::new(NodeInstance::new(
        Rc::clone(class),
        target_id,
        data,
        env.census().enter(),
    )));
    let object = engine.create_instance(class.handle(), Rc::clone(&node))?;
    node.borrow_mut().object = Some(object.clone());
    tracing::debug!(target_id, class = class.name(), "bound node instance");
    Ok((node, object))
}

/// A native-held strong reference to another node's script object.
///
/// Holding a `Pinned` keeps the target's script object alive; dropping it
/// releases the engine pin exactly once.
pub struct Pinned<T: EngineTypes> {
    node: NodeRef<T>,
    object: T::Object,
    target_id: TargetId,
    pin: T::Pin,
}

impl<T: EngineTypes> Pinned<T> {
    /// Pin `node`'s script object.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::LifetimeViolation`] if the node has no bound
    /// script object.
    pub(crate) fn new<E>(engine: &mut E, node: &NodeRef<T>) -> Result<Self, BindingError>
    where
        E: ScriptEngine<Types = T>,
    {
        let (object, target_id) = {
            let instance = node.borrow();
            let object = instance.object().cloned().ok_or_else(|| {
                BindingError::LifetimeViolation(format!(
                    "cannot pin node {} before it is bound",
                    instance.target_id()
                ))
            })?;
            (object, instance.target_id())
        };
        let pin = engine.pin(&object);
        tracing::debug!(target_id, "pinned");
        Ok(Self {
            node: Rc::clone(node),
            object,
            target_id,
            pin,
        })
    }

    /// The pinned node.
    #[must_use]
    pub const fn node(&self) -> &NodeRef<T> {
        &self.node
    }

    /// The pinned script object.
    #[must_use]
    pub const fn object(&self) -> &T::Object {
        &self.object
    }

    /// The pinned node's target id.
    #[must_use]
    pub const fn target_id(&self) -> TargetId {
        self.target_id
    }

    /// The engine pin.
    #[must_use]
    pub const fn pin(&self) -> &T::Pin {
        &self.pin
    }
}

impl<T: EngineTypes> fmt::Debug for Pinned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pinned")
            .field("target_id", &self.target_id)
            .field("object", &self.object)
            .finish_non_exhaustive()
    }
}

impl<T: EngineTypes> Drop for Pinned<T> {
    fn drop(&mut self) {
        tracing::debug!(target_id = self.target_id, "unpinned");
    }
}

/// Ordered set of pins held by one owner. A target is never pinned twice by
/// the same owner.
pub struct PinSet<T: EngineTypes> {
    entries: Vec<Pinned<T>>,
}

impl<T: EngineTypes> PinSet<T> {
    const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Number of pinned targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No pinned targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in order.
    pub fn iter(&self) -> slice::Iter<'_, Pinned<T>> {
        self.entries.iter()
    }

    /// Entry at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Pinned<T>> {
        self.entries.get(index)
    }

    /// First entry.
    #[must_use]
    pub fn first(&self) -> Option<&Pinned<T>> {
        self.entries.first()
    }

    /// Last entry.
    #[must_use]
    pub fn last(&self) -> Option<&Pinned<T>> {
        self.entries.last()
    }

    /// Position of `node` in the set.
    #[must_use]
    pub fn position(&self, node: &NodeRef<T>) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| Rc::ptr_eq(&entry.node, node))
    }

    /// Position of the node with `target_id` in the set.
    #[must_use]
    pub fn position_of(&self, target_id: TargetId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.target_id == target_id)
    }

    /// Whether `node` is pinned by this set.
    #[must_use]
    pub fn contains(&self, node: &NodeRef<T>) -> bool {
        self.position(node).is_some()
    }

    /// Insert an existing pin at `index` (clamped to the end).
    ///
    /// A target already in the set keeps its position and the duplicate pin
    /// is released.
    pub(crate) fn insert(&mut self, index: usize, entry: Pinned<T>) {
        if self.contains(&entry.node) {
            tracing::warn!(target_id = entry.target_id, "node pinned twice by one owner");
            return;
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
    }

    /// Remove `node` from the set, handing back its pin.
    pub(crate) fn remove(&mut self, node: &NodeRef<T>) -> Option<Pinned<T>> {
        let index = self.position(node)?;
        Some(self.entries.remove(index))
    }
}

impl<'a, T: EngineTypes> IntoIterator for &'a PinSet<T> {
    type Item = &'a Pinned<T>;
    type IntoIter = slice::Iter<'a, Pinned<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Count of live native node instances in one environment.
#[derive(Debug, Clone, Default)]
pub struct NodeCensus(Rc<Cell<usize>>);

impl NodeCensus {
    /// Number of node instances not yet destroyed.
    #[must_use]
    pub fn live(&self) -> usize {
        self.0.get()
    }

    fn enter(&self) -> CensusToken {
        self.0.set(self.0.get() + 1);
        CensusToken(Rc::clone(&self.0))
    }
}

/// Held by each instance; leaving the census happens on drop.
struct CensusToken(Rc<Cell<usize>>);

impl Drop for CensusToken {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}
