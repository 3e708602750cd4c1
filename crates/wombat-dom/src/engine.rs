//! The capability boundary with the scripting engine.
//!
//! The binding core never talks to a concrete engine. It consumes exactly the
//! capabilities below: class creation, instance creation with private data,
//! private-data lookup, pinning, and global publication. Errors travel back as
//! [`BindingError`] and the adapter turns them into engine-native thrown
//! errors.
//!
//! The trait is split in two so that native node storage can name the
//! engine's handle types without borrowing a live engine:
//! [`EngineTypes`] is a `'static` type family, [`ScriptEngine`] is the set of
//! operations on a running engine (often a short-lived view over an engine
//! context handed to a callback).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::environment::Environment;
use crate::error::BindingError;
use crate::kind::ClassKind;
use crate::node::NodeInstance;
use crate::value::Value;

/// Shared native ownership of one node.
pub type NodeRef<T> = Rc<RefCell<NodeInstance<T>>>;

/// Handle types of one engine.
pub trait EngineTypes: Sized + 'static {
    /// A script object handle.
    ///
    /// Node instances store their own handle, their parent's handle and the
    /// handles inside their pins. Engines whose collector treats native-held
    /// handles as roots must report these from the object's private data as
    /// ordinary (non-root) references (see
    /// [`NodeInstance::edges`](crate::NodeInstance::edges)), otherwise every
    /// bound node would pin itself and every subtree would leak.
    type Object: Clone + PartialEq + fmt::Debug;

    /// A registered class (constructor plus prototype).
    type Class: fmt::Debug;

    /// A pin on one object. Dropping the pin releases it; there is no
    /// separate unpin call, so every pin is released exactly once.
    type Pin: fmt::Debug;
}

/// Operations the binding core needs from a running engine.
pub trait ScriptEngine {
    /// The engine's handle types.
    type Types: EngineTypes;

    /// Create the class for `kind`, chained to `parent`'s prototype.
    ///
    /// The engine wires the class constructor, and any property or method
    /// callbacks it installs, to `env`. The handle is weak so that callbacks
    /// never keep the environment alive.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Engine`] if the engine cannot create the class.
    fn create_class(
        &mut self,
        kind: ClassKind,
        parent: Option<&<Self::Types as EngineTypes>::Class>,
        env: &Weak<Environment<Self::Types>>,
    ) -> Result<<Self::Types as EngineTypes>::Class, BindingError>;

    /// The script object representing a class (its constructor).
    fn class_object(
        &self,
        class: &<Self::Types as EngineTypes>::Class,
    ) -> <Self::Types as EngineTypes>::Object;

    /// Create a script object of `class` carrying `node` as private data.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Engine`] if allocation fails.
    fn create_instance(
        &mut self,
        class: &<Self::Types as EngineTypes>::Class,
        node: NodeRef<Self::Types>,
    ) -> Result<<Self::Types as EngineTypes>::Object, BindingError>;

    /// The native node behind a script object, if it is one of ours.
    fn private_data(
        &self,
        object: &<Self::Types as EngineTypes>::Object,
    ) -> Option<NodeRef<Self::Types>>;

    /// Keep `object` alive until the returned pin is dropped.
    ///
    /// A pin held outside the script heap is a root. A pin held by a node
    /// instance may instead be traced as an edge of that node's object.
    fn pin(
        &mut self,
        object: &<Self::Types as EngineTypes>::Object,
    ) -> <Self::Types as EngineTypes>::Pin;

    /// Publish `value` under `name` on the global object.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Engine`] if the global cannot be defined.
    fn set_global(
        &mut self,
        name: &str,
        value: Value<<Self::Types as EngineTypes>::Object>,
    ) -> Result<(), BindingError>;
}
