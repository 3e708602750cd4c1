//! Class registration and construction.
//!
//! One [`NodeClass`] exists per [`ClassKind`] per environment. The registry
//! creates them in parent-first order so every class can be chained to its
//! parent's prototype at creation time.

use std::fmt;
use std::rc::{Rc, Weak};

use strum::IntoEnumIterator;

use crate::character_data::{self, CommentData, TextData};
use crate::command::{TargetId, UiCommand};
use crate::element::{self, ElementData};
use crate::engine::{EngineTypes, ScriptEngine};
use crate::environment::Environment;
use crate::error::BindingError;
use crate::kind::ClassKind;
use crate::node::{self, NodeData};
use crate::value::Value;

/// An exposed class and its engine handle.
pub struct NodeClass<T: EngineTypes> {
    kind: ClassKind,
    handle: T::Class,
}

impl<T: EngineTypes> NodeClass<T> {
    /// Which class this is.
    #[must_use]
    pub const fn kind(&self) -> ClassKind {
        self.kind
    }

    /// The class name seen by script.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// The engine's handle for this class.
    #[must_use]
    pub const fn handle(&self) -> &T::Class {
        &self.handle
    }
}

impl<T: EngineTypes> fmt::Debug for NodeClass<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeClass")
            .field("kind", &self.kind)
            .field("handle", &self.handle)
            .finish()
    }
}

/// Every exposed class of one environment, indexed by [`ClassKind::index`].
pub struct NodeClassRegistry<T: EngineTypes> {
    classes: Vec<Rc<NodeClass<T>>>,
}

impl<T: EngineTypes> NodeClassRegistry<T> {
    /// Create every class in `engine`, wired to `env`.
    pub(crate) fn register_all<E>(engine: &mut E, env: &Weak<Environment<T>>) -> Result<Self, BindingError>
    where
        E: ScriptEngine<Types = T>,
    {
        let mut registry = Self {
            classes: Vec::with_capacity(ClassKind::iter().len()),
        };
        for kind in ClassKind::iter() {
            registry.register_class(engine, kind, env)?;
        }
        Ok(registry)
    }

    fn register_class<E>(
        &mut self,
        engine: &mut E,
        kind: ClassKind,
        env: &Weak<Environment<T>>,
    ) -> Result<(), BindingError>
    where
        E: ScriptEngine<Types = T>,
    {
        debug_assert_eq!(kind.index(), self.classes.len());
        let parent = kind
            .parent()
            .and_then(|parent| self.classes.get(parent.index()));
        let handle = engine.create_class(kind, parent.map(|class| class.handle()), env)?;
        self.classes.push(Rc::new(NodeClass { kind, handle }));
        tracing::debug!(class = kind.name(), "registered class");
        Ok(())
    }

    /// The class for `kind`.
    #[must_use]
    pub fn class(&self, kind: ClassKind) -> &Rc<NodeClass<T>> {
        &self.classes[kind.index()]
    }

    /// All classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = &Rc<NodeClass<T>>> {
        self.classes.iter()
    }

    /// Run the constructor of `kind` with script arguments.
    ///
    /// Argument validation happens before any target id is allocated, so a
    /// failed construction leaves no trace in native state.
    ///
    /// # Errors
    ///
    /// [`BindingError::Argument`] for bad arguments or for the classes that
    /// script may not construct (`Node`, `Document`).
    pub(crate) fn instantiate<E>(
        &self,
        env: &Environment<T>,
        engine: &mut E,
        kind: ClassKind,
        args: &[Value<T::Object>],
    ) -> Result<T::Object, BindingError>
    where
        E: ScriptEngine<Types = T>,
    {
        let data = match kind {
            ClassKind::Node | ClassKind::Document => {
                return Err(BindingError::Argument(format!(
                    "Failed to construct '{}': Illegal constructor.",
                    kind.name()
                )));
            }
            ClassKind::Element => NodeData::Element(ElementData::new(
                element::constructor_tag_name(args)?,
            )),
            ClassKind::Text => {
                NodeData::Text(TextData::new(character_data::constructor_data(kind, args)?))
            }
            ClassKind::Comment => NodeData::Comment(CommentData::new(
                character_data::constructor_data(kind, args)?,
            )),
        };
        let target_id = env.allocate_target_id();
        let announce = create_command(target_id, &data);
        let (_node, object) = node::bind(engine, env, self.class(kind), target_id, data)?;
        if let Some(command) = announce {
            env.record(command);
        }
        Ok(object)
    }
}

/// The host command announcing a freshly constructed node.
fn create_command<T: EngineTypes>(target_id: TargetId, data: &NodeData<T>) -> Option<UiCommand> {
    match data {
        NodeData::Element(element) => Some(UiCommand::CreateElement {
            target_id,
            tag_name: element.local_name().to_string(),
        }),
        NodeData::Text(text) => Some(UiCommand::CreateTextNode {
            target_id,
            data: text.data().to_utf8_lossy(),
        }),
        NodeData::Comment(comment) => Some(UiCommand::CreateComment {
            target_id,
            data: comment.data().to_utf8_lossy(),
        }),
        NodeData::Document(_) => None,
    }
}

impl<T: EngineTypes> fmt::Debug for NodeClassRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.classes.iter()).finish()
    }
}
