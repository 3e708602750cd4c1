//! The per-engine binding environment.
//!
//! An [`Environment`] owns everything one engine instance needs: the string
//! interner, the class registry, the document, target id allocation and the
//! host command log. Nothing here is process-global, so several independent
//! engines can run side by side on one thread.
//!
//! Engine callbacks reach the environment through a [`Weak`] handle captured
//! at class creation; the environment must outlive every script object it
//! creates, and it is torn down before its engine.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

use wombat_common::warning::warn_once;

use crate::class::NodeClassRegistry;
use crate::command::{FIRST_TARGET_ID, TargetId, UiCommand};
use crate::dispatch::{DispatchContext, PropertyDispatch, PropertyNameAccumulator, SetOutcome};
use crate::document;
use crate::engine::{EngineTypes, NodeRef, ScriptEngine};
use crate::error::BindingError;
use crate::interner::{Atom, KnownNames, StringInterner};
use crate::kind::{ClassKind, Method};
use crate::node::{NodeCensus, Pinned};
use crate::tree;
use crate::value::Value;

/// Binding state for one engine instance.
pub struct Environment<T: EngineTypes> {
    interner: RefCell<StringInterner>,
    names: KnownNames,
    registry: OnceCell<NodeClassRegistry<T>>,
    /// The environment pins the document for its whole life.
    document: OnceCell<Pinned<T>>,
    next_target_id: Cell<TargetId>,
    commands: RefCell<Vec<UiCommand>>,
    census: NodeCensus,
}

impl<T: EngineTypes> Environment<T> {
    /// A fresh, unbootstrapped environment.
    #[must_use]
    pub fn new() -> Rc<Self> {
        let mut interner = StringInterner::new();
        let names = KnownNames::new(&mut interner);
        Rc::new(Self {
            interner: RefCell::new(interner),
            names,
            registry: OnceCell::new(),
            document: OnceCell::new(),
            next_target_id: Cell::new(FIRST_TARGET_ID),
            commands: RefCell::new(Vec::new()),
            census: NodeCensus::default(),
        })
    }

    /// Register every class, create the document and publish the globals
    /// `Node`, `Document`, `Element`, `Text`, `Comment` and `document`.
    ///
    /// Returns the document's script object.
    ///
    /// # Errors
    ///
    /// [`BindingError::AlreadyBootstrapped`] on a second call, or whatever
    /// the engine reports while creating classes or globals.
    pub fn bootstrap<E>(self: &Rc<Self>, engine: &mut E) -> Result<T::Object, BindingError>
    where
        E: ScriptEngine<Types = T>,
    {
        if self.registry.get().is_some() {
            return Err(BindingError::AlreadyBootstrapped);
        }
        let registry = NodeClassRegistry::register_all(engine, &Rc::downgrade(self))?;
        if self.registry.set(registry).is_err() {
            return Err(BindingError::AlreadyBootstrapped);
        }

        let document = document::create_document(self, engine)?;
        let object = document.object().clone();
        if self.document.set(document).is_err() {
            return Err(BindingError::AlreadyBootstrapped);
        }

        for class in self.registry()?.classes() {
            let constructor = engine.class_object(class.handle());
            engine.set_global(class.name(), Value::Object(constructor))?;
        }
        engine.set_global("document", Value::Object(object.clone()))?;
        tracing::info!(classes = self.registry()?.classes().count(), "bindings bootstrapped");
        Ok(object)
    }

    /// Whether [`bootstrap`](Self::bootstrap) has completed.
    #[must_use]
    pub fn is_bootstrapped(&self) -> bool {
        self.document.get().is_some()
    }

    /// The class registry.
    ///
    /// # Errors
    ///
    /// [`BindingError::NotBootstrapped`] before bootstrap.
    pub fn registry(&self) -> Result<&NodeClassRegistry<T>, BindingError> {
        self.registry.get().ok_or(BindingError::NotBootstrapped)
    }

    /// The document's script object.
    #[must_use]
    pub fn document(&self) -> Option<&T::Object> {
        self.document.get().map(Pinned::object)
    }

    /// The document's native node.
    #[must_use]
    pub fn document_node(&self) -> Option<&NodeRef<T>> {
        self.document.get().map(Pinned::node)
    }

    /// Run a script constructor.
    ///
    /// # Errors
    ///
    /// [`BindingError::Argument`] for invalid arguments or non-constructible
    /// classes.
    pub fn construct<E>(
        &self,
        engine: &mut E,
        kind: ClassKind,
        args: &[Value<T::Object>],
    ) -> Result<T::Object, BindingError>
    where
        E: ScriptEngine<Types = T>,
    {
        self.registry()?.instantiate(self, engine, kind, args)
    }

    /// Read a native property. `None` means the name is not native.
    #[must_use]
    pub fn get_property(&self, node: &NodeRef<T>, name: &str) -> Option<Value<T::Object>> {
        let atom = self.lookup(name)?;
        self.get_property_atom(node, atom)
    }

    /// [`get_property`](Self::get_property) for an already interned name.
    #[must_use]
    pub fn get_property_atom(&self, node: &NodeRef<T>, name: Atom) -> Option<Value<T::Object>> {
        let instance = node.borrow();
        let cx = DispatchContext::new(self, instance.target_id());
        instance.get_property(&cx, name)
    }

    /// Write a property.
    ///
    /// [`SetOutcome::Unhandled`] tells the engine to store the value as a
    /// plain field. The first such write per class and name is reported.
    ///
    /// # Errors
    ///
    /// [`BindingError::Argument`] when a native setter rejects the value.
    pub fn set_property(
        &self,
        node: &NodeRef<T>,
        name: &str,
        value: &Value<T::Object>,
    ) -> Result<SetOutcome, BindingError> {
        let outcome = match self.lookup(name) {
            Some(atom) => self.set_native(node, atom, value)?,
            None => SetOutcome::Unhandled,
        };
        if outcome == SetOutcome::Unhandled {
            self.report_unhandled(node, name);
        }
        Ok(outcome)
    }

    /// [`set_property`](Self::set_property) for an already interned name.
    ///
    /// # Errors
    ///
    /// [`BindingError::Argument`] when a native setter rejects the value.
    pub fn set_property_atom(
        &self,
        node: &NodeRef<T>,
        name: Atom,
        value: &Value<T::Object>,
    ) -> Result<SetOutcome, BindingError> {
        let outcome = self.set_native(node, name, value)?;
        if outcome == SetOutcome::Unhandled {
            let text = self.interner.borrow().resolve(name).unwrap_or_default().to_string();
            self.report_unhandled(node, &text);
        }
        Ok(outcome)
    }

    fn report_unhandled(&self, node: &NodeRef<T>, name: &str) {
        let kind = node.borrow().kind();
        let _ = warn_once(
            "DOM",
            &format!("{kind}.{name} is not a native property; storing it on the script object"),
        );
    }

    fn set_native(
        &self,
        node: &NodeRef<T>,
        name: Atom,
        value: &Value<T::Object>,
    ) -> Result<SetOutcome, BindingError> {
        let mut instance = node.borrow_mut();
        let cx = DispatchContext::new(self, instance.target_id());
        instance.set_property(&cx, name, value)
    }

    /// Enumerable native names of `node`, without duplicates.
    #[must_use]
    pub fn property_names(&self, node: &NodeRef<T>) -> Vec<&'static str> {
        let mut names = PropertyNameAccumulator::new();
        node.borrow().property_names(&mut names);
        names.into_names()
    }

    /// Invoke a native method with `this` as receiver.
    ///
    /// # Errors
    ///
    /// [`BindingError::Argument`] for bad receivers or arguments,
    /// [`BindingError::Hierarchy`] for invalid tree mutations.
    pub fn call_method<E>(
        &self,
        engine: &mut E,
        this: &NodeRef<T>,
        method: Method,
        args: &[Value<T::Object>],
    ) -> Result<Value<T::Object>, BindingError>
    where
        E: ScriptEngine<Types = T>,
    {
        let kind = this.borrow().kind();
        let owner = method.owner();
        if owner != ClassKind::Node && owner != kind {
            return Err(BindingError::Argument(format!(
                "Failed to execute '{}' on '{}': Illegal invocation.",
                method.name(),
                owner.name()
            )));
        }
        tracing::trace!(method = method.name(), %kind, argc = args.len(), "native call");

        match method {
            Method::CreateElement => document::create_element(self, engine, args),
            Method::CreateTextNode => document::create_text_node(self, engine, args),
            Method::CreateComment => document::create_comment(self, engine, args),
            Method::AppendChild => {
                let (child, value) = node_argument(engine, method, args, 0)?;
                tree::insert_before(self, engine, method, this, &child, None)?;
                Ok(value)
            }
            Method::InsertBefore => {
                if args.len() < 2 {
                    return Err(BindingError::Argument(format!(
                        "Failed to execute 'insertBefore' on 'Node': 2 arguments required, but only {} present.",
                        args.len()
                    )));
                }
                let (child, value) = node_argument(engine, method, args, 0)?;
                let reference = match args.get(1) {
                    Some(reference) if !reference.is_nullish() => {
                        Some(node_argument(engine, method, args, 1)?.0)
                    }
                    _ => None,
                };
                tree::insert_before(self, engine, method, this, &child, reference.as_ref())?;
                Ok(value)
            }
            Method::RemoveChild => {
                let (child, value) = node_argument(engine, method, args, 0)?;
                tree::remove_child(self, this, &child)?;
                Ok(value)
            }
            Method::Remove => {
                let _ = tree::detach(self, this);
                Ok(Value::Undefined)
            }
        }
    }

    /// Intern a name, e.g. one an engine adapter caches.
    pub fn intern(&self, name: &str) -> Atom {
        self.interner.borrow_mut().intern(name)
    }

    /// Look up an interned name without interning it.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Atom> {
        self.interner.borrow().get(name)
    }

    /// Pre-interned names of the exposed surface.
    #[must_use]
    pub const fn names(&self) -> &KnownNames {
        &self.names
    }

    /// Allocate the next target id for a script-created node.
    pub(crate) fn allocate_target_id(&self) -> TargetId {
        let id = self.next_target_id.get();
        self.next_target_id.set(id + 1);
        id
    }

    /// Append a host command.
    pub(crate) fn record(&self, command: UiCommand) {
        self.commands.borrow_mut().push(command);
    }

    /// Drain the host command log.
    pub fn take_commands(&self) -> Vec<UiCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    /// Number of native node instances not yet destroyed.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.census.live()
    }

    pub(crate) const fn census(&self) -> &NodeCensus {
        &self.census
    }
}

/// Resolve `args[index]` to a native node, returning it with the original
/// script value.
fn node_argument<E, T>(
    engine: &E,
    method: Method,
    args: &[Value<T::Object>],
    index: usize,
) -> Result<(NodeRef<T>, Value<T::Object>), BindingError>
where
    E: ScriptEngine<Types = T>,
    T: EngineTypes,
{
    let Some(value) = args.get(index) else {
        return Err(BindingError::Argument(format!(
            "Failed to execute '{}' on 'Node': 1 argument required, but only 0 present.",
            method.name()
        )));
    };
    value
        .as_object()
        .and_then(|object| engine.private_data(object))
        .map(|node| (node, value.clone()))
        .ok_or_else(|| {
            BindingError::Argument(format!(
                "Failed to execute '{}' on 'Node': parameter {} is not of type 'Node'.",
                method.name(),
                index + 1
            ))
        })
}

impl<T: EngineTypes> fmt::Debug for Environment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bootstrapped", &self.is_bootstrapped())
            .field("next_target_id", &self.next_target_id.get())
            .field("live_nodes", &self.census.live())
            .finish_non_exhaustive()
    }
}

impl<T: EngineTypes> Drop for Environment<T> {
    fn drop(&mut self) {
        tracing::debug!(live_nodes = self.census.live(), "tearing down environment");
    }
}
