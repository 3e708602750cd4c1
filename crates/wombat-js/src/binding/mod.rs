//! The Boa engine adapter.
//!
//! [`Boa`] names Boa's handle types for the binding core and [`BoaEngine`] is
//! a short-lived view over a [`Context`] that implements
//! [`ScriptEngine`]. Native callbacks build a fresh view over the context they
//! are handed, so no engine state outlives a call.

mod class;
mod convert;
mod gc;

use std::rc::Weak;

use boa_engine::property::Attribute;
use boa_engine::{Context, JsObject, JsString};
use wombat_dom::{BindingError, ClassKind, EngineTypes, Environment, NodeRef, ScriptEngine, Value};

pub(crate) use convert::{engine_error, to_js};
use gc::NodeSlot;

/// Boa's handle types.
#[derive(Debug)]
pub enum Boa {}

impl EngineTypes for Boa {
    type Object = JsObject;
    type Class = BoaClass;
    type Pin = BoaPin;
}

/// A class registered with Boa.
#[derive(Debug, Clone)]
pub struct BoaClass {
    constructor: JsObject,
    prototype: JsObject,
}

impl BoaClass {
    /// The constructor function.
    #[must_use]
    pub const fn constructor(&self) -> &JsObject {
        &self.constructor
    }

    /// The object every instance inherits from.
    #[must_use]
    pub const fn prototype(&self) -> &JsObject {
        &self.prototype
    }
}

/// A strong handle held from native code.
///
/// Held outside the script heap it counts as a root until dropped. Held by a
/// node, it is traced from that node's object like any other edge.
#[derive(Debug)]
pub struct BoaPin {
    object: JsObject,
}

impl BoaPin {
    pub(crate) const fn object(&self) -> &JsObject {
        &self.object
    }
}

/// [`ScriptEngine`] over a borrowed Boa context.
pub struct BoaEngine<'cx> {
    context: &'cx mut Context,
}

impl<'cx> BoaEngine<'cx> {
    /// Wrap `context` for one binding operation.
    pub const fn new(context: &'cx mut Context) -> Self {
        Self { context }
    }
}

impl ScriptEngine for BoaEngine<'_> {
    type Types = Boa;

    fn create_class(
        &mut self,
        kind: ClassKind,
        parent: Option<&BoaClass>,
        env: &Weak<Environment<Boa>>,
    ) -> Result<BoaClass, BindingError> {
        class::create_class(self.context, kind, parent, env).map_err(|err| engine_error(&err))
    }

    fn class_object(&self, class: &BoaClass) -> JsObject {
        class.constructor.clone()
    }

    fn create_instance(
        &mut self,
        class: &BoaClass,
        node: NodeRef<Boa>,
    ) -> Result<JsObject, BindingError> {
        Ok(JsObject::from_proto_and_data(
            class.prototype.clone(),
            NodeSlot::new(node),
        ))
    }

    fn private_data(&self, object: &JsObject) -> Option<NodeRef<Boa>> {
        NodeSlot::node_of(object)
    }

    fn pin(&mut self, object: &JsObject) -> BoaPin {
        BoaPin {
            object: object.clone(),
        }
    }

    fn set_global(&mut self, name: &str, value: Value<JsObject>) -> Result<(), BindingError> {
        let value = to_js(value, self.context);
        self.context
            .register_global_property(
                JsString::from(name),
                value,
                Attribute::WRITABLE | Attribute::CONFIGURABLE,
            )
            .map_err(|err| engine_error(&err))
    }
}
