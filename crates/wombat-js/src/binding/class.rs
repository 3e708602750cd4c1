//! Class construction on Boa.
//!
//! Each exposed class becomes a native constructor function plus a prototype
//! object. Native properties are accessors on the prototype that owns them and
//! methods are plain function properties, so `instanceof`, `for..in` and
//! prototype inspection behave as they do for any other script class.

use std::rc::Weak;

use boa_engine::object::FunctionObjectBuilder;
use boa_engine::property::PropertyDescriptor;
use boa_engine::{
    Context, JsNativeError, JsObject, JsResult, JsString, JsValue, NativeFunction, js_string,
};
use wombat_dom::{ClassKind, Environment, Method, NodeRef, SetOutcome};

use super::convert::{from_js, from_js_args, to_js, to_js_error};
use super::gc::{ClassCapture, MethodCapture, NodeSlot, PropertyCapture};
use super::{Boa, BoaClass, BoaEngine};

pub(crate) fn create_class(
    context: &mut Context,
    kind: ClassKind,
    parent: Option<&BoaClass>,
    env: &Weak<Environment<Boa>>,
) -> JsResult<BoaClass> {
    let realm = context.realm().clone();

    let constructor = NativeFunction::from_copy_closure_with_captures(
        construct,
        ClassCapture::new(env, kind),
    );
    let constructor: JsObject = FunctionObjectBuilder::new(&realm, constructor)
        .name(JsString::from(kind.name()))
        .length(kind.constructor_length())
        .constructor(true)
        .build()
        .into();

    let prototype = JsObject::with_object_proto(context.intrinsics());
    if let Some(parent) = parent {
        let _ = prototype.set_prototype(Some(parent.prototype.clone()));
        let _ = constructor.set_prototype(Some(parent.constructor.clone()));
    }
    let _ = constructor.define_property_or_throw(
        js_string!("prototype"),
        PropertyDescriptor::builder()
            .value(prototype.clone())
            .writable(false)
            .enumerable(false)
            .configurable(false),
        context,
    )?;
    let _ = prototype.define_property_or_throw(
        js_string!("constructor"),
        PropertyDescriptor::builder()
            .value(constructor.clone())
            .writable(true)
            .enumerable(false)
            .configurable(true),
        context,
    )?;

    let env_handle = env
        .upgrade()
        .ok_or_else(|| JsNativeError::typ().with_message("DOM environment dropped during bootstrap"))?;
    for &name in kind.own_properties() {
        let atom = env_handle.intern(name);
        let capture = PropertyCapture::new(env, atom);
        let getter = FunctionObjectBuilder::new(
            &realm,
            NativeFunction::from_copy_closure_with_captures(get_accessor, capture),
        )
        .name(JsString::from(format!("get {name}").as_str()))
        .length(0)
        .build();
        let mut descriptor = PropertyDescriptor::builder()
            .get(getter)
            .enumerable(true)
            .configurable(true);
        if kind.writable_properties().contains(&name) {
            let capture = PropertyCapture::new(env, atom);
            let setter = FunctionObjectBuilder::new(
                &realm,
                NativeFunction::from_copy_closure_with_captures(set_accessor, capture),
            )
            .name(JsString::from(format!("set {name}").as_str()))
            .length(1)
            .build();
            descriptor = descriptor.set(setter);
        }
        let _ = prototype.define_property_or_throw(JsString::from(name), descriptor, context)?;
    }

    for &method in kind.own_methods() {
        let function = FunctionObjectBuilder::new(
            &realm,
            NativeFunction::from_copy_closure_with_captures(
                call_method,
                MethodCapture::new(env, method),
            ),
        )
        .name(JsString::from(method.name()))
        .length(method.arity())
        .build();
        let _ = prototype.define_property_or_throw(
            JsString::from(method.name()),
            PropertyDescriptor::builder()
                .value(function)
                .writable(true)
                .enumerable(true)
                .configurable(true),
            context,
        )?;
    }

    tracing::debug!(class = kind.name(), "created Boa class");
    Ok(BoaClass {
        constructor,
        prototype,
    })
}

/// The node behind `this`, or the DOM's "Illegal invocation" error.
fn receiver(this: &JsValue) -> JsResult<NodeRef<Boa>> {
    this.as_object()
        .and_then(NodeSlot::node_of)
        .ok_or_else(|| JsNativeError::typ().with_message("Illegal invocation").into())
}

/// Native constructors receive `new.target` as `this`; a plain call leaves
/// it without a constructor.
///
/// [§ 10.1.14 GetPrototypeFromConstructor](https://tc39.es/ecma262/#sec-getprototypefromconstructor)
/// A subclass constructor reaching us through `super()` supplies the
/// prototype of the new instance.
fn construct(
    new_target: &JsValue,
    args: &[JsValue],
    capture: &ClassCapture,
    context: &mut Context,
) -> JsResult<JsValue> {
    let kind = capture.kind();
    let Some(new_target) = new_target.as_object().filter(|target| target.is_constructor()) else {
        return Err(JsNativeError::typ()
            .with_message(format!(
                "Failed to construct '{}': Please use the 'new' operator, this DOM object constructor cannot be called as a function.",
                kind.name()
            ))
            .into());
    };
    let prototype = new_target.get(js_string!("prototype"), context)?;
    let env = capture.environment()?;
    let args = from_js_args(args);
    let mut engine = BoaEngine::new(context);
    let object = env
        .construct(&mut engine, kind, &args)
        .map_err(to_js_error)?;
    // A non-object `prototype` keeps the class prototype.
    if let Some(prototype) = prototype.as_object() {
        let _ = object.set_prototype(Some(prototype.clone()));
    }
    Ok(object.into())
}

fn get_accessor(
    this: &JsValue,
    _args: &[JsValue],
    capture: &PropertyCapture,
    context: &mut Context,
) -> JsResult<JsValue> {
    let env = capture.environment()?;
    let node = receiver(this)?;
    let value = env.get_property_atom(&node, capture.name());
    Ok(value.map_or_else(JsValue::undefined, |value| to_js(value, context)))
}

fn set_accessor(
    this: &JsValue,
    args: &[JsValue],
    capture: &PropertyCapture,
    _context: &mut Context,
) -> JsResult<JsValue> {
    let env = capture.environment()?;
    let node = receiver(this)?;
    let value = from_js(&args.first().cloned().unwrap_or_default());
    match env
        .set_property_atom(&node, capture.name(), &value)
        .map_err(to_js_error)?
    {
        SetOutcome::Handled => {}
        // Only writable names get a setter, so dispatch always handles them.
        SetOutcome::Unhandled => {
            tracing::warn!(target_id = node.borrow().target_id(), "native setter declined a write");
        }
    }
    Ok(JsValue::undefined())
}

fn call_method(
    this: &JsValue,
    args: &[JsValue],
    capture: &MethodCapture,
    context: &mut Context,
) -> JsResult<JsValue> {
    let method: Method = capture.method();
    let env = capture.environment()?;
    let node = receiver(this).map_err(|_| {
        JsNativeError::typ().with_message(format!(
            "Failed to execute '{}' on '{}': Illegal invocation.",
            method.name(),
            method.owner().name()
        ))
    })?;
    let args = from_js_args(args);
    let mut engine = BoaEngine::new(context);
    let result = env
        .call_method(&mut engine, &node, method, &args)
        .map_err(to_js_error)?;
    Ok(to_js(result, context))
}
