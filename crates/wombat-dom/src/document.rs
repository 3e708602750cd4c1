//! [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
//!
//! The environment owns exactly one document. It is created during bootstrap
//! together with its body element and neither can be constructed from
//! script.

use std::rc::Rc;

use crate::command::{BODY_TARGET_ID, DOCUMENT_TARGET_ID};
use crate::dispatch::{DispatchContext, PropertyDispatch, PropertyNameAccumulator};
use crate::element::ElementData;
use crate::engine::{EngineTypes, ScriptEngine};
use crate::environment::Environment;
use crate::error::BindingError;
use crate::interner::Atom;
use crate::kind::{ClassKind, Method};
use crate::node::{self, NodeData, Pinned};
use crate::value::Value;

/// Document data. The document pins its body for as long as it lives.
pub struct DocumentData<T: EngineTypes> {
    body: Pinned<T>,
}

impl<T: EngineTypes> DocumentData<T> {
    /// The body element.
    #[must_use]
    pub const fn body(&self) -> &Pinned<T> {
        &self.body
    }
}

impl<T: EngineTypes> PropertyDispatch<T> for DocumentData<T> {
    fn get_property(&self, cx: &DispatchContext<'_, T>, name: Atom) -> Option<Value<T::Object>> {
        let names = cx.names();
        if name == names.node_name {
            Some(Value::from("#document"))
        } else if name == names.body {
            Some(Value::Object(self.body.object().clone()))
        } else {
            names
                .find_method(ClassKind::Document.own_methods(), name)
                .map(Value::Method)
        }
    }

    fn property_names(&self, names: &mut PropertyNameAccumulator) {
        names.add_class(ClassKind::Document);
    }
}

/// Create the body and the document, returning the pinned document.
///
/// Neither announces itself to the host; both ids are well known.
pub(crate) fn create_document<E, T>(env: &Environment<T>, engine: &mut E) -> Result<Pinned<T>, BindingError>
where
    E: ScriptEngine<Types = T>,
    T: EngineTypes,
{
    let registry = env.registry()?;
    let (body, _body_object) = node::bind(
        engine,
        env,
        registry.class(ClassKind::Element),
        BODY_TARGET_ID,
        NodeData::Element(ElementData::new(Rc::from("body"))),
    )?;
    let body = Pinned::new(engine, &body)?;
    let (document, _document_object) = node::bind(
        engine,
        env,
        registry.class(ClassKind::Document),
        DOCUMENT_TARGET_ID,
        NodeData::Document(DocumentData { body }),
    )?;
    Pinned::new(engine, &document)
}

/// [§ 4.5 createElement](https://dom.spec.whatwg.org/#dom-document-createelement)
pub(crate) fn create_element<E, T>(
    env: &Environment<T>,
    engine: &mut E,
    args: &[Value<T::Object>],
) -> Result<Value<T::Object>, BindingError>
where
    E: ScriptEngine<Types = T>,
    T: EngineTypes,
{
    let [tag_name] = args else {
        return Err(BindingError::Argument(
            "Failed to createElement: only accept 1 parameter.".to_string(),
        ));
    };
    if tag_name.as_string().is_none() {
        return Err(BindingError::Argument(
            "Failed to createElement: tagName should be a string.".to_string(),
        ));
    }
    env.registry()?
        .instantiate(env, engine, ClassKind::Element, args)
        .map(Value::Object)
}

/// [§ 4.5 createTextNode](https://dom.spec.whatwg.org/#dom-document-createtextnode)
pub(crate) fn create_text_node<E, T>(
    env: &Environment<T>,
    engine: &mut E,
    args: &[Value<T::Object>],
) -> Result<Value<T::Object>, BindingError>
where
    E: ScriptEngine<Types = T>,
    T: EngineTypes,
{
    create_character_data(env, engine, Method::CreateTextNode, ClassKind::Text, args)
}

/// [§ 4.5 createComment](https://dom.spec.whatwg.org/#dom-document-createcomment)
pub(crate) fn create_comment<E, T>(
    env: &Environment<T>,
    engine: &mut E,
    args: &[Value<T::Object>],
) -> Result<Value<T::Object>, BindingError>
where
    E: ScriptEngine<Types = T>,
    T: EngineTypes,
{
    create_character_data(env, engine, Method::CreateComment, ClassKind::Comment, args)
}

fn create_character_data<E, T>(
    env: &Environment<T>,
    engine: &mut E,
    method: Method,
    kind: ClassKind,
    args: &[Value<T::Object>],
) -> Result<Value<T::Object>, BindingError>
where
    E: ScriptEngine<Types = T>,
    T: EngineTypes,
{
    // The wording is fixed regardless of how many arguments were passed.
    if args.len() != 1 {
        return Err(BindingError::Argument(format!(
            "Failed to execute '{}' on 'Document': 1 argument required, but only 0 present.",
            method.name()
        )));
    }
    env.registry()?
        .instantiate(env, engine, kind, args)
        .map(Value::Object)
}
