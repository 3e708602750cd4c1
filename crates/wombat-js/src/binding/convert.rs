//! Conversions between Boa values and binding values.

use boa_engine::object::builtins::JsArray;
use boa_engine::{Context, JsError, JsNativeError, JsObject, JsString, JsValue};
use wombat_dom::{BindingError, DomString, Value};

/// Script value to binding value.
///
/// Strings keep their UTF-16 code units, lone surrogates included. Symbols
/// and big integers have no binding counterpart and read as `undefined`,
/// which every native argument check rejects.
pub(crate) fn from_js(value: &JsValue) -> Value<JsObject> {
    if let Some(object) = value.as_object() {
        Value::Object(object.clone())
    } else if let Some(text) = value.as_string() {
        Value::String(DomString::from(text.to_vec()))
    } else if let Some(flag) = value.as_boolean() {
        Value::Bool(flag)
    } else if let Some(number) = value.as_number() {
        Value::Number(number)
    } else if value.is_null() {
        Value::Null
    } else {
        Value::Undefined
    }
}

pub(crate) fn from_js_args(args: &[JsValue]) -> Vec<Value<JsObject>> {
    args.iter().map(from_js).collect()
}

/// Binding value to script value. Lists become fresh arrays.
pub(crate) fn to_js(value: Value<JsObject>, context: &mut Context) -> JsValue {
    match value {
        // Methods live on prototypes as function objects; a bare method value
        // never reaches an accessor.
        Value::Undefined | Value::Method(_) => JsValue::undefined(),
        Value::Null => JsValue::null(),
        Value::Bool(flag) => JsValue::from(flag),
        Value::Number(number) => JsValue::from(number),
        Value::String(text) => JsValue::from(JsString::from(text.as_utf16())),
        Value::Object(object) => JsValue::from(object),
        Value::List(items) => {
            let items: Vec<JsValue> = items.into_iter().map(|item| to_js(item, context)).collect();
            JsArray::from_iter(items, context).into()
        }
    }
}

/// Surface a binding failure as a script `TypeError`.
///
/// Lifetime violations are native bugs; the script sees a generic message
/// and the details go to the log.
pub(crate) fn to_js_error(err: BindingError) -> JsError {
    if err.is_script_visible() {
        return JsNativeError::typ().with_message(err.to_string()).into();
    }
    tracing::error!(error = %err, "internal binding error");
    JsNativeError::typ()
        .with_message("internal binding error")
        .into()
}

pub(crate) fn engine_error(err: &JsError) -> BindingError {
    BindingError::Engine(err.to_string())
}
