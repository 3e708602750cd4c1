//! Values crossing the script boundary.

use crate::kind::Method;
use crate::string::DomString;

/// A script value as seen by the binding core.
///
/// `O` is the engine's object handle type. Engine adapters convert their
/// native values to and from this enum at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<O> {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// A boolean
    Bool(bool),
    /// A number
    Number(f64),
    /// A string, as UTF-16 code units
    String(DomString),
    /// An object handle
    Object(O),
    /// A native method, to be invoked with the node it was read from as `this`
    Method(Method),
    /// A list of values (surfaced to script as an array)
    List(Vec<Self>),
}

impl<O> Value<O> {
    /// The string payload, if this is a string.
    #[must_use]
    pub const fn as_string(&self) -> Option<&DomString> {
        match self {
            Self::String(text) => Some(text),
            _ => None,
        }
    }

    /// The object handle, if this is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&O> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// The number payload, if this is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// `null` or `undefined`.
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Wrap an optional object handle, mapping `None` to `null`.
    pub fn from_object(object: Option<O>) -> Self {
        object.map_or(Self::Null, Self::Object)
    }
}

impl<O> From<&str> for Value<O> {
    fn from(text: &str) -> Self {
        Self::String(DomString::from(text))
    }
}

impl<O> From<String> for Value<O> {
    fn from(text: String) -> Self {
        Self::String(DomString::from(text))
    }
}

impl<O> From<DomString> for Value<O> {
    fn from(text: DomString) -> Self {
        Self::String(text)
    }
}

impl<O> From<bool> for Value<O> {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<O> From<f64> for Value<O> {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}
