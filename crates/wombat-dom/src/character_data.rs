//! [§ 4.10 Interface CharacterData](https://dom.spec.whatwg.org/#interface-characterdata)
//!
//! Text and Comment share a payload and a surface (`nodeName`, `data`,
//! `length`); they differ only in their node name and host command.

use crate::command::UiCommand;
use crate::dispatch::{DispatchContext, PropertyDispatch, PropertyNameAccumulator, SetOutcome};
use crate::engine::EngineTypes;
use crate::error::BindingError;
use crate::interner::Atom;
use crate::kind::ClassKind;
use crate::string::DomString;
use crate::value::Value;

/// A string payload and its length in UTF-16 code units.
#[derive(Debug, Clone)]
pub struct CharacterData {
    data: DomString,
    /// [§ 4.10 length](https://dom.spec.whatwg.org/#dom-characterdata-length)
    /// "The length getter steps are to return this's length."
    length: usize,
}

impl CharacterData {
    /// Wrap `data`.
    #[must_use]
    pub fn new(data: DomString) -> Self {
        let length = data.len();
        Self { data, length }
    }

    /// The payload.
    #[must_use]
    pub const fn data(&self) -> &DomString {
        &self.data
    }

    /// UTF-16 length of the payload.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.length
    }

    fn replace(&mut self, data: DomString) {
        *self = Self::new(data);
    }

    fn get_property<T: EngineTypes>(
        &self,
        node_name: &'static str,
        cx: &DispatchContext<'_, T>,
        name: Atom,
    ) -> Option<Value<T::Object>> {
        let names = cx.names();
        if name == names.node_name {
            Some(Value::from(node_name))
        } else if name == names.data {
            Some(Value::String(self.data.clone()))
        } else if name == names.length {
            Some(Value::Number(length_as_number(self.length)))
        } else {
            None
        }
    }

    fn set_property<T: EngineTypes>(
        &mut self,
        kind: ClassKind,
        cx: &DispatchContext<'_, T>,
        name: Atom,
        value: &Value<T::Object>,
    ) -> Result<SetOutcome, BindingError> {
        if name != cx.names().data {
            return Ok(SetOutcome::Unhandled);
        }
        let data = match value {
            Value::String(text) => text.clone(),
            // Assigning null to data yields the empty string.
            Value::Null => DomString::empty(),
            _ => {
                return Err(BindingError::Argument(format!(
                    "Failed to set the 'data' property on '{}': The provided value is not a string.",
                    kind.name()
                )));
            }
        };
        cx.env().record(UiCommand::SetData {
            target_id: cx.target_id(),
            data: data.to_utf8_lossy(),
        });
        self.replace(data);
        Ok(SetOutcome::Handled)
    }
}

fn length_as_number(length: usize) -> f64 {
    u32::try_from(length).map_or(f64::from(u32::MAX), f64::from)
}

/// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
#[derive(Debug, Clone)]
pub struct TextData(CharacterData);

impl TextData {
    /// Text node payload.
    #[must_use]
    pub fn new(data: DomString) -> Self {
        Self(CharacterData::new(data))
    }

    /// The text.
    #[must_use]
    pub const fn data(&self) -> &DomString {
        self.0.data()
    }

    /// UTF-16 length.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.0.length()
    }
}

impl<T: EngineTypes> PropertyDispatch<T> for TextData {
    fn get_property(&self, cx: &DispatchContext<'_, T>, name: Atom) -> Option<Value<T::Object>> {
        self.0.get_property("#text", cx, name)
    }

    fn set_property(
        &mut self,
        cx: &DispatchContext<'_, T>,
        name: Atom,
        value: &Value<T::Object>,
    ) -> Result<SetOutcome, BindingError> {
        self.0.set_property(ClassKind::Text, cx, name, value)
    }

    fn property_names(&self, names: &mut PropertyNameAccumulator) {
        names.add_class(ClassKind::Text);
    }
}

/// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
#[derive(Debug, Clone)]
pub struct CommentData(CharacterData);

impl CommentData {
    /// Comment payload.
    #[must_use]
    pub fn new(data: DomString) -> Self {
        Self(CharacterData::new(data))
    }

    /// The comment text.
    #[must_use]
    pub const fn data(&self) -> &DomString {
        self.0.data()
    }

    /// UTF-16 length.
    #[must_use]
    pub const fn length(&self) -> usize {
        self.0.length()
    }
}

impl<T: EngineTypes> PropertyDispatch<T> for CommentData {
    fn get_property(&self, cx: &DispatchContext<'_, T>, name: Atom) -> Option<Value<T::Object>> {
        self.0.get_property("#comment", cx, name)
    }

    fn set_property(
        &mut self,
        cx: &DispatchContext<'_, T>,
        name: Atom,
        value: &Value<T::Object>,
    ) -> Result<SetOutcome, BindingError> {
        self.0.set_property(ClassKind::Comment, cx, name, value)
    }

    fn property_names(&self, names: &mut PropertyNameAccumulator) {
        names.add_class(ClassKind::Comment);
    }
}

/// Validate constructor arguments for `new Text(data)` / `new Comment(data)`.
pub(crate) fn constructor_data<O>(kind: ClassKind, args: &[Value<O>]) -> Result<DomString, BindingError> {
    let [value] = args else {
        return Err(BindingError::Argument(format!(
            "Failed to construct '{}': only accept 1 parameter.",
            kind.name()
        )));
    };
    value.as_string().cloned().ok_or_else(|| {
        BindingError::Argument(format!(
            "Failed to construct '{}': data should be a string.",
            kind.name()
        ))
    })
}
