//! [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)

use std::rc::Rc;

use crate::dispatch::{DispatchContext, PropertyDispatch, PropertyNameAccumulator};
use crate::engine::EngineTypes;
use crate::error::BindingError;
use crate::interner::Atom;
use crate::kind::ClassKind;
use crate::string::DomString;
use crate::value::Value;

/// Element data: the tag name as given and its HTML-uppercased form.
#[derive(Debug, Clone)]
pub struct ElementData {
    local_name: Rc<str>,
    /// [§ 4.9 tagName](https://dom.spec.whatwg.org/#dom-element-tagname)
    /// "If this is in the HTML namespace and its node document is an HTML
    /// document, then set qualifiedName to qualifiedName in ASCII uppercase."
    tag_name: Rc<str>,
    script_tag_name: DomString,
}

impl ElementData {
    /// Element data for `local_name`.
    #[must_use]
    pub fn new(local_name: Rc<str>) -> Self {
        let tag_name: Rc<str> = Rc::from(local_name.to_ascii_uppercase());
        let script_tag_name = DomString::from(&*tag_name);
        Self {
            local_name,
            tag_name,
            script_tag_name,
        }
    }

    /// The name as passed to the constructor.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// The uppercased tag name seen by script.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }
}

impl<T: EngineTypes> PropertyDispatch<T> for ElementData {
    fn get_property(&self, cx: &DispatchContext<'_, T>, name: Atom) -> Option<Value<T::Object>> {
        let names = cx.names();
        (name == names.tag_name || name == names.node_name)
            .then(|| Value::String(self.script_tag_name.clone()))
    }

    fn property_names(&self, names: &mut PropertyNameAccumulator) {
        names.add_class(ClassKind::Element);
    }
}

/// Validate constructor arguments for `new Element(tagName)`.
///
/// Extra arguments are ignored.
pub(crate) fn constructor_tag_name<O>(args: &[Value<O>]) -> Result<Rc<str>, BindingError> {
    let Some(first) = args.first() else {
        return Err(BindingError::Argument(
            "Failed to construct 'Element': 1 argument required, but only 0 present.".to_string(),
        ));
    };
    let tag_name = first.as_string().ok_or_else(|| {
        BindingError::Argument(
            "Failed to construct 'Element': tagName should be a string.".to_string(),
        )
    })?;
    // A lone surrogate can never be part of a valid name.
    match tag_name.to_utf8() {
        Some(name) if is_valid_name(&name) => Ok(Rc::from(name)),
        _ => Err(BindingError::Argument(format!(
            "Failed to construct 'Element': The tag name provided ('{tag_name}') is not a valid name."
        ))),
    }
}

/// Non-empty and free of whitespace and markup delimiters.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_ascii_whitespace() || matches!(c, '<' | '>' | '/' | '=' | '"' | '\''))
}
