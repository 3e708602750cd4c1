//! Polymorphic property dispatch.
//!
//! Every node kind answers three questions about a property name: can you
//! read it, can you write it, and which names do you enumerate. The engine
//! adapter calls these through [`Environment`](crate::Environment) without
//! knowing the concrete kind.

use crate::command::TargetId;
use crate::engine::EngineTypes;
use crate::environment::Environment;
use crate::error::BindingError;
use crate::interner::{Atom, KnownNames};
use crate::kind::ClassKind;
use crate::value::Value;

/// Outcome of a property write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// A native setter consumed the write.
    Handled,
    /// No native setter; the engine stores the value as a plain field.
    Unhandled,
}

/// What a dispatch call may consult besides the node itself.
pub struct DispatchContext<'a, T: EngineTypes> {
    env: &'a Environment<T>,
    target_id: TargetId,
}

impl<'a, T: EngineTypes> DispatchContext<'a, T> {
    /// Context for dispatching on the node `target_id`.
    #[must_use]
    pub const fn new(env: &'a Environment<T>, target_id: TargetId) -> Self {
        Self { env, target_id }
    }

    /// The owning environment.
    #[must_use]
    pub const fn env(&self) -> &'a Environment<T> {
        self.env
    }

    /// Pre-interned property names.
    #[must_use]
    pub fn names(&self) -> &'a KnownNames {
        self.env.names()
    }

    /// The node being dispatched on.
    #[must_use]
    pub const fn target_id(&self) -> TargetId {
        self.target_id
    }
}

/// Property surface of one node kind.
pub trait PropertyDispatch<T: EngineTypes> {
    /// Read `name`. `None` means "not a native property".
    fn get_property(&self, cx: &DispatchContext<'_, T>, name: Atom) -> Option<Value<T::Object>>;

    /// Write `name`.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::Argument`] when a native setter rejects the
    /// value. Native state is unchanged in that case.
    fn set_property(
        &mut self,
        cx: &DispatchContext<'_, T>,
        name: Atom,
        value: &Value<T::Object>,
    ) -> Result<SetOutcome, BindingError> {
        let _ = (cx, name, value);
        Ok(SetOutcome::Unhandled)
    }

    /// Contribute enumerable names.
    fn property_names(&self, names: &mut PropertyNameAccumulator);
}

/// Collects enumerable property names, keeping first-seen order.
#[derive(Debug, Default)]
pub struct PropertyNameAccumulator {
    names: Vec<&'static str>,
}

impl PropertyNameAccumulator {
    /// Empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one name. Returns `false` if it was already present.
    pub fn add(&mut self, name: &'static str) -> bool {
        if self.names.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Add every property and method `kind` defines itself.
    pub fn add_class(&mut self, kind: ClassKind) {
        for &name in kind.own_properties() {
            let _ = self.add(name);
        }
        for method in kind.own_methods() {
            let _ = self.add(method.name());
        }
    }

    /// Whether `name` has been added.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|&known| known == name)
    }

    /// Number of names collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// No names collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The collected names.
    #[must_use]
    pub fn into_names(self) -> Vec<&'static str> {
        self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_rejects_duplicates() {
        let mut names = PropertyNameAccumulator::new();
        assert!(names.add("data"));
        assert!(!names.add("data"));
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn test_add_class_includes_methods() {
        let mut names = PropertyNameAccumulator::new();
        names.add_class(ClassKind::Document);
        names.add_class(ClassKind::Node);
        let names = names.into_names();
        assert_eq!(&names[..2], &["nodeName", "body"]);
        assert!(names.contains(&"createElement"));
        assert!(names.contains(&"appendChild"));
        assert!(names.contains(&"textContent"));
    }
}
