//! Binding error taxonomy.
//!
//! Everything a script can trigger ([`BindingError::Argument`],
//! [`BindingError::Hierarchy`]) carries the exact, human-readable message the
//! engine adapter throws back into script. Looking up a property the bindings
//! do not know is *not* an error: dispatch returns `None` and the engine
//! yields its absent-value semantics.

use thiserror::Error;

/// Errors produced by the binding core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// Wrong arity or argument type at a constructor or method boundary.
    ///
    /// The call aborts and native state is left unchanged.
    #[error("{0}")]
    Argument(String),

    /// A tree mutation that would break the node hierarchy rules.
    ///
    /// [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
    /// "throw a `HierarchyRequestError` `DOMException`"
    #[error("{0}")]
    Hierarchy(String),

    /// An internal ownership invariant was broken (for example a pin released
    /// twice, or a node used after its script object was collected).
    ///
    /// This indicates a defect in the binding layer and is never shown to
    /// script verbatim.
    #[error("lifetime violation: {0}")]
    LifetimeViolation(String),

    /// The script engine refused an operation (class creation, global
    /// publication, ...).
    #[error("script engine error: {0}")]
    Engine(String),

    /// `bootstrap` was called on an environment that already has a document.
    #[error("environment is already bootstrapped")]
    AlreadyBootstrapped,

    /// The environment was used before `bootstrap`.
    #[error("environment is not bootstrapped")]
    NotBootstrapped,

    /// A callback fired after its environment was dropped.
    #[error("environment has been torn down")]
    EnvironmentGone,
}

impl BindingError {
    /// Whether this error should be surfaced to script as a thrown error.
    #[must_use]
    pub const fn is_script_visible(&self) -> bool {
        matches!(self, Self::Argument(_) | Self::Hierarchy(_))
    }
}
