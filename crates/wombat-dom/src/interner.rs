//! String interner for property keys.
//!
//! Property dispatch compares names on every script property access. Names
//! are interned once into an [`Atom`] so that dispatch is a handful of integer
//! comparisons instead of string compares or per-call allocation.

use std::collections::HashMap;

use strum::IntoEnumIterator;

use crate::kind::Method;

/// Interned string id. Equal atoms from the same interner mean equal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(usize);

/// Deduplicating string table.
///
/// One interner lives in each [`Environment`](crate::Environment); it is not
/// a process-wide global.
#[derive(Debug, Default)]
pub struct StringInterner {
    /// Interned strings, indexed by atom
    strings: Vec<Box<str>>,
    /// Map from string content to atom
    map: HashMap<Box<str>, Atom>,
}

impl StringInterner {
    /// Create an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its atom.
    /// If the string is already interned, returns the existing atom.
    pub fn intern(&mut self, text: &str) -> Atom {
        if let Some(&atom) = self.map.get(text) {
            return atom;
        }
        let atom = Atom(self.strings.len());
        self.strings.push(text.into());
        let _ = self.map.insert(text.into(), atom);
        atom
    }

    /// Look up a string without interning it.
    ///
    /// Script-side property names that were never interned cannot match a
    /// native property, so callers use this on the dispatch path to avoid
    /// growing the table with every expando name a script invents.
    #[must_use]
    pub fn get(&self, text: &str) -> Option<Atom> {
        self.map.get(text).copied()
    }

    /// Get the string for an atom.
    #[must_use]
    pub fn resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0).map(AsRef::as_ref)
    }

    /// Number of interned strings
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Pre-interned atoms for every name the bindings expose.
#[derive(Debug, Clone)]
pub struct KnownNames {
    /// `nodeType`
    pub node_type: Atom,
    /// `nodeName`
    pub node_name: Atom,
    /// `parentNode`
    pub parent_node: Atom,
    /// `firstChild`
    pub first_child: Atom,
    /// `lastChild`
    pub last_child: Atom,
    /// `previousSibling`
    pub previous_sibling: Atom,
    /// `nextSibling`
    pub next_sibling: Atom,
    /// `childNodes`
    pub child_nodes: Atom,
    /// `isConnected`
    pub is_connected: Atom,
    /// `textContent`
    pub text_content: Atom,
    /// `body`
    pub body: Atom,
    /// `tagName`
    pub tag_name: Atom,
    /// `data`
    pub data: Atom,
    /// `length`
    pub length: Atom,
    /// Method atoms, indexed by `Method as usize`
    methods: Vec<Atom>,
}

impl KnownNames {
    /// Intern every exposed name into `interner`.
    pub fn new(interner: &mut StringInterner) -> Self {
        Self {
            node_type: interner.intern("nodeType"),
            node_name: interner.intern("nodeName"),
            parent_node: interner.intern("parentNode"),
            first_child: interner.intern("firstChild"),
            last_child: interner.intern("lastChild"),
            previous_sibling: interner.intern("previousSibling"),
            next_sibling: interner.intern("nextSibling"),
            child_nodes: interner.intern("childNodes"),
            is_connected: interner.intern("isConnected"),
            text_content: interner.intern("textContent"),
            body: interner.intern("body"),
            tag_name: interner.intern("tagName"),
            data: interner.intern("data"),
            length: interner.intern("length"),
            methods: Method::iter()
                .map(|method| interner.intern(method.name()))
                .collect(),
        }
    }

    /// The atom for a method name.
    #[must_use]
    pub fn method(&self, method: Method) -> Atom {
        self.methods[method as usize]
    }

    /// Find which of `candidates` is named by `name`.
    #[must_use]
    pub fn find_method(&self, candidates: &[Method], name: Atom) -> Option<Method> {
        candidates
            .iter()
            .copied()
            .find(|&method| self.method(method) == name)
    }
}
