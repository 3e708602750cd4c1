//! Node kinds, exposed classes and their fixed property surfaces.
//!
//! [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
//!
//! The bindings expose five classes. `Node` is the shared base; the four
//! concrete kinds each delegate to it explicitly rather than inheriting.

use strum_macros::{Display, EnumIter, IntoStaticStr};

/// An exposed class.
///
/// Iteration order (via `strum::IntoEnumIterator`) registers the base class
/// before any kind that names it as parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
pub enum ClassKind {
    /// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
    /// "Node is an abstract interface that is used by all nodes."
    Node,
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element,
    /// [§ 4.11 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text,
    /// [§ 4.14 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment,
}

/// Names shared by every node through the base class.
const NODE_PROPERTIES: &[&str] = &[
    "nodeType",
    "parentNode",
    "firstChild",
    "lastChild",
    "previousSibling",
    "nextSibling",
    "childNodes",
    "isConnected",
    "textContent",
];
const DOCUMENT_PROPERTIES: &[&str] = &["nodeName", "body"];
const ELEMENT_PROPERTIES: &[&str] = &["tagName", "nodeName"];
const CHARACTER_DATA_PROPERTIES: &[&str] = &["nodeName", "data", "length"];

const NODE_METHODS: &[Method] = &[
    Method::AppendChild,
    Method::InsertBefore,
    Method::RemoveChild,
    Method::Remove,
];
const DOCUMENT_METHODS: &[Method] = &[
    Method::CreateElement,
    Method::CreateTextNode,
    Method::CreateComment,
];

impl ClassKind {
    /// The class name published to script.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The class this one delegates to. Only `Node` has none.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::Node => None,
            Self::Document | Self::Element | Self::Text | Self::Comment => Some(Self::Node),
        }
    }

    /// Accessor properties this class defines itself (excluding its parent's).
    #[must_use]
    pub const fn own_properties(self) -> &'static [&'static str] {
        match self {
            Self::Node => NODE_PROPERTIES,
            Self::Document => DOCUMENT_PROPERTIES,
            Self::Element => ELEMENT_PROPERTIES,
            Self::Text | Self::Comment => CHARACTER_DATA_PROPERTIES,
        }
    }

    /// Methods this class defines itself (excluding its parent's).
    #[must_use]
    pub const fn own_methods(self) -> &'static [Method] {
        match self {
            Self::Node => NODE_METHODS,
            Self::Document => DOCUMENT_METHODS,
            Self::Element | Self::Text | Self::Comment => &[],
        }
    }

    /// Properties that accept writes through the dispatch protocol.
    #[must_use]
    pub const fn writable_properties(self) -> &'static [&'static str] {
        match self {
            Self::Text | Self::Comment => &["data"],
            Self::Node | Self::Document | Self::Element => &[],
        }
    }

    /// The `length` of the constructor function seen by script.
    #[must_use]
    pub const fn constructor_length(self) -> usize {
        match self {
            Self::Node | Self::Document => 0,
            Self::Element | Self::Text | Self::Comment => 1,
        }
    }

    /// Position of this class in registration order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Node => 0,
            Self::Document => 1,
            Self::Element => 2,
            Self::Text => 3,
            Self::Comment => 4,
        }
    }
}

/// A native method exposed on a class prototype.
///
/// The discriminant doubles as an index into
/// [`KnownNames`](crate::KnownNames), so variants are never reordered at
/// runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "camelCase")]
pub enum Method {
    /// [§ 4.4 appendChild](https://dom.spec.whatwg.org/#dom-node-appendchild)
    AppendChild,
    /// [§ 4.4 insertBefore](https://dom.spec.whatwg.org/#dom-node-insertbefore)
    InsertBefore,
    /// [§ 4.4 removeChild](https://dom.spec.whatwg.org/#dom-node-removechild)
    RemoveChild,
    /// [§ 4.2.8 remove](https://dom.spec.whatwg.org/#dom-childnode-remove)
    Remove,
    /// [§ 4.5 createElement](https://dom.spec.whatwg.org/#dom-document-createelement)
    CreateElement,
    /// [§ 4.5 createTextNode](https://dom.spec.whatwg.org/#dom-document-createtextnode)
    CreateTextNode,
    /// [§ 4.5 createComment](https://dom.spec.whatwg.org/#dom-document-createcomment)
    CreateComment,
}

impl Method {
    /// The method name seen by script.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// The class whose prototype carries this method.
    #[must_use]
    pub const fn owner(self) -> ClassKind {
        match self {
            Self::AppendChild | Self::InsertBefore | Self::RemoveChild | Self::Remove => {
                ClassKind::Node
            }
            Self::CreateElement | Self::CreateTextNode | Self::CreateComment => {
                ClassKind::Document
            }
        }
    }

    /// Declared parameter count (the function's `length`).
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Remove => 0,
            Self::InsertBefore => 2,
            Self::AppendChild
            | Self::RemoveChild
            | Self::CreateElement
            | Self::CreateTextNode
            | Self::CreateComment => 1,
        }
    }
}
