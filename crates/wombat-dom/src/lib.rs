//! Wombat DOM - engine-agnostic node bindings.
//!
//! This crate exposes native DOM nodes to an embedded scripting engine:
//! `Node`, `Document`, `Element`, `Text` and `Comment` classes, a single
//! `document` global with a pre-created body, and the basic tree mutation
//! methods.
//!
//! It does not talk to any particular engine. Engines plug in through
//! [`ScriptEngine`]; the [`heap`] module carries a small deterministic
//! reference engine used to test object lifetimes, and `wombat-js` adapts
//! Boa.
//!
//! # Ownership model
//!
//! - A script object owns its native [`NodeInstance`] (as private data).
//! - A node instance records its own script handle but does not keep it
//!   alive.
//! - Native-held references to *other* script objects are [`node::Pinned`]
//!   and released when the holder is destroyed.
//! - The [`Environment`] pins the document; the document pins the body;
//!   every node pins its children.
//!
//! # Example
//!
//! ```
//! use wombat_dom::heap::HeapEngine;
//! use wombat_dom::{Environment, Value};
//!
//! let mut engine = HeapEngine::new();
//! let env = Environment::new();
//! let document = env.bootstrap(&mut engine).unwrap();
//!
//! let div = engine
//!     .call_method(document, "createElement", &[Value::from("div")])
//!     .unwrap();
//! let Value::Object(div) = div else { unreachable!() };
//! assert_eq!(engine.get(div, "tagName").unwrap(), Value::from("DIV"));
//! ```

mod base;
pub mod character_data;
pub mod class;
pub mod command;
pub mod dispatch;
pub mod document;
pub mod element;
pub mod engine;
pub mod environment;
pub mod error;
pub mod heap;
pub mod interner;
pub mod kind;
pub mod node;
pub mod string;
mod tree;
pub mod value;

pub use class::{NodeClass, NodeClassRegistry};
pub use command::{BODY_TARGET_ID, DOCUMENT_TARGET_ID, FIRST_TARGET_ID, TargetId, UiCommand};
pub use dispatch::{DispatchContext, PropertyDispatch, PropertyNameAccumulator, SetOutcome};
pub use engine::{EngineTypes, NodeRef, ScriptEngine};
pub use environment::Environment;
pub use error::BindingError;
pub use interner::{Atom, KnownNames, StringInterner};
pub use kind::{ClassKind, Method};
pub use node::{Lifecycle, NodeData, NodeInstance, Pinned};
pub use string::DomString;
pub use value::Value;
