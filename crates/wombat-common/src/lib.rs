//! Common utilities for the Wombat DOM bindings.
//!
//! This crate provides shared infrastructure used by the binding crates:
//! - **Warning System** - deduplicated warnings emitted through `tracing`

pub mod warning;
