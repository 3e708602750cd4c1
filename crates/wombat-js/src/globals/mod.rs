//! JavaScript global objects.
//!
//! The DOM classes and `document` are published by the binding environment
//! itself; this module registers the remaining built-in globals.
//!
//! # Implemented
//!
//! - `console` - [Console Standard](https://console.spec.whatwg.org/)

pub mod console;

use boa_engine::{Context, JsResult};

pub use console::{ConsoleLevel, ConsoleLog, ConsoleMessage};

/// Register all non-DOM global objects on the context.
///
/// [§ 8.1.6.1 Realms and their counterparts](https://html.spec.whatwg.org/multipage/webappapis.html#realms-settings-objects-global-objects)
///
/// This should be called once when creating a new `JsRuntime`.
pub(crate) fn register_globals(context: &mut Context, console: &ConsoleLog) -> JsResult<()> {
    console::register_console(context, console)
}
