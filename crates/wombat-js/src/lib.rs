//! Boa integration for the Wombat DOM bindings.
//!
//! Uses [Boa](https://boajs.dev/) as the JavaScript engine. The engine-agnostic
//! node core lives in `wombat_dom`; this crate supplies the
//! [`ScriptEngine`](wombat_dom::ScriptEngine) adapter and a runtime that wires
//! the two together.
//!
//! # Example
//!
//! ```
//! use wombat_js::JsRuntime;
//!
//! let mut runtime = JsRuntime::new().unwrap();
//! let tag = runtime
//!     .eval_to_string("document.createElement('div').tagName")
//!     .unwrap();
//! assert_eq!(tag, "DIV");
//! ```
//!
//! # Implemented
//!
//! - Script execution via `JsRuntime::execute()`
//! - `Node`, `Document`, `Element`, `Text` and `Comment` classes and the
//!   `document` global
//! - `console.log()`, `console.warn()`, `console.error()`

pub mod binding;
pub mod globals;

use std::rc::Rc;

use boa_engine::{Context, JsError, JsValue, Source};
use thiserror::Error;
use wombat_common::warning::clear_warnings;
use wombat_dom::{BindingError, Environment, UiCommand};

pub use binding::{Boa, BoaClass, BoaEngine, BoaPin};
pub use globals::{ConsoleLevel, ConsoleLog, ConsoleMessage};

/// Errors while setting up a runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The DOM environment could not be bootstrapped.
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// A built-in global could not be registered.
    #[error("failed to register globals: {0}")]
    Globals(String),
}

/// Engine limits applied to every runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum call depth.
    pub recursion_limit: usize,
    /// Maximum VM stack size.
    pub stack_size_limit: usize,
    /// Maximum iterations of a single loop.
    pub loop_iteration_limit: u64,
    /// Echo console output to stdout/stderr.
    pub echo_console: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            recursion_limit: 512,
            stack_size_limit: 10 * 1024,
            loop_iteration_limit: u64::MAX,
            echo_console: true,
        }
    }
}

/// JavaScript runtime for a document.
///
/// [§ 8.1.6 JavaScript execution context](https://html.spec.whatwg.org/multipage/webappapis.html)
///
/// Each runtime owns one Boa context and one DOM environment bootstrapped
/// into it. Fields drop in order: the environment releases its pins before
/// the context goes away.
pub struct JsRuntime {
    environment: Rc<Environment<Boa>>,
    console: ConsoleLog,
    context: Context,
}

impl JsRuntime {
    /// Create a runtime with the default [`RuntimeConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] if the DOM or console globals cannot be
    /// installed.
    pub fn new() -> Result<Self, RuntimeError> {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with explicit engine limits.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] if the DOM or console globals cannot be
    /// installed.
    pub fn with_config(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        clear_warnings();
        let mut context = Context::default();
        let limits = context.runtime_limits_mut();
        limits.set_recursion_limit(config.recursion_limit);
        limits.set_stack_size_limit(config.stack_size_limit);
        limits.set_loop_iteration_limit(config.loop_iteration_limit);

        let console = ConsoleLog::new(config.echo_console);
        globals::register_globals(&mut context, &console)
            .map_err(|err| RuntimeError::Globals(err.to_string()))?;

        let environment = Environment::new();
        let _ = environment.bootstrap(&mut BoaEngine::new(&mut context))?;
        tracing::debug!(?config, "JavaScript runtime ready");

        Ok(Self {
            environment,
            console,
            context,
        })
    }

    /// Execute JavaScript source code.
    ///
    /// [§ 4.12.1.1 Processing model](https://html.spec.whatwg.org/multipage/scripting.html#script-processing-model)
    ///
    /// # Errors
    ///
    /// Returns `JsError` if the JavaScript code contains syntax errors or
    /// throws an uncaught exception.
    pub fn execute(&mut self, source: &str) -> Result<JsValue, JsError> {
        self.context.eval(Source::from_bytes(source))
    }

    /// Execute `source` and convert its completion value with `String(..)`.
    ///
    /// # Errors
    ///
    /// Returns `JsError` if execution or the conversion throws.
    pub fn eval_to_string(&mut self, source: &str) -> Result<String, JsError> {
        let value = self.execute(source)?;
        Ok(value.to_string(&mut self.context)?.to_std_string_escaped())
    }

    /// Drain the host commands recorded since the last call.
    #[must_use]
    pub fn take_commands(&self) -> Vec<UiCommand> {
        self.environment.take_commands()
    }

    /// Drain the console messages recorded since the last call.
    #[must_use]
    pub fn take_console(&self) -> Vec<ConsoleMessage> {
        self.console.take()
    }

    /// Run a full collection of the script heap.
    pub fn collect_garbage(&self) {
        boa_gc::force_collect();
        tracing::debug!(live_nodes = self.environment.live_nodes(), "collected script heap");
    }

    /// Native nodes currently alive in this runtime.
    #[must_use]
    pub fn live_nodes(&self) -> usize {
        self.environment.live_nodes()
    }

    /// The DOM environment bound to this runtime.
    #[must_use]
    pub const fn environment(&self) -> &Rc<Environment<Boa>> {
        &self.environment
    }

    /// The underlying Boa context.
    pub const fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }
}
