//! Console API implementation.
//!
//! [Console Standard](https://console.spec.whatwg.org/)
//!
//! This module implements the `console` global object with `log`, `warn`,
//! and `error` methods. Every message is kept in a [`ConsoleLog`] for the
//! embedder and optionally echoed to stdout/stderr.

// `#[derive(Trace)]` expands to an unsafe impl.
#![allow(unsafe_code)]

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use boa_engine::object::ObjectInitializer;
use boa_engine::property::Attribute;
use boa_engine::{Context, JsResult, JsValue, NativeFunction, js_string};
use boa_gc::{Finalize, Trace};

/// [§ 1.1 Logging](https://console.spec.whatwg.org/#logging) log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    /// `console.log`
    Log,
    /// `console.warn`
    Warn,
    /// `console.error`
    Error,
}

impl ConsoleLevel {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Log => "[JS]",
            Self::Warn => "[JS WARN]",
            Self::Error => "[JS ERROR]",
        }
    }
}

/// One console call, its arguments joined with spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleMessage {
    /// Which console method produced it.
    pub level: ConsoleLevel,
    /// The formatted arguments.
    pub text: String,
}

impl fmt::Display for ConsoleMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.level.prefix(), self.text)
    }
}

/// Messages written by script, shared between the runtime and its console.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    messages: Rc<RefCell<Vec<ConsoleMessage>>>,
    echo: bool,
}

impl ConsoleLog {
    /// A log that echoes to stdout/stderr when `echo` is set.
    #[must_use]
    pub fn new(echo: bool) -> Self {
        Self {
            messages: Rc::default(),
            echo,
        }
    }

    /// Drain the recorded messages.
    #[must_use]
    pub fn take(&self) -> Vec<ConsoleMessage> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }

    fn push(&self, message: ConsoleMessage) {
        match message.level {
            ConsoleLevel::Log => tracing::info!(target: "wombat::console", "{}", message.text),
            ConsoleLevel::Warn => tracing::warn!(target: "wombat::console", "{}", message.text),
            ConsoleLevel::Error => tracing::error!(target: "wombat::console", "{}", message.text),
        }
        if self.echo {
            if message.level == ConsoleLevel::Error {
                eprintln!("{message}");
            } else {
                println!("{message}");
            }
        }
        self.messages.borrow_mut().push(message);
    }
}

#[derive(Trace, Finalize)]
struct ConsoleCapture {
    #[unsafe_ignore_trace]
    log: ConsoleLog,
    #[unsafe_ignore_trace]
    level: ConsoleLevel,
}

/// Register the console global object on the context.
///
/// [§ 1.1 Logging](https://console.spec.whatwg.org/#logging)
///
/// Creates a `console` object with the following methods:
/// - `console.log(...args)`
/// - `console.warn(...args)`
/// - `console.error(...args)`
pub(crate) fn register_console(context: &mut Context, log: &ConsoleLog) -> JsResult<()> {
    let method = |level| {
        NativeFunction::from_copy_closure_with_captures(
            console_method,
            ConsoleCapture {
                log: log.clone(),
                level,
            },
        )
    };
    let console = ObjectInitializer::new(context)
        .function(method(ConsoleLevel::Log), js_string!("log"), 0)
        .function(method(ConsoleLevel::Warn), js_string!("warn"), 0)
        .function(method(ConsoleLevel::Error), js_string!("error"), 0)
        .build();

    context.register_global_property(js_string!("console"), console, Attribute::all())
}

/// [§ 1.1.1 log](https://console.spec.whatwg.org/#log)
///
/// "Perform Logger(level, data)."
fn console_method(
    _this: &JsValue,
    args: &[JsValue],
    capture: &ConsoleCapture,
    context: &mut Context,
) -> JsResult<JsValue> {
    let text = format_console_args(args, context)?;
    capture.log.push(ConsoleMessage {
        level: capture.level,
        text,
    });
    Ok(JsValue::undefined())
}

/// Format console arguments for output.
///
/// [§ 2.1 Formatter](https://console.spec.whatwg.org/#formatter)
///
/// Converts each argument to a string and joins them with spaces.
fn format_console_args(args: &[JsValue], context: &mut Context) -> JsResult<String> {
    let strings: Result<Vec<String>, _> = args
        .iter()
        .map(|arg| arg.to_string(context).map(|s| s.to_std_string_escaped()))
        .collect();

    Ok(strings?.join(" "))
}
