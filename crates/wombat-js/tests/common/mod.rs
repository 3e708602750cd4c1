#![allow(dead_code)]

use wombat_js::{JsRuntime, RuntimeConfig};

pub fn runtime() -> JsRuntime {
    JsRuntime::with_config(RuntimeConfig {
        echo_console: false,
        ..RuntimeConfig::default()
    })
    .expect("runtime should bootstrap")
}

/// Evaluate `source` and return its completion value as a string.
pub fn eval(runtime: &mut JsRuntime, source: &str) -> String {
    runtime
        .eval_to_string(source)
        .unwrap_or_else(|err| panic!("script failed: {err}\n{source}"))
}

/// The message of the error `source` throws, caught in script.
pub fn thrown(runtime: &mut JsRuntime, source: &str) -> String {
    let wrapped = format!(
        "(() => {{ try {{ {source}; return 'no error'; }} catch (e) {{ return e.constructor.name + ': ' + e.message; }} }})()"
    );
    eval(runtime, &wrapped)
}
