//! Binding warnings with deduplication.
//!
//! Script code tends to repeat the same mistake in a loop, so each unique
//! `(component, message)` pair is reported once per process (or until
//! [`clear_warnings`] is called). Output goes through `tracing` at `WARN`
//! level; install a subscriber to see it.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about suspicious script behaviour (emits once per unique message).
///
/// Returns `true` if this call emitted the warning, `false` if it was a
/// repeat.
///
/// # Example
/// ```ignore
/// warn_once("DOM", "script wrote unknown property 'dtaa' on Text");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let first = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if first {
        tracing::warn!(component, "{message}");
    }
    first
}

/// Clear all recorded warnings (call when a new environment is created)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
