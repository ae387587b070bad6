//! Process-wide engine state.
//!
//! Generators read selective-generation switches (`models`, `apis`,
//! `supportingFiles`, ...) from a global property store. Runs may be started
//! from several threads, so each one holds [`EngineSession`] for its whole
//! render: the session takes the engine lock, publishes the run's keys and
//! removes them again before the lock is released.

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError, RwLock};

use indexmap::IndexMap;
use log::debug;

pub const MODELS: &str = "models";
pub const APIS: &str = "apis";
pub const SUPPORTING_FILES: &str = "supportingFiles";
pub const MODEL_DOCS: &str = "modelDocs";
pub const API_DOCS: &str = "apiDocs";

static ENGINE_LOCK: Mutex<()> = Mutex::new(());

static GLOBAL_PROPERTIES: LazyLock<RwLock<IndexMap<String, String>>> =
    LazyLock::new(|| RwLock::new(IndexMap::new()));

pub fn global_property(key: &str) -> Option<String> {
    GLOBAL_PROPERTIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}

pub fn set_global_property(key: &str, value: &str) {
    GLOBAL_PROPERTIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key.to_string(), value.to_string());
}

pub fn clear_global_property(key: &str) {
    GLOBAL_PROPERTIES
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .shift_remove(key);
}

/// Whether a file class is enabled. Only an explicit `"false"` disables it.
pub fn is_enabled(key: &str) -> bool {
    global_property(key).is_none_or(|v| !v.eq_ignore_ascii_case("false"))
}

/// Exclusive access to the engine for one run.
pub struct EngineSession {
    keys: Vec<String>,
    _guard: MutexGuard<'static, ()>,
}

impl EngineSession {
    /// Block until no other run holds the engine, then publish `globals`.
    pub fn acquire(globals: &IndexMap<String, String>) -> Self {
        let guard = ENGINE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("Engine lock acquired");
        for (key, value) in globals {
            set_global_property(key, value);
        }
        Self {
            keys: globals.keys().cloned().collect(),
            _guard: guard,
        }
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        for key in &self.keys {
            clear_global_property(key);
        }
        debug!("Engine lock released");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    fn globals(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn keys_live_for_the_session_only() {
        {
            let _session = EngineSession::acquire(&globals(&[("engineTestScoped", "false")]));
            assert_eq!(global_property("engineTestScoped").as_deref(), Some("false"));
            assert!(!is_enabled("engineTestScoped"));
        }
        assert_eq!(global_property("engineTestScoped"), None);
        assert!(is_enabled("engineTestScoped"));
    }

    #[test]
    fn keys_are_cleared_on_error_paths() {
        fn failing_run() -> Result<(), String> {
            let _session = EngineSession::acquire(&globals(&[("engineTestFailing", "x")]));
            Err("render failed".into())
        }
        assert!(failing_run().is_err());
        assert_eq!(global_property("engineTestFailing"), None);
    }

    #[test]
    fn sessions_do_not_overlap() {
        let active = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let active = Arc::clone(&active);
                thread::spawn(move || {
                    let key = format!("engineTestThread{i}");
                    let _session = EngineSession::acquire(&globals(&[(key.as_str(), "true")]));
                    assert_eq!(active.fetch_add(1, Ordering::SeqCst), 0);
                    thread::sleep(std::time::Duration::from_millis(5));
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
