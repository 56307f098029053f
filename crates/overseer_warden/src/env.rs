//! `WardenEnv`: the open mapping carrying per-invocation state through a
//! pipeline run (`# 3`'s Warden Environment).

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::WardenError;

/// Per-run state shared by every stage in a pipeline, and by nested
/// Wardens invoked from within it (the same `WardenEnv` is threaded down,
/// not recreated per nesting level — this is what lets the recorded error
/// be recognized as "the same object" across nesting, per `# 4.G`).
#[derive(Clone)]
pub struct WardenEnv {
    interrupted: Arc<AtomicBool>,
    error: Arc<Mutex<Option<Arc<WardenError>>>>,
    payload: Arc<Mutex<hashbrown::HashMap<String, Box<dyn Any + Send>>>>,
}

impl Default for WardenEnv {
    fn default() -> Self {
        Self {
            interrupted: Arc::new(AtomicBool::new(false)),
            error: Arc::new(Mutex::new(None)),
            payload: Arc::new(Mutex::new(hashbrown::HashMap::new())),
        }
    }
}

impl WardenEnv {
    /// Returns a fresh, non-interrupted environment with no recorded error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `interrupted` has been set.
    #[must_use]
    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Sets or clears `interrupted`. Setting it guarantees the pipeline
    /// raises `Interrupt` at the next checkpoint (`# 8` invariant).
    pub fn set_interrupted(&self, value: bool) {
        self.interrupted.store(value, Ordering::SeqCst);
    }

    /// Returns the error recorded on this env, if any.
    #[must_use]
    pub fn error(&self) -> Option<Arc<WardenError>> {
        self.error.lock().clone()
    }

    /// Records `err` as the env's error unless it is already the same
    /// object as what is recorded. Returns `true` if this call newly
    /// recorded it (the caller should log exactly once in that case).
    pub fn record_if_new(&self, err: &Arc<WardenError>) -> bool {
        let mut slot = self.error.lock();
        if let Some(existing) = slot.as_ref() {
            if Arc::ptr_eq(existing, err) {
                return false;
            }
        }
        *slot = Some(err.clone());
        true
    }

    /// Stores an opaque payload value under `key`, for middlewares to share.
    pub fn set_payload<T: Any + Send>(&self, key: impl Into<String>, value: T) {
        self.payload.lock().insert(key.into(), Box::new(value));
    }

    /// Reads back an opaque payload value by key and type; `None` if absent
    /// or if present under a different type.
    #[must_use]
    pub fn payload<T: Any + Send + Clone>(&self, key: &str) -> Option<T> {
        self.payload
            .lock()
            .get(key)
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_env_not_interrupted_no_error() {
        let env = WardenEnv::new();
        assert!(!env.is_interrupted());
        assert!(env.error().is_none());
    }

    #[test]
    fn record_if_new_is_true_once() {
        let env = WardenEnv::new();
        let err = Arc::new(WardenError::Interrupt);
        assert!(env.record_if_new(&err));
        assert!(!env.record_if_new(&err));
    }

    #[test]
    fn payload_roundtrips_by_type() {
        let env = WardenEnv::new();
        env.set_payload("count", 7u32);
        assert_eq!(env.payload::<u32>("count"), Some(7));
        assert_eq!(env.payload::<String>("count"), None);
    }

    #[test]
    fn clone_shares_interrupt_state() {
        let env = WardenEnv::new();
        let clone = env.clone();
        env.set_interrupted(true);
        assert!(clone.is_interrupted());
    }
}
