//! Per-generation cleanup state and the per-target state registry

use crate::target::TargetKey;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::debug;

type CleanupFn = Box<dyn FnOnce() + Send + 'static>;

/// Registry of pending cleanup callbacks for one pipeline generation.
///
/// Callbacks run exactly once, in insertion order, when the generation is
/// canceled. Registering after a cancellation retains the callback; it fires
/// only if the state is canceled again.
pub struct PluginState {
    cleanups: Mutex<Vec<CleanupFn>>,
}

impl PluginState {
    /// Create an empty state
    pub fn new() -> Self {
        Self {
            cleanups: Mutex::new(Vec::new()),
        }
    }

    /// Append a cleanup callback, order-preserving. No deduplication; a
    /// plugin may register zero, one, or several callbacks.
    pub fn register_cleanup<F>(&self, cleanup: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cleanups
            .lock()
            .expect("cleanup list poisoned")
            .push(Box::new(cleanup));
    }

    /// Number of callbacks that would fire on cancellation
    pub fn pending_cleanups(&self) -> usize {
        self.cleanups.lock().expect("cleanup list poisoned").len()
    }

    fn drain(&self) -> Vec<CleanupFn> {
        std::mem::take(&mut *self.cleanups.lock().expect("cleanup list poisoned"))
    }
}

impl Default for PluginState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginState")
            .field("pending_cleanups", &self.pending_cleanups())
            .finish()
    }
}

/// Synchronously invoke every pending cleanup callback in insertion order,
/// then clear the list.
///
/// Idempotent: a second call with no interleaving registration is a no-op.
/// Safe on a state with zero callbacks. This is the single mechanism by
/// which an outstanding plugin future is made to resolve to the cancellation
/// sentinel instead of committing a stale result.
pub fn cancel_currently_running_plugins(state: &PluginState) {
    let cleanups = state.drain();
    if cleanups.is_empty() {
        return;
    }
    debug!(count = cleanups.len(), "canceling in-flight plugin work");
    for cleanup in cleanups {
        cleanup();
    }
}

/// Maps target identity to the current generation's `PluginState`.
///
/// Beginning a new generation always installs a fresh, disjoint state:
/// canceling an old generation must never cancel a newer one.
pub struct StateRegistry {
    slots: Mutex<HashMap<TargetKey, Arc<PluginState>>>,
}

impl StateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide registry shared by all layers
    pub fn global() -> &'static StateRegistry {
        static GLOBAL: OnceLock<StateRegistry> = OnceLock::new();
        GLOBAL.get_or_init(StateRegistry::new)
    }

    /// Install and return a fresh state for the key, replacing any previous
    /// generation's entry.
    pub fn begin_generation(&self, key: TargetKey) -> Arc<PluginState> {
        let state = Arc::new(PluginState::new());
        self.slots
            .lock()
            .expect("registry poisoned")
            .insert(key, Arc::clone(&state));
        debug!(target_key = key.as_u64(), "began plugin state generation");
        state
    }

    /// Current generation's state for the key, if any
    pub fn current(&self, key: TargetKey) -> Option<Arc<PluginState>> {
        self.slots.lock().expect("registry poisoned").get(&key).cloned()
    }

    /// Remove the entry for the key only if it still holds this exact
    /// generation; a newer generation's entry is left untouched.
    pub fn release(&self, key: TargetKey, state: &Arc<PluginState>) {
        let mut slots = self.slots.lock().expect("registry poisoned");
        if let Some(current) = slots.get(&key) {
            if Arc::ptr_eq(current, state) {
                slots.remove(&key);
            }
        }
    }
}

impl Default for StateRegistry {
    fn default() -> Self {
        Self::new()
    }
}
