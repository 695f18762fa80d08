//! Shared layer engine: render state and the merge-and-commit path

use crate::decision::EnhancementDecision;
use crate::descriptor::TransformSource;
use crate::plugin::PluginHint;
use crate::target::MediaTarget;
use crate::token::AnalyticsToken;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

struct Render {
    descriptor: Arc<dyn TransformSource>,
    token: AnalyticsToken,
    decision: EnhancementDecision,
}

/// State shared between an adapter and the plugin tasks it spawned.
///
/// The render slot holds the generation's descriptor, token, and the
/// accumulated decision; the unmounted flag is the terminal-state latch.
pub(crate) struct LayerShared {
    target: Arc<dyn MediaTarget>,
    render: Mutex<Render>,
    unmounted: AtomicBool,
}

impl LayerShared {
    pub(crate) fn new(
        target: Arc<dyn MediaTarget>,
        descriptor: Arc<dyn TransformSource>,
        token: AnalyticsToken,
    ) -> Self {
        let decision = EnhancementDecision::baseline(&*descriptor, &token);
        Self {
            target,
            render: Mutex::new(Render {
                descriptor,
                token,
                decision,
            }),
            unmounted: AtomicBool::new(false),
        }
    }

    pub(crate) fn target(&self) -> &Arc<dyn MediaTarget> {
        &self.target
    }

    pub(crate) fn is_unmounted(&self) -> bool {
        self.unmounted.load(Ordering::SeqCst)
    }

    /// Latch the terminal state; returns whether it was already set
    pub(crate) fn mark_unmounted(&self) -> bool {
        self.unmounted.swap(true, Ordering::SeqCst)
    }

    /// URL of the current decision
    pub(crate) fn current_url(&self) -> String {
        self.render
            .lock()
            .expect("render state poisoned")
            .decision
            .url()
            .to_string()
    }

    /// Replace descriptor and token, resetting the decision to a fresh
    /// baseline; returns the new baseline URL.
    pub(crate) fn rebaseline(
        &self,
        descriptor: Arc<dyn TransformSource>,
        token: AnalyticsToken,
    ) -> String {
        let mut render = self.render.lock().expect("render state poisoned");
        render.decision = EnhancementDecision::baseline(&*descriptor, &token);
        render.descriptor = descriptor;
        render.token = token;
        render.decision.url().to_string()
    }

    /// Descriptor and token for building plugin contexts
    pub(crate) fn context_parts(&self) -> (Arc<dyn TransformSource>, AnalyticsToken) {
        let render = self.render.lock().expect("render state poisoned");
        (Arc::clone(&render.descriptor), render.token.clone())
    }

    /// Merge one settled hint into the decision and commit its attribute
    /// writes to the target, at this instant.
    pub(crate) fn apply(&self, plugin_name: &str, hint: &PluginHint) {
        if self.is_unmounted() {
            debug!(plugin = plugin_name, "skipping commit on unmounted layer");
            return;
        }

        let writes = {
            let mut guard = self.render.lock().expect("render state poisoned");
            let Render {
                descriptor,
                token,
                decision,
            } = &mut *guard;
            decision.merge(hint, &**descriptor, token)
        };

        for (name, value) in &writes {
            self.target.set_attribute(name, value);
        }
        debug!(
            plugin = plugin_name,
            writes = writes.len(),
            "committed plugin result"
        );
    }
}
