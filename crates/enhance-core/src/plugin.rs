//! Plugin trait, settlement outcomes, and the per-plugin execution context

use crate::descriptor::TransformSource;
use crate::error::PluginError;
use crate::state::PluginState;
use crate::target::MediaTarget;
use crate::token::{AnalyticsToken, PluginFeature};
use async_trait::async_trait;
use enhance_common::{AssistMode, TargetEvent, TransformHints};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

/// Final hint contributed by one settled plugin.
///
/// Closed tagged union so the merge step can match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginHint {
    /// Defer loading until the element is visible
    Lazyload,

    /// Deliver a rendition scaled to the element's layout width
    Responsive { width: u32 },

    /// The low-fidelity placeholder stage completed; deliver the full
    /// rendition
    Placeholder,

    /// Apply a vision-assist rendering mode
    Accessibility { mode: AssistMode },
}

impl PluginHint {
    /// Token feature bit this hint corresponds to
    pub fn feature(&self) -> PluginFeature {
        match self {
            PluginHint::Lazyload => PluginFeature::Lazyload,
            PluginHint::Responsive { .. } => PluginFeature::Responsive,
            PluginHint::Placeholder => PluginFeature::Placeholder,
            PluginHint::Accessibility { .. } => PluginFeature::Accessibility,
        }
    }
}

/// Settlement of one plugin invocation.
///
/// Cancellation is a first-class outcome, never an error; `Canceled` means
/// "discard this plugin's contribution," nothing more.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginOutcome {
    Settled(PluginHint),
    Canceled,
}

/// Resolution of a cancellable wait on a target event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventWait {
    Fired,
    Canceled,
}

/// An asynchronous enhancement plugin.
///
/// Plugins run concurrently, one task each; the engine observes exactly one
/// settlement per invocation. Multi-stage plugins perform their own
/// side-effecting commits at internal stages (via the context's target) and
/// report only their final hint through the outcome.
#[async_trait]
pub trait EnhancementPlugin: Send + Sync {
    /// Unique plugin identifier
    fn name(&self) -> &str;

    /// Token feature bit this plugin contributes while active in a pipeline
    fn feature(&self) -> PluginFeature;

    /// Synchronous hook run during layer construction, after the baseline
    /// commit and before any event can fire. Default: no-op.
    fn prime(&self, ctx: &PluginContext) {
        let _ = ctx;
    }

    /// Execute the plugin to settlement or cancellation
    async fn run(&self, ctx: &PluginContext) -> Result<PluginOutcome, PluginError>;
}

/// Execution context handed to each plugin of one pipeline generation.
///
/// The context pre-registers its cancellation guard on the owning
/// `PluginState` at construction, before the plugin first runs, so the
/// cancellation coordinator can intervene even between pipeline start and
/// the plugin's first poll.
#[derive(Clone)]
pub struct PluginContext {
    target: Arc<dyn MediaTarget>,
    descriptor: Arc<dyn TransformSource>,
    state: Arc<PluginState>,
    token: AnalyticsToken,
    cancel: CancellationToken,
}

impl PluginContext {
    pub(crate) fn new(
        target: Arc<dyn MediaTarget>,
        descriptor: Arc<dyn TransformSource>,
        state: Arc<PluginState>,
        token: AnalyticsToken,
    ) -> Self {
        let cancel = CancellationToken::new();
        let tripwire = cancel.clone();
        state.register_cleanup(move || tripwire.cancel());
        Self {
            target,
            descriptor,
            state,
            token,
            cancel,
        }
    }

    /// The target element this pipeline commits to
    pub fn target(&self) -> &Arc<dyn MediaTarget> {
        &self.target
    }

    /// The resource descriptor for URL derivation
    pub fn descriptor(&self) -> &dyn TransformSource {
        &*self.descriptor
    }

    /// Fully decorated delivery URL for the given hints, token included
    pub fn url_for(&self, hints: &TransformHints) -> String {
        self.token.decorate(&self.descriptor.to_url(hints))
    }

    /// Register an additional cleanup callback on this generation's state
    pub fn register_cleanup<F>(&self, cleanup: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.state.register_cleanup(cleanup);
    }

    /// This plugin's cancellation guard, tripped by the coordinator
    pub fn cancel_guard(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for a target event, resolving early if the pipeline is canceled.
    ///
    /// Cancellation wins over a simultaneously-ready event: a plugin whose
    /// task was already scheduled when the coordinator ran must take the
    /// sentinel path, not commit a stale result.
    pub async fn wait_for(&self, event: TargetEvent) -> Result<EventWait, PluginError> {
        if self.cancel.is_cancelled() {
            return Ok(EventWait::Canceled);
        }

        let mut events = self.target.events();
        if self.target.event_state(event) {
            return Ok(EventWait::Fired);
        }

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(EventWait::Canceled),
                received = events.recv() => match received {
                    Ok(fired) if fired == event => return Ok(EventWait::Fired),
                    Ok(_) => continue,
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => {
                        return Err(PluginError::EventChannelClosed(event))
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MemoryImageElement;
    use crate::state::cancel_currently_running_plugins;
    use enhance_common::AssetDescriptor;

    fn context(element: Arc<MemoryImageElement>, state: Arc<PluginState>) -> PluginContext {
        let descriptor = AssetDescriptor::new("https://media.example.com/demo", "sample", "jpg");
        PluginContext::new(
            element,
            Arc::new(descriptor),
            state,
            AnalyticsToken::none(),
        )
    }

    #[test]
    fn test_context_registers_its_guard_eagerly() {
        let state = Arc::new(PluginState::new());
        let element = Arc::new(MemoryImageElement::new());
        let ctx = context(element, Arc::clone(&state));

        assert_eq!(state.pending_cleanups(), 1);
        assert!(!ctx.cancel_guard().is_cancelled());

        cancel_currently_running_plugins(&state);
        assert!(ctx.cancel_guard().is_cancelled());
    }

    #[tokio::test]
    async fn test_wait_resolves_canceled_when_guard_tripped_first() {
        let state = Arc::new(PluginState::new());
        let element = Arc::new(MemoryImageElement::new());
        let ctx = context(Arc::clone(&element), Arc::clone(&state));

        cancel_currently_running_plugins(&state);
        // Even with the event already observable, cancellation wins.
        element.fire(TargetEvent::Load);

        let wait = ctx.wait_for(TargetEvent::Load).await.unwrap();
        assert_eq!(wait, EventWait::Canceled);
    }

    #[tokio::test]
    async fn test_wait_sees_event_fired_before_subscription() {
        let state = Arc::new(PluginState::new());
        let element = Arc::new(MemoryImageElement::new());
        let ctx = context(Arc::clone(&element), state);

        element.fire(TargetEvent::Load);
        let wait = ctx.wait_for(TargetEvent::Load).await.unwrap();
        assert_eq!(wait, EventWait::Fired);
    }

    #[tokio::test]
    async fn test_wait_ignores_unrelated_events() {
        let state = Arc::new(PluginState::new());
        let element = Arc::new(MemoryImageElement::new());
        let ctx = context(Arc::clone(&element), state);

        let waiter = tokio::spawn(async move { ctx.wait_for(TargetEvent::Load).await });
        tokio::task::yield_now().await;

        element.fire(TargetEvent::Visible);
        element.fire(TargetEvent::Load);

        let wait = waiter.await.unwrap().unwrap();
        assert_eq!(wait, EventWait::Fired);
    }
}
