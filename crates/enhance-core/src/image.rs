//! Image enhancement layer

use crate::descriptor::TransformSource;
use crate::error::EngineError;
use crate::layer::LayerShared;
use crate::plugin::{EnhancementPlugin, PluginContext};
use crate::runner::spawn_plugin;
use crate::state::{cancel_currently_running_plugins, PluginState, StateRegistry};
use crate::target::{MediaTarget, TargetKey};
use crate::token::{AnalyticsOptions, AnalyticsToken};
use std::sync::Arc;
use tracing::{debug, info};

/// Enhancement pipeline bound to one image element for one mount/update
/// generation.
///
/// Construction performs the baseline commit (exactly one source
/// assignment, before any plugin output can land), runs each plugin's
/// synchronous prime hook, then starts every plugin concurrently.
/// `update` starts a new generation without canceling the previous one;
/// canceling the old generation first is the caller's job, via
/// [`cancel_currently_running_plugins`] and the [`ImageLayer::plugin_state`]
/// handle. `unmount` is terminal.
pub struct ImageLayer {
    shared: Arc<LayerShared>,
    state: Arc<PluginState>,
    key: TargetKey,
    options: AnalyticsOptions,
}

impl ImageLayer {
    /// Mount a pipeline on an image element.
    ///
    /// A missing target is a precondition violation reported here, not
    /// deferred.
    pub fn mount(
        target: Option<Arc<dyn MediaTarget>>,
        descriptor: Arc<dyn TransformSource>,
        plugins: Vec<Arc<dyn EnhancementPlugin>>,
        options: AnalyticsOptions,
    ) -> Result<Self, EngineError> {
        let target = target.ok_or(EngineError::MissingTarget)?;
        let token = token_for(&options, &plugins);
        let key = target.key();
        let shared = Arc::new(LayerShared::new(target, descriptor, token));
        let state = StateRegistry::global().begin_generation(key);

        let layer = Self {
            shared,
            state,
            key,
            options,
        };
        layer.start_pipeline(plugins, &[]);
        Ok(layer)
    }

    /// Re-render with new props: fresh baseline, fresh generation, new
    /// plugin pipeline. Never cancels the previous generation itself.
    pub fn update(
        &mut self,
        descriptor: Arc<dyn TransformSource>,
        plugins: Vec<Arc<dyn EnhancementPlugin>>,
        attrs: &[(String, String)],
    ) -> Result<(), EngineError> {
        if self.shared.is_unmounted() {
            return Err(EngineError::Unmounted);
        }

        self.state = StateRegistry::global().begin_generation(self.key);
        let token = token_for(&self.options, &plugins);
        self.shared.rebaseline(descriptor, token);
        self.start_pipeline(plugins, attrs);
        Ok(())
    }

    /// Cancel this layer's pending plugin work and stop committing.
    /// Terminal; repeated calls are no-ops.
    pub fn unmount(&self) {
        if self.shared.mark_unmounted() {
            return;
        }
        cancel_currently_running_plugins(&self.state);
        StateRegistry::global().release(self.key, &self.state);
        debug!(target_key = self.key.as_u64(), "image layer unmounted");
    }

    /// The current generation's cleanup state, for external cancellation
    pub fn plugin_state(&self) -> Arc<PluginState> {
        Arc::clone(&self.state)
    }

    fn start_pipeline(&self, plugins: Vec<Arc<dyn EnhancementPlugin>>, attrs: &[(String, String)]) {
        let url = self.shared.current_url();
        self.shared.target().set_source(&url);
        for (name, value) in attrs {
            self.shared.target().set_attribute(name, value);
        }
        info!(plugins = plugins.len(), "image enhancement pipeline started");

        let (descriptor, token) = self.shared.context_parts();
        let contexts: Vec<PluginContext> = plugins
            .iter()
            .map(|_| {
                PluginContext::new(
                    Arc::clone(self.shared.target()),
                    Arc::clone(&descriptor),
                    Arc::clone(&self.state),
                    token.clone(),
                )
            })
            .collect();

        // Prime hooks run synchronously, in pipeline order, before any
        // plugin task is scheduled.
        for (plugin, ctx) in plugins.iter().zip(&contexts) {
            plugin.prime(ctx);
        }
        for (plugin, ctx) in plugins.into_iter().zip(contexts) {
            spawn_plugin(plugin, ctx, Arc::clone(&self.shared));
        }
    }
}

pub(crate) fn token_for(
    options: &AnalyticsOptions,
    plugins: &[Arc<dyn EnhancementPlugin>],
) -> AnalyticsToken {
    if options.enabled {
        AnalyticsToken::compute(&options.sdk, plugins.iter().map(|plugin| plugin.feature()))
    } else {
        AnalyticsToken::none()
    }
}
