//! Plugin runner: drives one plugin to settlement and routes the outcome

use crate::layer::LayerShared;
use crate::plugin::{EnhancementPlugin, PluginContext, PluginOutcome};
use std::sync::Arc;
use tracing::{debug, warn};

/// Spawn one plugin task. The runner observes exactly one settlement:
/// a settled hint is merged and committed immediately, the cancellation
/// sentinel discards the result, and a fault is logged and isolated.
/// A fault never aborts sibling plugins and never touches the baseline.
pub(crate) fn spawn_plugin(
    plugin: Arc<dyn EnhancementPlugin>,
    ctx: PluginContext,
    shared: Arc<LayerShared>,
) {
    tokio::spawn(async move {
        match plugin.run(&ctx).await {
            Ok(PluginOutcome::Settled(hint)) => {
                shared.apply(plugin.name(), &hint);
            }
            Ok(PluginOutcome::Canceled) => {
                debug!(plugin = plugin.name(), "plugin canceled; result discarded");
            }
            Err(error) => {
                warn!(
                    plugin = plugin.name(),
                    error = %error,
                    "plugin fault; contribution dropped"
                );
            }
        }
    });
}
