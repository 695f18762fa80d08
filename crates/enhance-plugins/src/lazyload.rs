//! Lazy-loading plugin

use async_trait::async_trait;
use enhance_common::TargetEvent;
use enhance_core::{
    EnhancementPlugin, EventWait, PluginContext, PluginError, PluginFeature, PluginHint,
    PluginOutcome,
};
use tracing::debug;

/// Holds its hint until the element enters the viewport, then marks the
/// element for deferred loading.
#[derive(Debug, Default)]
pub struct LazyloadPlugin;

impl LazyloadPlugin {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EnhancementPlugin for LazyloadPlugin {
    fn name(&self) -> &str {
        "lazyload"
    }

    fn feature(&self) -> PluginFeature {
        PluginFeature::Lazyload
    }

    async fn run(&self, ctx: &PluginContext) -> Result<PluginOutcome, PluginError> {
        match ctx.wait_for(TargetEvent::Visible).await? {
            EventWait::Canceled => Ok(PluginOutcome::Canceled),
            EventWait::Fired => {
                debug!("element visible; settling lazyload hint");
                Ok(PluginOutcome::Settled(PluginHint::Lazyload))
            }
        }
    }
}
